use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::Geocoder;
use crate::core::error::{AppError, Result};

#[derive(Debug, Deserialize)]
pub struct GoogleGeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GoogleGeocodeResult>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleGeocodeResult {
    pub formatted_address: String,
}

impl GoogleGeocodeResponse {
    /// First formatted address when the lookup succeeded
    fn into_address(self) -> Option<String> {
        if self.status != "OK" {
            return None;
        }
        self.results
            .into_iter()
            .next()
            .map(|r| r.formatted_address)
            .filter(|a| !a.trim().is_empty())
    }
}

/// Reverse geocoding using the Google Geocoding API
pub struct GoogleGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(base_url: impl Into<String>, api_key: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn reverse_resolve(&self, latitude: f64, longitude: f64) -> Result<Option<String>> {
        let url = format!(
            "{}/json?latlng={},{}&key={}",
            self.base_url,
            latitude,
            longitude,
            urlencoding::encode(&self.api_key)
        );

        tracing::debug!("Reverse geocoding (google): {},{}", latitude, longitude);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!("Google geocoding request failed: {:?}", e);
            AppError::TransportFailure(format!("Google geocoding request failed: {}", e))
        })?;

        if !response.status().is_success() {
            tracing::warn!("Google geocoding returned status: {}", response.status());
            return Ok(None);
        }

        let body: GoogleGeocodeResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Google geocoding response: {:?}", e);
            AppError::TransportFailure(format!("Failed to parse geocoding response: {}", e))
        })?;

        if body.status != "OK" {
            tracing::debug!("Google geocoding status: {}", body.status);
        }

        Ok(body.into_address())
    }
}
