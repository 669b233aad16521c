use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::Geocoder;
use crate::core::error::{AppError, Result};

/// Nominatim reverse lookup response
#[derive(Debug, Deserialize)]
pub struct NominatimReverseResponse {
    pub display_name: Option<String>,
    pub address: Option<NominatimAddress>,
    /// Present instead of a result when nothing is near the coordinates
    pub error: Option<String>,
}

/// Nominatim address components
#[derive(Debug, Deserialize)]
pub struct NominatimAddress {
    pub house_number: Option<String>,
    pub road: Option<String>,
    pub suburb: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub postcode: Option<String>,
}

impl NominatimAddress {
    /// Get city, falling back to town or village
    pub fn get_city(&self) -> Option<String> {
        self.city
            .clone()
            .or_else(|| self.town.clone())
            .or_else(|| self.village.clone())
    }

    /// Short "12 Main Road, Suburb, City, 8001" form
    pub fn short_form(&self) -> Option<String> {
        let street = match (&self.house_number, &self.road) {
            (Some(number), Some(road)) => Some(format!("{} {}", number, road)),
            (None, Some(road)) => Some(road.clone()),
            _ => None,
        };

        let parts: Vec<String> = [street, self.suburb.clone(), self.get_city(), self.postcode.clone()]
            .into_iter()
            .flatten()
            .filter(|p| !p.trim().is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

impl NominatimReverseResponse {
    fn into_address(self) -> Option<String> {
        if self.error.is_some() {
            return None;
        }
        self.address
            .as_ref()
            .and_then(NominatimAddress::short_form)
            .or(self.display_name)
            .filter(|a| !a.trim().is_empty())
    }
}

/// Reverse geocoding using OpenStreetMap Nominatim
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("AisCore/0.1 (accident-dispatch)")
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn reverse_resolve(&self, latitude: f64, longitude: f64) -> Result<Option<String>> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json&addressdetails=1",
            self.base_url, latitude, longitude
        );

        tracing::debug!("Reverse geocoding (nominatim): {},{} -> {}", latitude, longitude, url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!("Nominatim request failed: {:?}", e);
            AppError::TransportFailure(format!("Nominatim request failed: {}", e))
        })?;

        if !response.status().is_success() {
            tracing::warn!("Nominatim returned status: {}", response.status());
            return Ok(None);
        }

        let body: NominatimReverseResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Nominatim response: {:?}", e);
            AppError::TransportFailure(format!("Failed to parse Nominatim response: {}", e))
        })?;

        Ok(body.into_address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> NominatimAddress {
        NominatimAddress {
            house_number: None,
            road: None,
            suburb: None,
            city: None,
            town: None,
            village: None,
            postcode: None,
        }
    }

    #[test]
    fn test_nominatim_address_get_city() {
        let addr = NominatimAddress {
            city: Some("Cape Town".to_string()),
            ..address()
        };
        assert_eq!(addr.get_city(), Some("Cape Town".to_string()));

        let addr2 = NominatimAddress {
            town: Some("Stellenbosch".to_string()),
            ..address()
        };
        assert_eq!(addr2.get_city(), Some("Stellenbosch".to_string()));
    }

    #[test]
    fn test_short_form() {
        let addr = NominatimAddress {
            house_number: Some("12".to_string()),
            road: Some("Main Road".to_string()),
            suburb: Some("Observatory".to_string()),
            city: Some("Cape Town".to_string()),
            postcode: Some("7925".to_string()),
            ..address()
        };
        assert_eq!(
            addr.short_form(),
            Some("12 Main Road, Observatory, Cape Town, 7925".to_string())
        );
        assert_eq!(address().short_form(), None);
    }

    #[test]
    fn test_error_response_is_unresolved() {
        let body: NominatimReverseResponse =
            serde_json::from_str(r#"{"error":"Unable to geocode"}"#).unwrap();
        assert_eq!(body.into_address(), None);
    }

    #[test]
    fn test_display_name_fallback() {
        let body: NominatimReverseResponse =
            serde_json::from_str(r#"{"display_name":"N1, Western Cape, South Africa","address":{}}"#)
                .unwrap();
        assert_eq!(
            body.into_address(),
            Some("N1, Western Cape, South Africa".to_string())
        );
    }
}
