use std::env;
use std::time::Duration;

use crate::features::tow_providers::TowProvider;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub swagger: SwaggerConfig,
    pub dispatch: DispatchConfig,
    pub geocoding: GeocodingConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
    /// Base URL of the public site hosting the accident form
    pub frontend_url: String,
    pub operator_username: Option<String>,
    pub operator_password: Option<String>,
}

/// Where accident reports and link tokens are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    MinIO,
    Memory,
}

/// Blob storage configuration for accident photos
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub minio: MinIOConfig,
}

/// MinIO/S3 storage configuration for file uploads
#[derive(Debug, Clone)]
pub struct MinIOConfig {
    /// MinIO/S3 endpoint URL
    pub endpoint: String,
    /// Public endpoint URL used when building attachment links
    pub public_endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// AWS region (for S3 compatibility)
    pub region: String,
    /// Key prefix for accident attachments (e.g., "public/accidents")
    pub prefix: String,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Settings for link issuing and deep-link composition
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub link_ttl: Duration,
    pub deep_link_base_url: String,
    /// Country calling code enforced on issued links; `None` disables the regional rule
    pub phone_country_code: Option<String>,
    pub phone_subscriber_digits: usize,
    pub tow_providers: Vec<TowProvider>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocoderKind {
    Nominatim,
    Google,
}

#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    pub kind: GeocoderKind,
    pub nominatim_base_url: String,
    pub google_base_url: String,
    pub google_api_key: Option<String>,
    pub request_timeout: Duration,
    /// Bounded wait for a single position fix
    pub location_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            dispatch: DispatchConfig::from_env()?,
            geocoding: GeocodingConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 2 * 1024 * 1024; // JSON bodies; the accident form sets its own limit

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        let frontend_url = env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let operator_username = env::var("OPERATOR_USERNAME").ok().filter(|s| !s.is_empty());
        let operator_password = env::var("OPERATOR_PASSWORD").ok().filter(|s| !s.is_empty());

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
            frontend_url,
            operator_username,
            operator_password,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns operator credentials in "username:password" format if configured
    pub fn operator_credentials(&self) -> Option<String> {
        match (&self.operator_username, &self.operator_password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => return Err(format!("Unknown STORE_BACKEND: {}", other)),
        };

        let url = match backend {
            StoreBackend::Postgres => {
                env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?
            }
            StoreBackend::Memory => env::var("DATABASE_URL").unwrap_or_default(),
        };

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            backend,
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, String> {
        let backend = match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "minio".to_string())
            .to_lowercase()
            .as_str()
        {
            "minio" | "s3" => StorageBackend::MinIO,
            "memory" => StorageBackend::Memory,
            other => return Err(format!("Unknown STORAGE_BACKEND: {}", other)),
        };

        Ok(Self {
            backend,
            minio: MinIOConfig::from_env()?,
        })
    }
}

impl MinIOConfig {
    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        // Public endpoint defaults to the main endpoint if not specified
        let public_endpoint =
            env::var("MINIO_PUBLIC_ENDPOINT").unwrap_or_else(|_| endpoint.clone());

        let access_key = env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());
        let secret_key = env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string());
        let bucket = env::var("MINIO_BUCKET").unwrap_or_else(|_| "ais-uploads".to_string());
        let region = env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        let prefix = env::var("MINIO_PREFIX")
            .unwrap_or_else(|_| "public/accidents".to_string())
            .trim_matches('/')
            .to_string();

        Ok(Self {
            endpoint,
            public_endpoint,
            access_key,
            secret_key,
            bucket,
            region,
            prefix,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "AIS Dispatch API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION").unwrap_or_else(|_| {
            "Accident intake and tow dispatch API".to_string()
        });

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl DispatchConfig {
    const DEFAULT_LINK_TTL_HOURS: u64 = 24;
    const DEFAULT_DEEP_LINK_BASE_URL: &'static str = "https://wa.me";
    const DEFAULT_PHONE_COUNTRY_CODE: &'static str = "27";
    const DEFAULT_PHONE_SUBSCRIBER_DIGITS: usize = 9;

    pub fn from_env() -> Result<Self, String> {
        let link_ttl_hours = env::var("LINK_TTL_HOURS")
            .unwrap_or_else(|_| Self::DEFAULT_LINK_TTL_HOURS.to_string())
            .parse::<u64>()
            .map_err(|_| "LINK_TTL_HOURS must be a valid number".to_string())?;

        let deep_link_base_url = env::var("DEEP_LINK_BASE_URL")
            .unwrap_or_else(|_| Self::DEFAULT_DEEP_LINK_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        // An explicitly empty value turns the regional rule off
        let phone_country_code = match env::var("PHONE_COUNTRY_CODE") {
            Ok(code) if code.trim().is_empty() => None,
            Ok(code) => Some(code.trim().trim_start_matches('+').to_string()),
            Err(_) => Some(Self::DEFAULT_PHONE_COUNTRY_CODE.to_string()),
        };

        let phone_subscriber_digits = env::var("PHONE_SUBSCRIBER_DIGITS")
            .unwrap_or_else(|_| Self::DEFAULT_PHONE_SUBSCRIBER_DIGITS.to_string())
            .parse::<usize>()
            .map_err(|_| "PHONE_SUBSCRIBER_DIGITS must be a valid number".to_string())?;

        let tow_providers = match env::var("TOW_PROVIDERS") {
            Ok(raw) if !raw.trim().is_empty() => serde_json::from_str::<Vec<TowProvider>>(&raw)
                .map_err(|e| format!("TOW_PROVIDERS must be a JSON array of providers: {}", e))?,
            _ => TowProvider::defaults(),
        };
        for provider in &tow_providers {
            provider
                .validate()
                .map_err(|e| format!("Invalid TOW_PROVIDERS entry: {}", e))?;
        }

        Ok(Self {
            link_ttl: Duration::from_secs(link_ttl_hours * 3600),
            deep_link_base_url,
            phone_country_code,
            phone_subscriber_digits,
            tow_providers,
        })
    }
}

impl GeocodingConfig {
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_LOCATION_TIMEOUT_MS: u64 = 10_000;

    pub fn from_env() -> Result<Self, String> {
        let kind = match env::var("GEOCODER")
            .unwrap_or_else(|_| "nominatim".to_string())
            .to_lowercase()
            .as_str()
        {
            "nominatim" => GeocoderKind::Nominatim,
            "google" => GeocoderKind::Google,
            other => return Err(format!("Unknown GEOCODER: {}", other)),
        };

        let google_api_key = env::var("GOOGLE_MAPS_API_KEY").ok().filter(|s| !s.is_empty());
        if kind == GeocoderKind::Google && google_api_key.is_none() {
            return Err("GOOGLE_MAPS_API_KEY is required when GEOCODER=google".to_string());
        }

        let nominatim_base_url = env::var("NOMINATIM_BASE_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string());
        let google_base_url = env::var("GOOGLE_GEOCODING_BASE_URL")
            .unwrap_or_else(|_| "https://maps.googleapis.com/maps/api/geocode".to_string());

        let request_timeout_secs = env::var("GEOCODING_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_REQUEST_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "GEOCODING_TIMEOUT_SECS must be a valid number".to_string())?;

        let location_timeout_ms = env::var("LOCATION_TIMEOUT_MS")
            .unwrap_or_else(|_| Self::DEFAULT_LOCATION_TIMEOUT_MS.to_string())
            .parse::<u64>()
            .map_err(|_| "LOCATION_TIMEOUT_MS must be a valid number".to_string())?;

        Ok(Self {
            kind,
            nominatim_base_url,
            google_base_url,
            google_api_key,
            request_timeout: Duration::from_secs(request_timeout_secs),
            location_timeout: Duration::from_millis(location_timeout_ms),
        })
    }
}
