use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub search: SearchConfig,
    pub geocoding: GeocodingConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Key material used to verify bearer-token signatures. Deployments
    /// point this at the identity pool's signing key.
    pub token_secret: String,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Radius applied when a center point is present in search criteria.
    pub radius_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    pub base_url: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// S3-compatible endpoint the photo uploader PUTs against.
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment defaults first, specific env vars win.
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_TIMEOUT_SECS") {
            self.database.connect_timeout_secs = v.parse().unwrap_or(self.database.connect_timeout_secs);
        }
        if let Ok(v) = env::var("AUTH_TOKEN_SECRET") {
            self.security.token_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SEARCH_RADIUS_KM") {
            self.search.radius_km = v.parse().unwrap_or(self.search.radius_km);
        }
        if let Ok(v) = env::var("GEOCODER_BASE_URL") {
            self.geocoding.base_url = v;
        }
        if let Ok(v) = env::var("GEOCODER_USER_AGENT") {
            self.geocoding.user_agent = v;
        }
        if let Ok(v) = env::var("S3_ENDPOINT") {
            self.storage.endpoint = v;
        }
        if let Ok(v) = env::var("S3_BUCKET_NAME") {
            self.storage.bucket = v;
        }
        if let Ok(v) = env::var("AWS_REGION") {
            self.storage.region = v;
        }
        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connect_timeout_secs: 30,
            },
            security: SecurityConfig {
                token_secret: "dev-only-secret".to_string(),
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            search: SearchConfig { radius_km: 1000.0 },
            geocoding: GeocodingConfig {
                base_url: "https://nominatim.openstreetmap.org/search".to_string(),
                user_agent: "RentoraApp/0.1 (dev)".to_string(),
            },
            storage: StorageConfig {
                endpoint: "http://localhost:9000".to_string(),
                bucket: "rentora-dev".to_string(),
                region: "us-east-1".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connect_timeout_secs: 10,
            },
            security: SecurityConfig {
                token_secret: String::new(),
                cors_origins: vec!["https://staging.rentora.app".to_string()],
            },
            search: SearchConfig { radius_km: 1000.0 },
            geocoding: GeocodingConfig {
                base_url: "https://nominatim.openstreetmap.org/search".to_string(),
                user_agent: "RentoraApp/0.1 (staging)".to_string(),
            },
            storage: StorageConfig {
                endpoint: String::new(),
                bucket: "rentora-staging".to_string(),
                region: "us-east-1".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connect_timeout_secs: 5,
            },
            security: SecurityConfig {
                token_secret: String::new(),
                cors_origins: vec!["https://rentora.app".to_string()],
            },
            search: SearchConfig { radius_km: 1000.0 },
            geocoding: GeocodingConfig {
                base_url: "https://nominatim.openstreetmap.org/search".to_string(),
                user_agent: "RentoraApp/0.1".to_string(),
            },
            storage: StorageConfig {
                endpoint: String::new(),
                bucket: "rentora-prod".to_string(),
                region: "us-east-1".to_string(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = AppConfig::development();
        assert_eq!(config.search.radius_km, 1000.0);
        assert_eq!(config.database.max_connections, 10);
        assert!(!config.security.token_secret.is_empty());
    }

    #[test]
    fn production_requires_explicit_secret() {
        let config = AppConfig::production();
        assert!(config.security.token_secret.is_empty());
        assert_eq!(config.database.max_connections, 50);
    }
}
