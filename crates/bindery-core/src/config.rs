//! Configuration module
//!
//! This module provides configuration for the catalog service: server,
//! database, storage backends (local directory and/or remote buckets), cover
//! hosting, and authentication settings. Values come from the environment
//! (with `.env` support) and fall back to code defaults.

use std::env;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JWT_EXPIRY_HOURS: i64 = 24;

/// Base configuration shared across binaries
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub environment: String,
}

/// Catalog service configuration
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Local backend (enabled when both values are set)
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Remote backend (enabled when both buckets are set)
    pub s3_private_bucket: Option<String>,
    pub s3_public_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    // Grant/read URL lifetimes
    pub upload_grant_ttl_secs: u64,
    pub read_url_ttl_secs: u64,
    // Artifact constraints
    pub max_book_size_bytes: usize,
    pub book_content_type: String,
    pub max_cover_size_bytes: usize,
    // Cover CDN (local-method covers; enabled when all values are set)
    pub cloudinary_cloud_name: Option<String>,
    pub cloudinary_api_key: Option<String>,
    pub cloudinary_api_secret: Option<String>,
    pub cloudinary_upload_preset: Option<String>,
}

/// Application configuration (catalog service).
#[derive(Clone, Debug)]
pub struct Config(pub Box<CatalogConfig>);

impl Config {
    fn as_catalog(&self) -> &CatalogConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_catalog().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = CatalogConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_catalog().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.as_catalog().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_catalog().base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_catalog().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_catalog().base.db_timeout_seconds
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_catalog().base.jwt_secret
    }

    pub fn jwt_expiry_hours(&self) -> i64 {
        self.as_catalog().base.jwt_expiry_hours
    }

    pub fn environment(&self) -> &str {
        &self.as_catalog().base.environment
    }

    pub fn database_url(&self) -> &str {
        &self.as_catalog().database_url
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_catalog().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_catalog().local_storage_base_url.as_deref()
    }

    pub fn local_backend_configured(&self) -> bool {
        self.local_storage_path().is_some() && self.local_storage_base_url().is_some()
    }

    pub fn s3_private_bucket(&self) -> Option<&str> {
        self.as_catalog().s3_private_bucket.as_deref()
    }

    pub fn s3_public_bucket(&self) -> Option<&str> {
        self.as_catalog().s3_public_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_catalog().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_catalog().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.as_catalog().aws_region.as_deref()
    }

    pub fn remote_backend_configured(&self) -> bool {
        self.s3_private_bucket().is_some() && self.s3_public_bucket().is_some()
    }

    pub fn upload_grant_ttl_secs(&self) -> u64 {
        self.as_catalog().upload_grant_ttl_secs
    }

    pub fn read_url_ttl_secs(&self) -> u64 {
        self.as_catalog().read_url_ttl_secs
    }

    pub fn max_book_size_bytes(&self) -> usize {
        self.as_catalog().max_book_size_bytes
    }

    pub fn book_content_type(&self) -> &str {
        &self.as_catalog().book_content_type
    }

    pub fn max_cover_size_bytes(&self) -> usize {
        self.as_catalog().max_cover_size_bytes
    }

    pub fn cloudinary_cloud_name(&self) -> Option<&str> {
        self.as_catalog().cloudinary_cloud_name.as_deref()
    }

    pub fn cloudinary_api_key(&self) -> Option<&str> {
        self.as_catalog().cloudinary_api_key.as_deref()
    }

    pub fn cloudinary_api_secret(&self) -> Option<&str> {
        self.as_catalog().cloudinary_api_secret.as_deref()
    }

    pub fn cloudinary_upload_preset(&self) -> Option<&str> {
        self.as_catalog().cloudinary_upload_preset.as_deref()
    }

    pub fn cover_cdn_configured(&self) -> bool {
        self.cloudinary_cloud_name().is_some()
            && self.cloudinary_api_key().is_some()
            && self.cloudinary_api_secret().is_some()
            && self.cloudinary_upload_preset().is_some()
    }
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        const MAX_BOOK_SIZE_MB: usize = 100;
        const MAX_COVER_SIZE_MB: usize = 10;
        const UPLOAD_GRANT_TTL_SECS: u64 = 900;
        const READ_URL_TTL_SECS: u64 = 900;

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| JWT_EXPIRY_HOURS.to_string())
                .parse()
                .unwrap_or(JWT_EXPIRY_HOURS),
            environment,
        };

        let config = CatalogConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            s3_private_bucket: env::var("S3_PRIVATE_BUCKET").ok(),
            s3_public_bucket: env::var("S3_PUBLIC_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            aws_access_key_id: env::var("AWS_ACCESS_KEY_ID").ok(),
            aws_secret_access_key: env::var("AWS_SECRET_ACCESS_KEY").ok(),
            upload_grant_ttl_secs: env::var("UPLOAD_GRANT_TTL_SECS")
                .unwrap_or_else(|_| UPLOAD_GRANT_TTL_SECS.to_string())
                .parse()
                .unwrap_or(UPLOAD_GRANT_TTL_SECS),
            read_url_ttl_secs: env::var("READ_URL_TTL_SECS")
                .unwrap_or_else(|_| READ_URL_TTL_SECS.to_string())
                .parse()
                .unwrap_or(READ_URL_TTL_SECS),
            max_book_size_bytes: env::var("MAX_BOOK_SIZE_MB")
                .unwrap_or_else(|_| MAX_BOOK_SIZE_MB.to_string())
                .parse::<usize>()
                .unwrap_or(MAX_BOOK_SIZE_MB)
                * 1024
                * 1024,
            book_content_type: env::var("BOOK_CONTENT_TYPE")
                .unwrap_or_else(|_| "application/epub+zip".to_string())
                .to_lowercase(),
            max_cover_size_bytes: env::var("MAX_COVER_SIZE_MB")
                .unwrap_or_else(|_| MAX_COVER_SIZE_MB.to_string())
                .parse::<usize>()
                .unwrap_or(MAX_COVER_SIZE_MB)
                * 1024
                * 1024,
            cloudinary_cloud_name: env::var("CLOUDINARY_CLOUD_NAME").ok(),
            cloudinary_api_key: env::var("CLOUDINARY_API_KEY").ok(),
            cloudinary_api_secret: env::var("CLOUDINARY_API_SECRET").ok(),
            cloudinary_upload_preset: env::var("CLOUDINARY_UPLOAD_PRESET").ok(),
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.db_max_connections == 0 {
            return Err(anyhow::anyhow!("Database max connections cannot be 0"));
        }

        let local = self.local_storage_path.is_some() && self.local_storage_base_url.is_some();
        let remote = self.s3_private_bucket.is_some() && self.s3_public_bucket.is_some();
        if !local && !remote {
            return Err(anyhow::anyhow!(
                "No storage backend configured. Set LOCAL_STORAGE_PATH and \
                 LOCAL_STORAGE_BASE_URL, or S3_PRIVATE_BUCKET and S3_PUBLIC_BUCKET."
            ));
        }

        // Half-configured backends are misconfigurations, not disabled backends.
        if self.local_storage_path.is_some() != self.local_storage_base_url.is_some() {
            return Err(anyhow::anyhow!(
                "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL must be set together"
            ));
        }
        if self.s3_private_bucket.is_some() != self.s3_public_bucket.is_some() {
            return Err(anyhow::anyhow!(
                "S3_PRIVATE_BUCKET and S3_PUBLIC_BUCKET must be set together"
            ));
        }
        if remote && self.s3_region.is_none() && self.aws_region.is_none() {
            return Err(anyhow::anyhow!(
                "S3_REGION or AWS_REGION must be set when remote storage is configured"
            ));
        }

        if self.upload_grant_ttl_secs == 0 {
            return Err(anyhow::anyhow!("UPLOAD_GRANT_TTL_SECS cannot be 0"));
        }

        Ok(())
    }
}
