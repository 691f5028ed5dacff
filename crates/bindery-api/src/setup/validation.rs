//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use bindery_core::Config;

/// Validate critical configuration values
///
/// Fails fast on settings that would cause security problems or runtime
/// errors once requests start flowing.
pub fn validate_config(config: &Config) -> Result<()> {
    // Backend pairing, region requirements, TTLs and pool size
    config.validate()?;

    let is_production = config.is_production();
    let env_var = std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .ok();

    if is_production && env_var.is_none() {
        tracing::warn!(
            "Production mode detected but ENVIRONMENT/APP_ENV not set - error details may leak"
        );
    }

    // Validate CORS configuration in production
    if is_production && config.cors_origins().contains(&"*".to_string()) {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production - this is a security risk. \
            Please set specific allowed origins via CORS_ORIGINS environment variable."
        ));
    }

    if config.db_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    // Validate file size limits
    if config.max_book_size_bytes() == 0 {
        return Err(anyhow::anyhow!("Max book size cannot be 0"));
    }
    if config.max_cover_size_bytes() == 0 {
        return Err(anyhow::anyhow!("Max cover size cannot be 0"));
    }

    // Validate JWT secret is set
    if config.jwt_secret().is_empty() {
        return Err(anyhow::anyhow!(
            "JWT secret cannot be empty - set JWT_SECRET environment variable"
        ));
    }

    // Warn about weak JWT secrets in production
    if is_production && config.jwt_secret().len() < 32 {
        tracing::warn!(
            "JWT secret is shorter than 32 characters - consider using a longer, more secure secret"
        );
    }

    tracing::info!("Configuration validation passed");
    Ok(())
}
