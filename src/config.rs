//! Configuration for the custody core.
//!
//! Loads settings from environment variables (with a `.env` file in local
//! development). The hosting process loads this once at startup and passes
//! the relevant sections by reference into the component constructors; no
//! component reads configuration ambiently after that.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub encryption: EncryptionSettings,
    pub totp: TotpSettings,
}

impl Settings {
    pub fn load() -> Result<Self> {
        // Load .env file in development
        if cfg!(debug_assertions) {
            dotenvy::dotenv().ok();
        }

        Ok(Settings {
            database: DatabaseSettings::from_env()?,
            jwt: JwtSettings::from_env()?,
            encryption: EncryptionSettings::from_env()?,
            totp: TotpSettings::from_env(),
        })
    }
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    /// Pool acquire timeout in seconds. Latency bounding for store calls is
    /// delegated to the pool; the services themselves impose no timeouts.
    pub acquire_timeout: u64,
}

impl DatabaseSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,
            acquire_timeout: env::var("DATABASE_ACQUIRE_TIMEOUT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid DATABASE_ACQUIRE_TIMEOUT")?,
        })
    }
}

/// Token signing settings. The signing key is loaded once and held immutable
/// for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtSettings {
    pub secret: String,
}

impl JwtSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
        })
    }
}

/// Secret envelope encryption settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptionSettings {
    /// Base64-encoded 256-bit data key for the static key provider.
    pub data_key: String,
}

impl EncryptionSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            data_key: env::var("ENCRYPTION_DATA_KEY").context("ENCRYPTION_DATA_KEY must be set")?,
        })
    }
}

/// TOTP enrollment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotpSettings {
    /// Issuer shown in authenticator apps and embedded in provisioning URIs.
    pub issuer: String,
}

impl TotpSettings {
    fn from_env() -> Self {
        Self {
            issuer: env::var("TOTP_ISSUER").unwrap_or_else(|_| "IDAM-PAM Platform".to_string()),
        }
    }
}
