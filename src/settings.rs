//! Process configuration, assembled once at startup and passed explicitly
//! into every component that needs it.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("CRYPTO_KEY must be 64 hex characters (a 32-byte AES key): {0}")]
    BadCryptoKey(String),
    #[error("invalid PORT: {0}")]
    BadPort(String),
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    /// AES-256 key for payload encryption, decoded from hex.
    pub crypto_key: [u8; 32],
    /// HMAC secret for the token envelope signature.
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    /// Root of the artifact tree (routes/, models/, controllers/, docs/).
    pub root_dir: PathBuf,
}

fn required(name: &'static str) -> Result<String, SettingsError> {
    std::env::var(name).map_err(|_| SettingsError::Missing(name))
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let database_url = required("DATABASE_URL")?;
        let key_hex = required("CRYPTO_KEY")?;
        let key_bytes = hex::decode(key_hex.trim())
            .map_err(|e| SettingsError::BadCryptoKey(e.to_string()))?;
        let crypto_key: [u8; 32] = key_bytes
            .try_into()
            .map_err(|b: Vec<u8>| SettingsError::BadCryptoKey(format!("{} bytes", b.len())))?;
        let jwt_secret = required("JWT_SECRET")?;
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .map_err(|e: std::num::ParseIntError| SettingsError::BadPort(e.to_string()))?;
        let root_dir = std::env::var("ROUTESMITH_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        Ok(Settings {
            database_url,
            crypto_key,
            jwt_secret,
            host,
            port,
            root_dir,
        })
    }
}
