//! Environment-driven configuration. Bad values fail startup; nothing here
//! is recoverable at request time.

use thiserror::Error;

use crate::crypto::{CryptoEngine, CryptoError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing env var: {0}")]
    MissingVar(&'static str),

    #[error("invalid encryption key: {0}")]
    InvalidKey(#[from] CryptoError),
}

/// Process configuration for the supervisor core.
#[derive(Clone)]
pub struct SupervisorConfig {
    pub database_url: String,
    /// Raw AES key bytes; must be 16, 24 or 32 bytes long.
    pub encryption_key: String,
}

impl std::fmt::Debug for SupervisorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of debug output.
        f.debug_struct("SupervisorConfig")
            .field("database_url", &self.database_url)
            .field("encryption_key", &"<redacted>")
            .finish()
    }
}

impl SupervisorConfig {
    /// Load from `DATABASE_URL` and `SUPERVISOR_ENCRYPTION_KEY`. The key is
    /// validated immediately so a misconfigured deployment dies at startup
    /// rather than on the first encrypt.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?;
        let encryption_key = std::env::var("SUPERVISOR_ENCRYPTION_KEY")
            .map_err(|_| ConfigError::MissingVar("SUPERVISOR_ENCRYPTION_KEY"))?;

        let config = Self {
            database_url,
            encryption_key,
        };
        config.crypto_engine()?;
        Ok(config)
    }

    /// Build the crypto engine this configuration describes.
    pub fn crypto_engine(&self) -> Result<CryptoEngine, ConfigError> {
        Ok(CryptoEngine::new(self.encryption_key.as_bytes())?)
    }
}
