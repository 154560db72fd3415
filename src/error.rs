use crate::domain::types::{ErrorMessage, ResourceId};
use thiserror::Error;

const FALLBACK_ERROR_MESSAGE: &str = "invalid error message";
const FALLBACK_RESOURCE: &str = "unknown resource";

/// Quill CMS error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: ErrorMessage },

    #[error("Not found: {resource}")]
    NotFound { resource: ResourceId },
}

impl Error {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: ErrorMessage::try_new(message.into()).unwrap_or_else(|_| {
                ErrorMessage::try_new(FALLBACK_ERROR_MESSAGE.to_string()).unwrap()
            }),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: ResourceId::try_new(resource.into())
                .unwrap_or_else(|_| ResourceId::try_new(FALLBACK_RESOURCE.to_string()).unwrap()),
        }
    }

    /// True for errors raised by our own configuration guards, as opposed to
    /// errors propagated from the database or settings layers.
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
