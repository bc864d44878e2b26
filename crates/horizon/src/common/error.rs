use thiserror::Error;

use crate::common::error::HorizonError::GenericError;

#[derive(Debug, Error)]
pub enum HorizonError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
    #[error("Engine error: {0}")]
    EngineError(#[from] avail::Error),
    #[error("Error: {0}")]
    GenericError(String),
}

impl From<serde_json::Error> for HorizonError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Self::SerializationError(e.to_string())
        } else {
            Self::DeserializationError(e.to_string())
        }
    }
}

impl From<toml::de::Error> for HorizonError {
    fn from(error: toml::de::Error) -> Self {
        Self::DeserializationError(error.to_string())
    }
}

impl From<String> for HorizonError {
    fn from(e: String) -> Self {
        GenericError(e)
    }
}

pub fn error<T>(message: String) -> crate::Result<T> {
    Err(GenericError(message))
}
