use thiserror::Error;

#[allow(clippy::enum_variant_names)]
#[derive(Debug, Error)]
pub enum AvailError {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid time: {0}")]
    InvalidTime(String),
    #[error("Invalid dedicated time: {0}")]
    InvalidDedicatedTime(String),
    #[error("Error: {0}")]
    GenericError(String),
}

impl From<chrono::ParseError> for AvailError {
    fn from(e: chrono::ParseError) -> Self {
        Self::InvalidTime(e.to_string())
    }
}

impl From<String> for AvailError {
    fn from(e: String) -> Self {
        Self::GenericError(e)
    }
}

impl From<&str> for AvailError {
    fn from(e: &str) -> Self {
        Self::GenericError(e.to_string())
    }
}
