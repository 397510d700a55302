use thiserror::Error;

#[derive(Error, Debug)]
pub enum GaError {
    #[error("Global attribute not found: {0}")]
    AttrNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),
}

impl GaError {
    /// True when the error means the GA file simply does not exist.
    pub fn is_attr_not_found(&self) -> bool {
        matches!(self, GaError::AttrNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, GaError>;
