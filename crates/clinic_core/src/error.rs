use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Remote resource not found: {0}")]
    NotFound(String),

    /// The requested sheet range (usually a whole tab) does not exist.
    #[error("Range not found: {0}")]
    RangeNotFound(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Remote API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Remote store error: {0}")]
    Generic(String),
}

impl StoreError {
    /// True for the "optional tab is missing" condition, which callers may
    /// degrade to an empty result.
    pub fn is_range_not_found(&self) -> bool {
        matches!(self, StoreError::RangeNotFound(_))
    }
}
