//! Error types for the pubstat SDK

use thiserror::Error;

/// Errors that can occur when talking to the CMS
#[derive(Error, Debug)]
pub enum SdkError {
    /// An items request was issued before a successful login
    #[error("Not authenticated: call login first")]
    NotAuthenticated,

    /// Login rejected or server unreachable
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The CMS answered with an error payload
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// Unknown collection (embedded mode)
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
