//! Error types for the Repzo provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Repzo provider errors
#[derive(Error, Debug)]
pub enum RepzoError {
    /// API key was rejected
    #[error("Authentication failed (status {status_code}): {message}")]
    AuthenticationFailed { status_code: u16, message: String },

    /// API request returned an error
    #[error("Repzo API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for Repzo operations
pub type Result<T> = std::result::Result<T, RepzoError>;

impl From<RepzoError> for BridgeError {
    fn from(error: RepzoError) -> Self {
        match error {
            RepzoError::AuthenticationFailed {
                status_code,
                message,
            }
            | RepzoError::ApiError {
                status_code,
                message,
            } => BridgeError::Remote {
                status: status_code,
                message,
            },
            RepzoError::ParseError(msg) => {
                BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            RepzoError::BridgeError(e) => e,
        }
    }
}
