//! Error types for the NetSuite provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// NetSuite provider errors
#[derive(Error, Debug)]
pub enum NetSuiteError {
    /// Credentials were rejected (401/403)
    #[error("Authentication failed (status {status_code}): {message}")]
    AuthenticationFailed { status_code: u16, message: String },

    /// Query service returned an error
    #[error("NetSuite API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Request could not be signed
    #[error(transparent)]
    Signing(#[from] core_auth::AuthError),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for NetSuite operations
pub type Result<T> = std::result::Result<T, NetSuiteError>;

impl From<NetSuiteError> for BridgeError {
    fn from(error: NetSuiteError) -> Self {
        match error {
            NetSuiteError::AuthenticationFailed {
                status_code,
                message,
            }
            | NetSuiteError::ApiError {
                status_code,
                message,
            } => BridgeError::Remote {
                status: status_code,
                message,
            },
            NetSuiteError::ParseError(msg) => {
                BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            NetSuiteError::Signing(e) => BridgeError::OperationFailed(e.to_string()),
            NetSuiteError::BridgeError(e) => e,
        }
    }
}
