use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request signing failed: {0}")]
    SigningFailed(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
