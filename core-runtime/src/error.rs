use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Logging initialisation failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
