use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Route: {0} not found")]
    UnknownRoute(String),

    #[error("Invalid command event: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("NetSuite error: {0}")]
    NetSuite(#[from] provider_netsuite::NetSuiteError),

    #[error("Sync error: {0}")]
    Sync(#[from] core_sync::SyncError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
