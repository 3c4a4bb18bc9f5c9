use bridge_traits::error::BridgeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to retrieve data from NetSuite. The server responded with an error: {0}")]
    Source(#[source] BridgeError),

    #[error("Failed to retrieve client data from Repzo API on page 1. Error: {0}")]
    Target(#[source] BridgeError),

    #[error("Invalid watermark {value:?}: {reason}")]
    InvalidWatermark { value: String, reason: String },

    #[error("Failed to persist watermark: {0}")]
    WatermarkPersist(#[source] BridgeError),

    #[error("Command log error: {0}")]
    RunLog(#[source] BridgeError),

    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidStateTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid run status: {0}")]
    InvalidStatus(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// Coarse classification of a run-aborting error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Source,
    Target,
    Watermark,
    RunLog,
    Config,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Source => "source",
            FailureKind::Target => "target",
            FailureKind::Watermark => "watermark",
            FailureKind::RunLog => "run_log",
            FailureKind::Config => "config",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SyncError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SyncError::Source(_) => FailureKind::Source,
            SyncError::Target(_) => FailureKind::Target,
            SyncError::InvalidWatermark { .. } | SyncError::WatermarkPersist(_) => {
                FailureKind::Watermark
            }
            SyncError::RunLog(_)
            | SyncError::InvalidStateTransition { .. }
            | SyncError::InvalidStatus(_)
            | SyncError::Serialization(_) => FailureKind::RunLog,
            SyncError::Config(_) => FailureKind::Config,
        }
    }
}

/// Normalised fatal error, as stored on a failed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&SyncError> for RunFailure {
    fn from(error: &SyncError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_failure_from_source_error() {
        let error = SyncError::Source(BridgeError::Remote {
            status: 401,
            message: "INVALID_LOGIN".to_string(),
        });
        let failure = RunFailure::from(&error);

        assert_eq!(failure.kind, FailureKind::Source);
        assert_eq!(
            failure.message,
            "Failed to retrieve data from NetSuite. The server responded with an error: \
             Remote service returned status 401: INVALID_LOGIN"
        );
    }

    #[test]
    fn test_failure_kind_serialization() {
        let failure = RunFailure {
            kind: FailureKind::RunLog,
            message: "boom".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&failure).unwrap(),
            serde_json::json!({ "kind": "run_log", "message": "boom" })
        );
    }

    #[test]
    fn test_watermark_errors_share_kind() {
        let invalid = SyncError::InvalidWatermark {
            value: "yesterday".to_string(),
            reason: "bad date".to_string(),
        };
        let persist = SyncError::WatermarkPersist(BridgeError::OperationFailed("x".to_string()));

        assert_eq!(invalid.kind(), FailureKind::Watermark);
        assert_eq!(persist.kind(), FailureKind::Watermark);
    }
}
