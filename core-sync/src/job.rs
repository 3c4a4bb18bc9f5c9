//! # Run State Machine
//!
//! Tracks the status of one sync run as it is reported in the command log.
//!
//! ## State Machine
//!
//! ```text
//! Received → Processing → Success
//!     ↓           ↓
//!     └────────→ Fail
//! ```
//!
//! `Success` and `Fail` are terminal; a run reaches exactly one of them.

use crate::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Correlation id attached to every log line of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Status Types
// ============================================================================

/// Status of a run as stored in the command log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Command accepted, nothing done yet
    Received,
    /// Sync in progress
    Processing,
    /// Run finished, possibly with per-record failures in the report
    Success,
    /// Run aborted by a fatal error
    Fail,
}

impl RunStatus {
    /// Check if this status represents a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Success | RunStatus::Fail)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Received => "received",
            RunStatus::Processing => "processing",
            RunStatus::Success => "success",
            RunStatus::Fail => "fail",
        }
    }

    /// Validate a transition from this status to `to`.
    pub fn validate_transition(&self, to: RunStatus) -> Result<()> {
        let valid = match (self, to) {
            (RunStatus::Received, RunStatus::Processing) => true,
            (RunStatus::Received, RunStatus::Fail) => true,

            (RunStatus::Processing, RunStatus::Success) => true,
            (RunStatus::Processing, RunStatus::Fail) => true,

            // Terminal states cannot transition
            (RunStatus::Success, _) => false,
            (RunStatus::Fail, _) => false,

            _ => false,
        };

        if !valid {
            return Err(SyncError::InvalidStateTransition {
                from: self.as_str().to_string(),
                to: to.as_str().to_string(),
                reason: format!("Cannot transition from {} to {}", self.as_str(), to.as_str()),
            });
        }

        Ok(())
    }
}

impl FromStr for RunStatus {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "received" => Ok(RunStatus::Received),
            "processing" => Ok(RunStatus::Processing),
            "success" => Ok(RunStatus::Success),
            "fail" => Ok(RunStatus::Fail),
            _ => Err(SyncError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
