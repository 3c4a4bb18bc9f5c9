//! # Run Reporter
//!
//! Accumulates the run result and the failure report, and writes the run's
//! narrative and terminal status to the command log.

use bridge_traits::crm::{CommandLogDetail, CommandLogRecord, CommandLogStore};
use bridge_traits::time::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::job::RunStatus;
use crate::{Result, SyncError};

// ============================================================================
// Result
// ============================================================================

/// Counters of one run, stored as the command log body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub command: String,
    pub netsuite_total: u64,
    pub created: u64,
    pub updated: u64,
    pub failed: u64,
    /// Always `created + updated`
    pub migrated_docs: u64,
}

impl SyncResult {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    pub fn record_created(&mut self) {
        self.created += 1;
        self.migrated_docs = self.created + self.updated;
    }

    pub fn record_updated(&mut self) {
        self.updated += 1;
        self.migrated_docs = self.created + self.updated;
    }

    pub fn record_failed(&mut self) {
        self.failed += 1;
    }
}

// ============================================================================
// Failure Report
// ============================================================================

/// Operation a report entry refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureMethod {
    FetchingData,
    Insert,
    Update,
}

/// One non-fatal failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedDoc {
    pub method: FailureMethod,
    pub error_message: String,
}

/// Append-only list of non-fatal failures of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureReport {
    entries: Vec<FailedDoc>,
}

impl FailureReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, method: FailureMethod, error_message: impl Into<String>) {
        self.entries.push(FailedDoc {
            method,
            error_message: error_message.into(),
        });
    }

    pub fn entries(&self) -> &[FailedDoc] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Report as stored on a successful run: the entry list, or `null` when empty.
    pub fn to_value(&self) -> Value {
        if self.entries.is_empty() {
            Value::Null
        } else {
            serde_json::to_value(&self.entries).unwrap_or(Value::Null)
        }
    }
}

// ============================================================================
// Command Log
// ============================================================================

/// Writer for one run's command log record.
///
/// Narrative lines and status changes are buffered on the record and only
/// reach the store on [`CommandLog::commit`].
pub struct CommandLog {
    store: Arc<dyn CommandLogStore>,
    clock: Arc<dyn Clock>,
    record: CommandLogRecord,
    status: RunStatus,
}

impl CommandLog {
    /// Resume the record for `sync_id`, or start a new one.
    ///
    /// A resumed record keeps its id and details; its status restarts at
    /// `received` because every invocation is a fresh pass through the run
    /// state machine.
    pub async fn load(
        store: Arc<dyn CommandLogStore>,
        clock: Arc<dyn Clock>,
        app_id: &str,
        command: &str,
        sync_id: &str,
    ) -> Result<Self> {
        let existing = if sync_id.is_empty() {
            None
        } else {
            store.load(sync_id).await.map_err(SyncError::RunLog)?
        };

        let Some(mut record) = existing else {
            return Ok(Self::fresh(store, clock, app_id, command, sync_id));
        };
        debug!(sync_id, previous_status = %record.status, "Resuming command log");
        record.status = RunStatus::Received.as_str().to_string();

        Ok(Self {
            store,
            clock,
            record,
            status: RunStatus::Received,
        })
    }

    /// Start a new record for `sync_id` without consulting the store.
    pub fn fresh(
        store: Arc<dyn CommandLogStore>,
        clock: Arc<dyn Clock>,
        app_id: &str,
        command: &str,
        sync_id: &str,
    ) -> Self {
        let record = CommandLogRecord {
            app_id: app_id.to_string(),
            command: command.to_string(),
            sync_id: (!sync_id.is_empty()).then(|| sync_id.to_string()),
            status: RunStatus::Received.as_str().to_string(),
            ..Default::default()
        };

        Self {
            store,
            clock,
            record,
            status: RunStatus::Received,
        }
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn record(&self) -> &CommandLogRecord {
        &self.record
    }

    /// Append a narrative line.
    pub fn add_detail(&mut self, content: impl Into<String>) -> &mut Self {
        let content = content.into();
        info!(target: "core_sync::run_log", "{}", content);
        self.record.details.push(CommandLogDetail {
            timestamp: self.clock.now(),
            content,
        });
        self
    }

    /// Move the run to `status`, storing `error` (report or failure) alongside.
    pub fn set_status(&mut self, status: RunStatus, error: Option<Value>) -> Result<&mut Self> {
        self.status.validate_transition(status)?;
        self.status = status;
        self.record.status = status.as_str().to_string();
        self.record.error = error.filter(|e| !e.is_null());
        Ok(self)
    }

    pub fn set_body(&mut self, body: Value) -> &mut Self {
        self.record.body = Some(body);
        self
    }

    /// Persist the record, adopting the id the store assigns.
    pub async fn commit(&mut self) -> Result<()> {
        let saved = self
            .store
            .save(&self.record)
            .await
            .map_err(SyncError::RunLog)?;
        if self.record.id.is_none() {
            self.record.id = saved.id;
        }
        Ok(())
    }
}
