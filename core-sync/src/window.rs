//! # Change-Window Tracker
//!
//! Turns the stored watermark into a source query window and, once the run
//! has reached a successful end, stores the run's start time as the next
//! watermark.
//!
//! The window is day-granular: a watermark of `2025-05-10T17:03:00.000Z`
//! selects everything modified on or after `2025-05-10`. Same-day records are
//! processed again on the next run.

use bridge_traits::crm::IntegrationConfigStore;
use bridge_traits::source::ChangeWindow;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{Result, SyncError};

/// Parse a stored watermark into a query window.
///
/// An empty (or blank) watermark means the integration has never synced.
pub fn change_window(watermark: &str) -> Result<ChangeWindow> {
    let watermark = watermark.trim();
    if watermark.is_empty() {
        return Ok(ChangeWindow::Full);
    }

    let day = watermark.get(..10).ok_or_else(|| SyncError::InvalidWatermark {
        value: watermark.to_string(),
        reason: "too short to hold a date".to_string(),
    })?;

    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map(ChangeWindow::ModifiedSince)
        .map_err(|e| SyncError::InvalidWatermark {
            value: watermark.to_string(),
            reason: e.to_string(),
        })
}

/// Watermark text as stored in the integration options
pub fn format_watermark(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Watermark of one run.
pub struct WatermarkTracker {
    store: Arc<dyn IntegrationConfigStore>,
    app_id: String,
    key: String,
    stored: String,
    run_started: DateTime<Utc>,
}

impl WatermarkTracker {
    pub fn new(
        store: Arc<dyn IntegrationConfigStore>,
        app_id: impl Into<String>,
        key: impl Into<String>,
        stored: impl Into<String>,
        run_started: DateTime<Utc>,
    ) -> Self {
        Self {
            store,
            app_id: app_id.into(),
            key: key.into(),
            stored: stored.into(),
            run_started,
        }
    }

    /// Watermark read at the start of the run (possibly empty)
    pub fn stored(&self) -> &str {
        &self.stored
    }

    pub fn window(&self) -> Result<ChangeWindow> {
        change_window(&self.stored)
    }

    fn stored_instant(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.stored.trim())
            .ok()
            .map(|stored| stored.with_timezone(&Utc))
    }

    /// Value [`advance`](Self::advance) writes: the run's start time, unless
    /// the stored watermark is already later.
    pub fn next_watermark(&self) -> String {
        match self.stored_instant() {
            Some(stored) if stored > self.run_started => self.stored.trim().to_string(),
            _ => format_watermark(self.run_started),
        }
    }

    /// Persist the next watermark.
    pub async fn advance(&self) -> Result<()> {
        if matches!(self.stored_instant(), Some(stored) if stored > self.run_started) {
            warn!(
                stored = %self.stored,
                run_started = %format_watermark(self.run_started),
                "Stored watermark is ahead of this run, leaving it unchanged"
            );
            return Ok(());
        }

        let next = format_watermark(self.run_started);
        self.store
            .update_option(&self.app_id, &self.key, Value::String(next.clone()))
            .await
            .map_err(SyncError::WatermarkPersist)?;

        info!(key = %self.key, watermark = %next, "Watermark advanced");
        Ok(())
    }
}
