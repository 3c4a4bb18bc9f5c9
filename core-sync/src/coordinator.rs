//! # Client Sync Coordinator
//!
//! Runs one NetSuite → Repzo customer sync.
//!
//! ## Workflow
//!
//! 1. Load (or start) the command log record and mark the run `processing`
//! 2. Derive the change window from the stored watermark
//! 3. Count changed customers; stop early when there are none
//! 4. Page through changed customers, reporting failed pages
//! 5. Enumerate linked Repzo clients, reporting failed pages
//! 6. Create missing clients and update stale ones
//! 7. Advance the watermark to the run's start time
//! 8. Store the result and the failure report with status `success`
//!
//! Any error escaping these steps marks the run `fail` with a
//! [`RunFailure`] and is returned to the caller.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_sync::{ClientSyncCoordinator, SyncConfig, SyncRequest};
//!
//! let coordinator = ClientSyncCoordinator::new(
//!     SyncConfig::default(),
//!     netsuite,
//!     repzo.clone(),
//!     repzo.clone(),
//!     repzo,
//!     Arc::new(SystemClock),
//! );
//! let result = coordinator.run(&SyncRequest::from(&settings)).await?;
//! println!("{} clients saved", result.migrated_docs);
//! ```

use bridge_traits::crm::{ClientService, CommandLogStore, IntegrationConfigStore};
use bridge_traits::source::CustomerSource;
use bridge_traits::time::Clock;
use chrono::{DateTime, Utc};
use core_runtime::config::JobSettings;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::enumerator::TargetEnumerator;
use crate::error::RunFailure;
use crate::extractor::SourceExtractor;
use crate::job::{RunId, RunStatus};
use crate::reconciler::Reconciler;
use crate::report::{CommandLog, FailureReport, SyncResult};
use crate::window::WatermarkTracker;
use crate::{Result, SyncError};

/// Default page size for both NetSuite and Repzo reads
pub const DEFAULT_PAGE_SIZE: u32 = 300;

/// Integration option holding the client watermark
pub const DEFAULT_WATERMARK_KEY: &str = "bench_time_client";

/// Sync job configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// SuiteQL page size
    pub source_page_size: u32,

    /// Repzo `per_page` when enumerating clients
    pub target_page_size: u32,

    /// Integration option the watermark is read from and written to
    pub watermark_key: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source_page_size: DEFAULT_PAGE_SIZE,
            target_page_size: DEFAULT_PAGE_SIZE,
            watermark_key: DEFAULT_WATERMARK_KEY.to_string(),
        }
    }
}

impl SyncConfig {
    pub fn with_source_page_size(mut self, size: u32) -> Self {
        self.source_page_size = size;
        self
    }

    pub fn with_target_page_size(mut self, size: u32) -> Self {
        self.target_page_size = size;
        self
    }

    pub fn with_watermark_key(mut self, key: impl Into<String>) -> Self {
        self.watermark_key = key.into();
        self
    }
}

/// What a single run needs to know about the integration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncRequest {
    pub app_id: String,
    pub command: String,
    pub namespace: String,
    /// Stored watermark, empty for a first sync
    pub watermark: String,
    pub sync_id: String,
}

impl SyncRequest {
    fn validate(&self) -> Result<()> {
        if self.app_id.trim().is_empty() {
            return Err(SyncError::Config("app id is required".to_string()));
        }
        if self.namespace.trim().is_empty() {
            return Err(SyncError::Config("namespace is required".to_string()));
        }
        Ok(())
    }
}

impl From<&JobSettings> for SyncRequest {
    fn from(settings: &JobSettings) -> Self {
        Self {
            app_id: settings.app_id.clone(),
            command: settings.command.clone(),
            namespace: settings.namespace.clone(),
            watermark: settings.watermark.clone(),
            sync_id: settings.sync_id.clone(),
        }
    }
}

/// State owned by one run and handed to each phase.
#[derive(Debug)]
pub struct RunContext {
    pub run_id: RunId,
    /// Captured before any request; becomes the next watermark
    pub started_at: DateTime<Utc>,
    pub result: SyncResult,
    pub report: FailureReport,
}

impl RunContext {
    pub fn new(command: &str, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id: RunId::new(),
            started_at,
            result: SyncResult::new(command),
            report: FailureReport::new(),
        }
    }
}

/// Coordinates one customer sync run end to end.
pub struct ClientSyncCoordinator {
    config: SyncConfig,
    source: Arc<dyn CustomerSource>,
    clients: Arc<dyn ClientService>,
    config_store: Arc<dyn IntegrationConfigStore>,
    log_store: Arc<dyn CommandLogStore>,
    clock: Arc<dyn Clock>,
}

impl ClientSyncCoordinator {
    pub fn new(
        config: SyncConfig,
        source: Arc<dyn CustomerSource>,
        clients: Arc<dyn ClientService>,
        config_store: Arc<dyn IntegrationConfigStore>,
        log_store: Arc<dyn CommandLogStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            source,
            clients,
            config_store,
            log_store,
            clock,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Execute one run.
    ///
    /// Per-page and per-record failures end up in the stored report and the
    /// returned counters; only run-aborting errors are returned as `Err`.
    #[instrument(
        skip_all,
        fields(
            run_id = tracing::field::Empty,
            app_id = %request.app_id,
            sync_id = %request.sync_id,
            namespace = %request.namespace
        )
    )]
    pub async fn run(&self, request: &SyncRequest) -> Result<SyncResult> {
        request.validate()?;

        let mut ctx = RunContext::new(&request.command, self.clock.now());
        tracing::Span::current().record("run_id", tracing::field::display(ctx.run_id));

        let mut log = match CommandLog::load(
            self.log_store.clone(),
            self.clock.clone(),
            &request.app_id,
            &request.command,
            &request.sync_id,
        )
        .await
        {
            Ok(log) => log,
            Err(e) => {
                let failure = RunFailure::from(&e);
                error!(kind = %failure.kind, error = %failure.message, "Could not load command log");
                let mut log = CommandLog::fresh(
                    self.log_store.clone(),
                    self.clock.clone(),
                    &request.app_id,
                    &request.command,
                    &request.sync_id,
                );
                Self::record_failure(&mut log, &failure).await;
                return Err(e);
            }
        };

        match self.execute(request, &mut ctx, &mut log).await {
            Ok(()) => {
                info!(
                    created = ctx.result.created,
                    updated = ctx.result.updated,
                    failed = ctx.result.failed,
                    reported = ctx.report.len(),
                    "Sync run finished"
                );
                Ok(ctx.result)
            }
            Err(e) => {
                let failure = RunFailure::from(&e);
                error!(kind = %failure.kind, error = %failure.message, "Sync run failed");
                Self::record_failure(&mut log, &failure).await;
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        request: &SyncRequest,
        ctx: &mut RunContext,
        log: &mut CommandLog,
    ) -> Result<()> {
        log.set_status(RunStatus::Processing, None)?
            .add_detail("Repzo Netsuite: Started syncing Netsuite Customers to Repzo...")
            .commit()
            .await?;

        let tracker = WatermarkTracker::new(
            self.config_store.clone(),
            request.app_id.as_str(),
            self.config.watermark_key.as_str(),
            request.watermark.as_str(),
            ctx.started_at,
        );
        let window = tracker.window()?;

        let extraction = SourceExtractor::new(self.source.clone(), self.config.source_page_size)
            .open(window)
            .await?;

        let since = match tracker.stored().trim() {
            "" => "ever",
            stored => stored,
        };
        log.add_detail(format!(
            "{} clients changed since {}",
            extraction.total_results(),
            since
        ))
        .commit()
        .await?;

        if extraction.is_empty() {
            log.add_detail(
                "All NetSuite customers are up to date with the clients in Repzo. No discrepancies found.",
            );
            tracker.advance().await?;
            return self.finish(ctx, log).await;
        }

        ctx.result.netsuite_total = extraction.total_results();
        let customers = extraction.collect(&mut ctx.report).await;

        let targets = TargetEnumerator::new(self.clients.clone(), self.config.target_page_size)
            .collect(&mut ctx.report)
            .await?;

        Reconciler::new(self.clients.clone(), self.clock.clone(), request.namespace.as_str())
            .reconcile(customers, targets, &mut ctx.result, &mut ctx.report)
            .await;

        log.add_detail(format!(
            "Successfully saved {} clients to Repzo.",
            ctx.result.migrated_docs
        ));
        tracker.advance().await?;

        self.finish(ctx, log).await
    }

    async fn finish(&self, ctx: &RunContext, log: &mut CommandLog) -> Result<()> {
        let body = serde_json::to_value(&ctx.result)?;
        log.set_status(RunStatus::Success, Some(ctx.report.to_value()))?
            .set_body(body)
            .commit()
            .await
    }

    async fn record_failure(log: &mut CommandLog, failure: &RunFailure) {
        let error = serde_json::to_value(failure).ok();
        match log.set_status(RunStatus::Fail, error) {
            Ok(log) => {
                if let Err(e) = log.commit().await {
                    warn!(error = %e, "Could not store failed run status");
                }
            }
            Err(e) => warn!(error = %e, "Run already reached a terminal status"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_config_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.source_page_size, 300);
        assert_eq!(config.target_page_size, 300);
        assert_eq!(config.watermark_key, "bench_time_client");
    }

    #[test]
    fn test_sync_config_builders() {
        let config = SyncConfig::default()
            .with_source_page_size(50)
            .with_target_page_size(25)
            .with_watermark_key("bench_time_item");

        assert_eq!(config.source_page_size, 50);
        assert_eq!(config.target_page_size, 25);
        assert_eq!(config.watermark_key, "bench_time_item");
    }

    #[test]
    fn test_request_validation() {
        let mut request = SyncRequest {
            app_id: "app-1".to_string(),
            command: "add_client".to_string(),
            namespace: "acme".to_string(),
            ..Default::default()
        };
        assert!(request.validate().is_ok());

        request.app_id = " ".to_string();
        assert!(matches!(request.validate(), Err(SyncError::Config(_))));
    }
}
