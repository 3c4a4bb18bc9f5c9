//! # Customer Sync
//!
//! Incremental NetSuite → Repzo customer synchronisation.
//!
//! ## Overview
//!
//! One run reads the customers changed since the stored watermark, joins them
//! to the Repzo clients already linked to the integration, creates what is
//! missing and updates what is stale. Progress and the outcome are written to
//! the Repzo command log.
//!
//! ## Components
//!
//! - **Change-Window Tracker** (`window`): watermark → query window, and the post-run advance
//! - **Source Extractor** (`extractor`): paged SuiteQL reads with skip-and-report on failed pages
//! - **Target Enumerator** (`enumerator`): paged read of linked Repzo clients
//! - **Reconciler** (`reconciler`): composite-id join, create/update decisions
//! - **Run Reporter** (`report`): result counters, failure report, command log writer
//! - **Run State Machine** (`job`): `received → processing → success | fail`
//! - **Coordinator** (`coordinator`): wires the phases into a run

pub mod coordinator;
pub mod enumerator;
pub mod error;
pub mod extractor;
pub mod job;
pub mod mapping;
pub mod reconciler;
pub mod report;
pub mod window;

pub use coordinator::{ClientSyncCoordinator, RunContext, SyncConfig, SyncRequest};
pub use error::{FailureKind, Result, RunFailure, SyncError};
pub use job::{RunId, RunStatus};
pub use report::{CommandLog, FailedDoc, FailureMethod, FailureReport, SyncResult};
