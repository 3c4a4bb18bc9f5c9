//! # Bridge Traits
//!
//! Capability contracts shared by the sync core and its connectors.
//!
//! ## Overview
//!
//! This crate defines the seams between the reconciliation logic and everything
//! that talks to the outside world. Each trait represents a capability the core
//! requires but that is implemented by a separate crate (or by an in-memory
//! fake in tests).
//!
//! ## Traits
//!
//! ### Transport
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with optional retry
//!
//! ### Remote systems
//! - [`CustomerSource`](source::CustomerSource) - Paged ERP customer queries
//! - [`ClientService`](crm::ClientService) - CRM client listing, create, update
//! - [`IntegrationConfigStore`](crm::IntegrationConfigStore) - Integration option bag
//! - [`CommandLogStore`](crm::CommandLogStore) - Per-run command log persistence
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert their own errors into it and keep the remote status and
//! message when there is one.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! behind `Arc` across async tasks.

pub mod crm;
pub mod error;
pub mod http;
pub mod scalar;
pub mod source;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use crm::{
    ClientBody, ClientLink, ClientPage, ClientService, CommandLogDetail, CommandLogRecord,
    CommandLogStore, Financials, IntegrationConfigStore, IntegrationMeta,
};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use source::{ChangeWindow, CustomerSource, SourceCustomer, SourcePage};
pub use time::{Clock, FixedClock, LogLevel, SystemClock};
