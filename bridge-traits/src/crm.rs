//! CRM Service Abstractions
//!
//! Contracts for the CRM side of a sync run:
//! - [`ClientService`] - paged client listing plus create/update
//! - [`IntegrationConfigStore`] - dotted-path updates to an integration's option bag
//! - [`CommandLogStore`] - persistence for the per-run command log
//!
//! Payload types serialize to the CRM wire names; Rust field names describe
//! what the value means.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::scalar::{null_as_default, optional_string};

/// Link between a CRM client and its source record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationMeta {
    /// `{namespace}_{source id}`, the join key across systems
    #[serde(
        rename = "id",
        default,
        deserialize_with = "optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub composite_id: Option<String>,
    /// Source record identity
    #[serde(
        default,
        deserialize_with = "optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub netsuite_id: Option<String>,
    /// Per-record watermark, ISO-8601
    #[serde(
        default,
        deserialize_with = "optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub netsuite_last_sync: Option<String>,
}

/// Identity projection of a CRM client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientLink {
    #[serde(rename = "_id")]
    pub id: String,
    /// `null` or missing means the client was never linked
    #[serde(default, deserialize_with = "null_as_default")]
    pub integration_meta: IntegrationMeta,
}

impl ClientLink {
    /// Whether this client was ever linked to a source record.
    pub fn is_linked(&self) -> bool {
        self.integration_meta.composite_id.is_some()
    }
}

/// One page of the CRM client listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientPage {
    /// Total number of clients across all pages
    #[serde(default)]
    pub total_result: u64,
    #[serde(default)]
    pub data: Vec<ClientLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<f64>,
}

/// Create or partial-update body for a CRM client.
///
/// `None` fields are omitted from the request, so an update only touches the
/// fields that are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_meta: Option<IntegrationMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financials: Option<Financials>,
}

/// CRM client operations used by a sync run.
#[async_trait]
pub trait ClientService: Send + Sync {
    /// List clients, `page` is 1-based.
    async fn find_page(&self, page: u32, per_page: u32) -> Result<ClientPage>;

    /// Create a client.
    async fn create(&self, body: &ClientBody) -> Result<ClientLink>;

    /// Apply a partial update to client `id`.
    async fn update(&self, id: &str, body: &ClientBody) -> Result<ClientLink>;
}

/// Option-bag updates on an integration instance.
#[async_trait]
pub trait IntegrationConfigStore: Send + Sync {
    /// Set `options_formData.<key>` to `value` on integration `app_id`.
    async fn update_option(&self, app_id: &str, key: &str, value: Value) -> Result<()>;
}

/// Single narrative line of a command log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandLogDetail {
    pub timestamp: DateTime<Utc>,
    pub content: String,
}

/// Persisted command log of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandLogRecord {
    /// Assigned by the store on first save
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_id: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default)]
    pub details: Vec<CommandLogDetail>,
}

/// Storage for command logs.
#[async_trait]
pub trait CommandLogStore: Send + Sync {
    /// Fetch the log of an earlier trigger of the same sync, if any.
    async fn load(&self, sync_id: &str) -> Result<Option<CommandLogRecord>>;

    /// Create (no `id`) or replace (with `id`) a log, returning the stored copy.
    async fn save(&self, record: &CommandLogRecord) -> Result<CommandLogRecord>;
}
