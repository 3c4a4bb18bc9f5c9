//! # Reconciler
//!
//! Joins NetSuite customers to linked Repzo clients by composite id, then
//! creates missing clients and updates stale ones, one call at a time.

use bridge_traits::crm::{ClientBody, ClientLink, ClientService, IntegrationMeta};
use bridge_traits::source::SourceCustomer;
use bridge_traits::time::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::mapping::{composite_id, create_body, parse_timestamp, update_body};
use crate::report::{FailureMethod, FailureReport, SyncResult};
use crate::window::format_watermark;

/// Linked clients keyed by composite id.
#[derive(Debug, Default)]
pub struct TargetIndex {
    by_composite: HashMap<String, ClientLink>,
}

impl TargetIndex {
    pub fn build(targets: Vec<ClientLink>) -> Self {
        let mut by_composite: HashMap<String, ClientLink> = HashMap::with_capacity(targets.len());
        for target in targets {
            let Some(key) = target.integration_meta.composite_id.clone() else {
                continue;
            };
            if let Some(existing) = by_composite.get(&key) {
                warn!(
                    composite_id = %key,
                    kept = %existing.id,
                    ignored = %target.id,
                    "Duplicate composite id in Repzo"
                );
                continue;
            }
            by_composite.insert(key, target);
        }
        Self { by_composite }
    }

    pub fn get(&self, composite_id: &str) -> Option<&ClientLink> {
        self.by_composite.get(composite_id)
    }

    pub fn insert(&mut self, composite_id: String, link: ClientLink) {
        self.by_composite.insert(composite_id, link);
    }

    pub fn len(&self) -> usize {
        self.by_composite.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_composite.is_empty()
    }
}

/// What to do with one source record
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Create(ClientBody),
    Update { client_id: String, body: ClientBody },
    Skip(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Source not modified after the client's last sync
    UpToDate,
    /// Source last-modified value missing or unreadable
    UnreadableTimestamp,
}

/// Decide the action for `customer` against the index.
pub fn plan(customer: &SourceCustomer, index: &TargetIndex, namespace: &str, synced_at: &str) -> Action {
    let key = composite_id(namespace, &customer.id);

    let Some(target) = index.get(&key) else {
        return Action::Create(create_body(customer, namespace, synced_at));
    };

    let Some(modified) = customer.last_modified.as_deref().and_then(parse_timestamp) else {
        return Action::Skip(SkipReason::UnreadableTimestamp);
    };

    let last_sync = target
        .integration_meta
        .netsuite_last_sync
        .as_deref()
        .and_then(parse_timestamp);

    match last_sync {
        Some(last_sync) if modified <= last_sync => Action::Skip(SkipReason::UpToDate),
        _ => Action::Update {
            client_id: target.id.clone(),
            body: update_body(customer, synced_at),
        },
    }
}

pub struct Reconciler {
    clients: Arc<dyn ClientService>,
    clock: Arc<dyn Clock>,
    namespace: String,
}

impl Reconciler {
    pub fn new(clients: Arc<dyn ClientService>, clock: Arc<dyn Clock>, namespace: impl Into<String>) -> Self {
        Self {
            clients,
            clock,
            namespace: namespace.into(),
        }
    }

    /// Apply every customer in order. Per-record failures are counted and
    /// reported; they never stop the loop.
    #[instrument(skip_all, fields(namespace = %self.namespace, customers = customers.len()))]
    pub async fn reconcile(
        &self,
        customers: Vec<SourceCustomer>,
        targets: Vec<ClientLink>,
        result: &mut SyncResult,
        report: &mut FailureReport,
    ) {
        let mut index = TargetIndex::build(targets);
        debug!(linked = index.len(), "Target index built");

        for customer in customers {
            let synced_at = format_watermark(self.clock.now());

            match plan(&customer, &index, &self.namespace, &synced_at) {
                Action::Create(body) => match self.clients.create(&body).await {
                    Ok(created) => {
                        result.record_created();
                        // Duplicate rows later in the same run find this client
                        index.insert(
                            composite_id(&self.namespace, &customer.id),
                            ClientLink {
                                id: created.id,
                                integration_meta: IntegrationMeta {
                                    composite_id: Some(composite_id(&self.namespace, &customer.id)),
                                    netsuite_id: Some(customer.id.clone()),
                                    netsuite_last_sync: Some(synced_at),
                                },
                            },
                        );
                    }
                    Err(e) => {
                        warn!(customer_id = %customer.id, error = %e, "Client create failed");
                        result.record_failed();
                        report.push(
                            FailureMethod::Insert,
                            format!(
                                "Failed to create client in Repzo API for NetSuite customer with ID: {}. Error: {}",
                                customer.id, e
                            ),
                        );
                    }
                },
                Action::Update { client_id, body } => {
                    match self.clients.update(&client_id, &body).await {
                        Ok(_) => result.record_updated(),
                        Err(e) => {
                            warn!(customer_id = %customer.id, client_id = %client_id, error = %e, "Client update failed");
                            result.record_failed();
                            report.push(
                                FailureMethod::Update,
                                format!(
                                    "Failed to update client in Repzo API for NetSuite customer with ID: {}. Error: {}",
                                    customer.id, e
                                ),
                            );
                        }
                    }
                }
                Action::Skip(SkipReason::UnreadableTimestamp) => {
                    warn!(
                        customer_id = %customer.id,
                        last_modified = ?customer.last_modified,
                        "Skipping customer with unreadable last-modified date"
                    );
                }
                Action::Skip(SkipReason::UpToDate) => {}
            }
        }
    }
}
