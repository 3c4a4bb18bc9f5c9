//! # Target Enumerator
//!
//! Reads every Repzo client linked to this integration, as an id plus
//! integration metadata projection.

use bridge_traits::crm::{ClientLink, ClientService};
use bridge_traits::error::BridgeError;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::report::{FailureMethod, FailureReport};
use crate::{Result, SyncError};

pub struct TargetEnumerator {
    clients: Arc<dyn ClientService>,
    page_size: u32,
}

impl TargetEnumerator {
    pub fn new(clients: Arc<dyn ClientService>, page_size: u32) -> Self {
        Self {
            clients,
            page_size: page_size.max(1),
        }
    }

    /// Collect linked clients page by page (pages are 1-based).
    ///
    /// The count request failing aborts the run; a later page failing is
    /// reported and skipped.
    #[instrument(skip_all)]
    pub async fn collect(&self, report: &mut FailureReport) -> Result<Vec<ClientLink>> {
        let head = self
            .clients
            .find_page(1, 1)
            .await
            .map_err(SyncError::Target)?;

        let total = head.total_result;
        let pages = u32::try_from(total.div_ceil(u64::from(self.page_size))).map_err(|_| {
            SyncError::Target(BridgeError::OperationFailed(format!(
                "client total {} exceeds the pageable range",
                total
            )))
        })?;
        debug!(total, pages, "Enumerating Repzo clients");

        let mut linked = Vec::new();
        for page in 1..=pages {
            match self.clients.find_page(page, self.page_size).await {
                Ok(result) => {
                    linked.extend(result.data.into_iter().filter(ClientLink::is_linked));
                }
                Err(e) => {
                    warn!(page, error = %e, "Client page failed, skipping");
                    report.push(
                        FailureMethod::FetchingData,
                        format!(
                            "Failed to retrieve client data from Repzo API on page {}. Error: {}. Proceeding to the next page.",
                            page, e
                        ),
                    );
                }
            }
        }

        debug!(linked = linked.len(), "Linked clients collected");
        Ok(linked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::crm::{ClientBody, ClientPage, IntegrationMeta};
    use bridge_traits::error::Result as BridgeResult;
    use mockall::mock;

    mock! {
        Clients {}

        #[async_trait]
        impl ClientService for Clients {
            async fn find_page(&self, page: u32, per_page: u32) -> BridgeResult<ClientPage>;
            async fn create(&self, body: &ClientBody) -> BridgeResult<ClientLink>;
            async fn update(&self, id: &str, body: &ClientBody) -> BridgeResult<ClientLink>;
        }
    }

    fn client(id: &str, composite: Option<&str>) -> ClientLink {
        ClientLink {
            id: id.to_string(),
            integration_meta: IntegrationMeta {
                composite_id: composite.map(str::to_string),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_collects_only_linked_clients() {
        let mut clients = MockClients::new();
        clients
            .expect_find_page()
            .withf(|page, per_page| *page == 1 && *per_page == 1)
            .times(1)
            .returning(|_, _| {
                Ok(ClientPage {
                    total_result: 3,
                    data: vec![client("a", Some("ns_1"))],
                })
            });
        clients
            .expect_find_page()
            .withf(|page, per_page| *page == 1 && *per_page == 300)
            .times(1)
            .returning(|_, _| {
                Ok(ClientPage {
                    total_result: 3,
                    data: vec![
                        client("a", Some("ns_1")),
                        client("b", None),
                        client("c", Some("ns_3")),
                    ],
                })
            });

        let mut report = FailureReport::new();
        let linked = TargetEnumerator::new(Arc::new(clients), 300)
            .collect(&mut report)
            .await
            .unwrap();

        let ids: Vec<_> = linked.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_failed_page_is_reported_and_skipped() {
        let mut clients = MockClients::new();
        clients
            .expect_find_page()
            .withf(|_, per_page| *per_page == 1)
            .returning(|_, _| Ok(ClientPage { total_result: 5, data: vec![] }));
        clients
            .expect_find_page()
            .withf(|page, per_page| *page == 1 && *per_page == 2)
            .returning(|_, _| Err(BridgeError::OperationFailed("reset".to_string())));
        clients
            .expect_find_page()
            .withf(|page, per_page| *page > 1 && *per_page == 2)
            .times(2)
            .returning(|page, _| {
                Ok(ClientPage {
                    total_result: 5,
                    data: vec![client(&format!("p{}", page), Some("ns_x"))],
                })
            });

        let mut report = FailureReport::new();
        let linked = TargetEnumerator::new(Arc::new(clients), 2)
            .collect(&mut report)
            .await
            .unwrap();

        assert_eq!(linked.len(), 2);
        assert_eq!(report.len(), 1);
        assert_eq!(
            report.entries()[0].error_message,
            "Failed to retrieve client data from Repzo API on page 1. \
             Error: Bridge operation failed: reset. Proceeding to the next page."
        );
    }

    #[tokio::test]
    async fn test_count_failure_is_fatal() {
        let mut clients = MockClients::new();
        clients.expect_find_page().times(1).returning(|_, _| {
            Err(BridgeError::Remote {
                status: 401,
                message: "bad key".to_string(),
            })
        });

        let mut report = FailureReport::new();
        let err = TargetEnumerator::new(Arc::new(clients), 300)
            .collect(&mut report)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Target(_)));
        assert_eq!(
            err.to_string(),
            "Failed to retrieve client data from Repzo API on page 1. \
             Error: Remote service returned status 401: bad key"
        );
    }

    #[tokio::test]
    async fn test_unpageable_total_is_rejected() {
        let mut clients = MockClients::new();
        clients
            .expect_find_page()
            .withf(|page, per_page| *page == 1 && *per_page == 1)
            .times(1)
            .returning(|_, _| {
                Ok(ClientPage {
                    total_result: u64::MAX,
                    data: vec![],
                })
            });

        let mut report = FailureReport::new();
        let err = TargetEnumerator::new(Arc::new(clients), 1)
            .collect(&mut report)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Target(_)));
        assert!(err.to_string().ends_with(&format!(
            "client total {} exceeds the pageable range",
            u64::MAX
        )));
        assert!(report.is_empty());
    }
}
