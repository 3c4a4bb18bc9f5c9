//! # Source Extractor
//!
//! Pages through the customers inside a change window.
//!
//! A first request of size 1 yields the total count. Full pages follow,
//! offset by the page size, until the source reports no more records, returns
//! an empty page, or the offset reaches the total. A failing page is yielded
//! as [`ExtractedPage::Failed`] and the offset still advances, so the sequence
//! always terminates.

use bridge_traits::error::BridgeError;
use bridge_traits::source::{ChangeWindow, CustomerSource, SourceCustomer};
use futures::stream::{self, Stream, StreamExt};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::report::{FailureMethod, FailureReport};
use crate::{Result, SyncError};

/// One step of an extraction
#[derive(Debug)]
pub enum ExtractedPage {
    Records { offset: u64, items: Vec<SourceCustomer> },
    Failed { offset: u64, error: BridgeError },
}

pub struct SourceExtractor {
    source: Arc<dyn CustomerSource>,
    page_size: u32,
}

impl SourceExtractor {
    pub fn new(source: Arc<dyn CustomerSource>, page_size: u32) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
        }
    }

    /// Issue the count request. Failure here aborts the run.
    #[instrument(skip(self), fields(since = ?window.since()))]
    pub async fn open(&self, window: ChangeWindow) -> Result<Extraction> {
        let head = self
            .source
            .fetch_page(&window, 1, 0)
            .await
            .map_err(SyncError::Source)?;

        debug!(
            total_results = head.total_results,
            has_more = head.has_more,
            "Count request answered"
        );

        Ok(Extraction {
            source: self.source.clone(),
            window,
            page_size: self.page_size,
            total_results: head.total_results,
            head_empty: head.items.is_empty(),
        })
    }
}

/// An opened extraction: the total count plus the pages still to read.
pub struct Extraction {
    source: Arc<dyn CustomerSource>,
    window: ChangeWindow,
    page_size: u32,
    total_results: u64,
    head_empty: bool,
}

struct Cursor {
    offset: u64,
    done: bool,
}

impl Extraction {
    /// Total reported by the count request
    pub fn total_results(&self) -> u64 {
        self.total_results
    }

    /// Whether the window holds nothing to sync.
    pub fn is_empty(&self) -> bool {
        self.head_empty || self.total_results == 0
    }

    /// Lazy, single-pass sequence of pages.
    pub fn pages(self) -> impl Stream<Item = ExtractedPage> {
        let Extraction {
            source,
            window,
            page_size,
            total_results,
            head_empty,
        } = self;

        let start = Cursor {
            offset: 0,
            done: head_empty || total_results == 0,
        };

        stream::unfold(start, move |cursor| {
            let source = source.clone();
            async move {
                if cursor.done || cursor.offset >= total_results {
                    return None;
                }

                let offset = cursor.offset;
                let next_offset = offset + u64::from(page_size);

                match source.fetch_page(&window, page_size, offset).await {
                    Ok(page) if page.items.is_empty() => None,
                    Ok(page) => {
                        debug!(offset, items = page.items.len(), "Source page fetched");
                        let next = Cursor {
                            offset: next_offset,
                            done: !page.has_more,
                        };
                        Some((
                            ExtractedPage::Records {
                                offset,
                                items: page.items,
                            },
                            next,
                        ))
                    }
                    Err(error) => {
                        warn!(offset, error = %error, "Source page failed, skipping");
                        let next = Cursor {
                            offset: next_offset,
                            done: false,
                        };
                        Some((ExtractedPage::Failed { offset, error }, next))
                    }
                }
            }
        })
    }

    /// Drain every page, reporting failed ones.
    pub async fn collect(self, report: &mut FailureReport) -> Vec<SourceCustomer> {
        let mut customers = Vec::with_capacity(self.total_results.min(10_000) as usize);
        let mut pages = Box::pin(self.pages());

        while let Some(page) = pages.next().await {
            match page {
                ExtractedPage::Records { items, .. } => customers.extend(items),
                ExtractedPage::Failed { error, .. } => report.push(
                    FailureMethod::FetchingData,
                    format!(
                        "Failed to retrieve data from NetSuite. The server responded with an error: {}. Proceeding to the next page.",
                        error
                    ),
                ),
            }
        }

        customers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::source::SourcePage;
    use mockall::mock;
    use mockall::Sequence;

    mock! {
        Source {}

        #[async_trait]
        impl CustomerSource for Source {
            async fn fetch_page(&self, window: &ChangeWindow, limit: u32, offset: u64)
                -> BridgeResult<SourcePage>;
        }
    }

    fn page(total: u64, has_more: bool, ids: std::ops::Range<u32>) -> SourcePage {
        SourcePage {
            total_results: total,
            has_more,
            items: ids
                .map(|id| SourceCustomer {
                    id: id.to_string(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_count_failure_is_fatal() {
        let mut source = MockSource::new();
        source
            .expect_fetch_page()
            .times(1)
            .returning(|_, _, _| Err(BridgeError::OperationFailed("down".to_string())));

        let result = SourceExtractor::new(Arc::new(source), 300)
            .open(ChangeWindow::Full)
            .await;

        assert!(matches!(result, Err(SyncError::Source(_))));
    }

    #[tokio::test]
    async fn test_empty_window() {
        let mut source = MockSource::new();
        source
            .expect_fetch_page()
            .times(1)
            .returning(|_, _, _| Ok(page(0, false, 0..0)));

        let extraction = SourceExtractor::new(Arc::new(source), 300)
            .open(ChangeWindow::Full)
            .await
            .unwrap();

        assert!(extraction.is_empty());
        let mut report = FailureReport::new();
        assert!(extraction.collect(&mut report).await.is_empty());
    }

    #[tokio::test]
    async fn test_single_record_is_fetched_despite_has_more_false() {
        let mut source = MockSource::new();
        let mut seq = Sequence::new();
        source
            .expect_fetch_page()
            .withf(|_, limit, offset| *limit == 1 && *offset == 0)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(page(1, false, 0..1)));
        source
            .expect_fetch_page()
            .withf(|_, limit, offset| *limit == 300 && *offset == 0)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(page(1, false, 0..1)));

        let extraction = SourceExtractor::new(Arc::new(source), 300)
            .open(ChangeWindow::Full)
            .await
            .unwrap();
        let mut report = FailureReport::new();
        let customers = extraction.collect(&mut report).await;

        assert_eq!(customers.len(), 1);
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_failed_page_advances_offset() {
        let mut source = MockSource::new();
        source
            .expect_fetch_page()
            .withf(|_, limit, _| *limit == 1)
            .returning(|_, _, _| Ok(page(700, true, 0..1)));
        source
            .expect_fetch_page()
            .withf(|_, limit, offset| *limit == 300 && *offset == 0)
            .times(1)
            .returning(|_, _, _| Ok(page(700, true, 0..300)));
        source
            .expect_fetch_page()
            .withf(|_, limit, offset| *limit == 300 && *offset == 300)
            .times(1)
            .returning(|_, _, _| {
                Err(BridgeError::Remote {
                    status: 500,
                    message: "Internal".to_string(),
                })
            });
        source
            .expect_fetch_page()
            .withf(|_, limit, offset| *limit == 300 && *offset == 600)
            .times(1)
            .returning(|_, _, _| Ok(page(700, false, 600..700)));

        let extraction = SourceExtractor::new(Arc::new(source), 300)
            .open(ChangeWindow::Full)
            .await
            .unwrap();
        let mut report = FailureReport::new();
        let customers = extraction.collect(&mut report).await;

        assert_eq!(customers.len(), 400);
        assert_eq!(report.len(), 1);
        assert_eq!(report.entries()[0].method, FailureMethod::FetchingData);
        assert_eq!(
            report.entries()[0].error_message,
            "Failed to retrieve data from NetSuite. The server responded with an error: \
             Remote service returned status 500: Internal. Proceeding to the next page."
        );
    }

    #[tokio::test]
    async fn test_every_page_failing_still_terminates() {
        let mut source = MockSource::new();
        source
            .expect_fetch_page()
            .withf(|_, limit, _| *limit == 1)
            .returning(|_, _, _| Ok(page(650, true, 0..1)));
        source
            .expect_fetch_page()
            .withf(|_, limit, _| *limit == 300)
            .times(3)
            .returning(|_, _, _| Err(BridgeError::OperationFailed("timeout".to_string())));

        let extraction = SourceExtractor::new(Arc::new(source), 300)
            .open(ChangeWindow::Full)
            .await
            .unwrap();
        let mut report = FailureReport::new();
        let customers = extraction.collect(&mut report).await;

        assert!(customers.is_empty());
        assert_eq!(report.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_page_stops_extraction() {
        let mut source = MockSource::new();
        source
            .expect_fetch_page()
            .withf(|_, limit, _| *limit == 1)
            .returning(|_, _, _| Ok(page(900, true, 0..1)));
        source
            .expect_fetch_page()
            .withf(|_, limit, offset| *limit == 300 && *offset == 0)
            .times(1)
            .returning(|_, _, _| Ok(page(900, true, 0..0)));

        let extraction = SourceExtractor::new(Arc::new(source), 300)
            .open(ChangeWindow::Full)
            .await
            .unwrap();
        let mut report = FailureReport::new();

        assert!(extraction.collect(&mut report).await.is_empty());
        assert!(report.is_empty());
    }
}
