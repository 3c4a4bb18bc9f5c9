//! ERP Source Abstractions
//!
//! Contract for the external system customers are pulled from. The connector
//! only answers single page requests; pagination policy, failure accounting and
//! watermark handling live in `core-sync`.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Time filter applied to a source query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeWindow {
    /// No filter, every record is returned (first sync).
    Full,
    /// Records modified on or after the given day.
    ModifiedSince(NaiveDate),
}

impl ChangeWindow {
    pub fn is_full(&self) -> bool {
        matches!(self, ChangeWindow::Full)
    }

    /// Lower bound of the window, if any
    pub fn since(&self) -> Option<NaiveDate> {
        match self {
            ChangeWindow::Full => None,
            ChangeWindow::ModifiedSince(date) => Some(*date),
        }
    }
}

/// Customer record as read from the ERP.
///
/// A read-only snapshot for the duration of a run. Every field except `id` may
/// be missing in the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceCustomer {
    /// Opaque source identity
    pub id: String,
    /// Display (company) name
    pub company_name: Option<String>,
    /// Alternate name, used when the company name is absent
    pub alt_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Free-text comment
    pub comments: Option<String>,
    /// Credit limit as sent by the source (number or numeric text)
    pub credit_limit: Option<String>,
    /// Last-modified timestamp as sent by the source
    pub last_modified: Option<String>,
    /// Human-readable entity code
    pub entity_id: Option<String>,
}

/// One page of a source query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourcePage {
    /// Total number of matching records across all pages
    pub total_results: u64,
    /// Whether the source holds more records after this page
    pub has_more: bool,
    pub items: Vec<SourceCustomer>,
}

/// Paginated customer source
///
/// # Example
///
/// ```ignore
/// use bridge_traits::source::{ChangeWindow, CustomerSource};
///
/// async fn count(source: &dyn CustomerSource) -> Result<u64> {
///     let page = source.fetch_page(&ChangeWindow::Full, 1, 0).await?;
///     Ok(page.total_results)
/// }
/// ```
#[async_trait]
pub trait CustomerSource: Send + Sync {
    /// Fetch `limit` customers starting at `offset` within `window`.
    async fn fetch_page(&self, window: &ChangeWindow, limit: u32, offset: u64)
        -> Result<SourcePage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_window_since() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();

        assert!(ChangeWindow::Full.is_full());
        assert_eq!(ChangeWindow::Full.since(), None);
        assert!(!ChangeWindow::ModifiedSince(date).is_full());
        assert_eq!(ChangeWindow::ModifiedSince(date).since(), Some(date));
    }
}
