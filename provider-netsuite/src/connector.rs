//! SuiteQL connector implementation
//!
//! Implements the `CustomerSource` trait against NetSuite's REST query service.

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::source::{ChangeWindow, CustomerSource, SourcePage};
use bridge_traits::time::Clock;
use core_auth::{ConsumerCredentials, OAuth1Signer, TokenCredentials};
use core_runtime::config::NetSuiteAccess;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::{NetSuiteError, Result};
use crate::types::{SuiteQlQuery, SuiteQlResponse};

/// Path of the SuiteQL query service below the account REST root
const SUITEQL_PATH: &str = "/services/rest/query/v1/suiteql";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// NetSuite SuiteQL connector
///
/// # Features
///
/// - Day-granular `lastmodifieddate` filter for incremental runs
/// - One signed request per page, no retries (the extractor decides what a
///   failed page means)
/// - `Prefer: transient` so NetSuite does not cache the result set
///
/// # Example
///
/// ```ignore
/// use provider_netsuite::NetSuiteConnector;
/// use bridge_traits::source::{ChangeWindow, CustomerSource};
///
/// let connector = NetSuiteConnector::from_access(http_client, &settings.netsuite, clock)?;
/// let page = connector.fetch_page(&ChangeWindow::Full, 300, 0).await?;
/// ```
pub struct NetSuiteConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// Request signer bound to the integration's token
    signer: OAuth1Signer,

    /// Account REST root, without trailing slash
    base_url: String,
}

impl NetSuiteConnector {
    pub fn new(http_client: Arc<dyn HttpClient>, signer: OAuth1Signer, base_url: &str) -> Self {
        Self {
            http_client,
            signer,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build a connector from validated job settings.
    pub fn from_access(
        http_client: Arc<dyn HttpClient>,
        access: &NetSuiteAccess,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let consumer = ConsumerCredentials::new(&access.consumer_key, &access.consumer_secret)?;
        let token = TokenCredentials::new(&access.token_key, &access.token_secret)?;
        let signer = OAuth1Signer::new(consumer, token, Some(access.realm.clone()), clock);

        Ok(Self::new(http_client, signer, &access.suite_talk_url))
    }

    /// SuiteQL for the customers inside `window`.
    ///
    /// The filter compares against the start of the day, so records changed
    /// earlier on the watermark's day are read again.
    pub fn query_for(window: &ChangeWindow) -> SuiteQlQuery {
        let q = match window {
            ChangeWindow::Full => "SELECT * from customer ".to_string(),
            ChangeWindow::ModifiedSince(day) => format!(
                "SELECT * from customer WHERE lastmodifieddate >= TO_DATE('{}', 'YYYY-MM-DD')",
                day.format("%Y-%m-%d")
            ),
        };
        SuiteQlQuery { q }
    }

    fn endpoint(&self, limit: u32, offset: u64) -> String {
        format!(
            "{}{}?limit={}&offset={}",
            self.base_url, SUITEQL_PATH, limit, offset
        )
    }

    fn build_request(&self, window: &ChangeWindow, limit: u32, offset: u64) -> Result<HttpRequest> {
        let request = HttpRequest::new(HttpMethod::Post, self.endpoint(limit, offset))
            .json(&Self::query_for(window))?
            .header("Accept", "application/json")
            .header("Prefer", "transient")
            .timeout(REQUEST_TIMEOUT);

        Ok(self.signer.sign(request)?)
    }

    fn check_status(response: HttpResponse) -> Result<HttpResponse> {
        if response.is_success() {
            return Ok(response);
        }
        match response.status {
            401 | 403 => Err(NetSuiteError::AuthenticationFailed {
                status_code: response.status,
                message: String::from_utf8_lossy(&response.body).to_string(),
            }),
            status => Err(NetSuiteError::ApiError {
                status_code: status,
                message: String::from_utf8_lossy(&response.body).to_string(),
            }),
        }
    }

    #[instrument(skip(self), fields(since = ?window.since()))]
    async fn query_page(&self, window: &ChangeWindow, limit: u32, offset: u64) -> Result<SourcePage> {
        let request = self.build_request(window, limit, offset)?;
        let response = self.http_client.execute(request).await?;

        let response = Self::check_status(response).map_err(|e| {
            warn!(error = %e, "SuiteQL request failed");
            e
        })?;

        let body: SuiteQlResponse = serde_json::from_slice(&response.body)
            .map_err(|e| NetSuiteError::ParseError(e.to_string()))?;

        debug!(
            total_results = body.total_results,
            has_more = body.has_more,
            items = body.items.len(),
            "SuiteQL page received"
        );

        Ok(body.into())
    }
}

#[async_trait]
impl CustomerSource for NetSuiteConnector {
    async fn fetch_page(
        &self,
        window: &ChangeWindow,
        limit: u32,
        offset: u64,
    ) -> BridgeResult<SourcePage> {
        Ok(self.query_page(window, limit, offset).await?)
    }
}
