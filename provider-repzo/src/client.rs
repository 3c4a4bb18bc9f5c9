//! Repzo REST client
//!
//! One client serves all three CRM contracts; they share the base URL, the
//! `api-key` header and error mapping.

use async_trait::async_trait;
use bridge_traits::crm::{
    ClientBody, ClientLink, ClientPage, ClientService, CommandLogRecord, CommandLogStore,
    IntegrationConfigStore,
};
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use core_runtime::config::Environment;
use core_runtime::logging::redact_if_sensitive;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::{RepzoError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Base URL of the Repzo API for `env`
pub fn base_url(env: Environment) -> &'static str {
    match env {
        Environment::Production => "https://sv.api.repzo.me",
        Environment::Staging => "https://staging.sv.api.repzo.me",
        Environment::Local => "http://localhost:3030",
    }
}

/// Repzo API client
///
/// # Example
///
/// ```ignore
/// use provider_repzo::RepzoClient;
/// use bridge_traits::crm::ClientService;
///
/// let repzo = RepzoClient::new(http_client, settings.repzo_api_key.clone(), settings.environment);
/// let page = repzo.find_page(1, 300).await?;
/// ```
pub struct RepzoClient {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for RepzoClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepzoClient")
            .field("api_key", &redact_if_sensitive("api_key", &self.api_key))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl RepzoClient {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: String, env: Environment) -> Self {
        Self::with_base_url(http_client, api_key, base_url(env))
    }

    /// Point the client at an explicit base URL.
    pub fn with_base_url(
        http_client: Arc<dyn HttpClient>,
        api_key: String,
        base_url: &str,
    ) -> Self {
        Self {
            http_client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest::new(method, format!("{}{}", self.base_url, path))
            .header("api-key", self.api_key.clone())
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT)
    }

    fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest> {
        Ok(self.request(method, path).json(body)?)
    }

    fn check_status(response: HttpResponse) -> Result<HttpResponse> {
        if response.is_success() {
            return Ok(response);
        }
        match response.status {
            401 | 403 => Err(RepzoError::AuthenticationFailed {
                status_code: response.status,
                message: String::from_utf8_lossy(&response.body).to_string(),
            }),
            status => Err(RepzoError::ApiError {
                status_code: status,
                message: String::from_utf8_lossy(&response.body).to_string(),
            }),
        }
    }

    fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
        serde_json::from_slice(&response.body).map_err(|e| RepzoError::ParseError(e.to_string()))
    }

    async fn send<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        let method = request.method;
        let url = request.url.clone();
        let response = self.http_client.execute(request).await?;

        let response = Self::check_status(response).map_err(|e| {
            warn!(method = method.as_str(), url = %url, error = %e, "Repzo request failed");
            e
        })?;

        Self::decode(&response)
    }

    #[instrument(skip(self))]
    async fn list_clients(&self, page: u32, per_page: u32) -> Result<ClientPage> {
        let path = format!("/client?per_page={}&page={}", per_page, page);
        let result: ClientPage = self.send(self.request(HttpMethod::Get, &path)).await?;

        debug!(
            total_result = result.total_result,
            returned = result.data.len(),
            "Client page received"
        );
        Ok(result)
    }

    #[instrument(skip(self, value))]
    async fn patch_options(&self, app_id: &str, key: &str, value: Value) -> Result<()> {
        let mut body = Map::new();
        body.insert(format!("options_formData.{}", key), value);

        let path = format!("/integration-app/{}", app_id);
        let request = self.json_request(HttpMethod::Put, &path, &body)?;
        let _: Value = self.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_command_log(&self, sync_id: &str) -> Result<Option<CommandLogRecord>> {
        let path = format!("/integration-command-log/{}", sync_id);
        let response = self
            .http_client
            .execute(self.request(HttpMethod::Get, &path))
            .await?;

        if response.status == 404 {
            debug!("No command log stored for this sync id");
            return Ok(None);
        }

        let response = Self::check_status(response)?;
        Self::decode(&response).map(Some)
    }

    async fn store_command_log(&self, record: &CommandLogRecord) -> Result<CommandLogRecord> {
        let request = match &record.id {
            Some(id) => self.json_request(
                HttpMethod::Put,
                &format!("/integration-command-log/{}", id),
                record,
            )?,
            None => self.json_request(HttpMethod::Post, "/integration-command-log", record)?,
        };
        self.send(request).await
    }
}

#[async_trait]
impl ClientService for RepzoClient {
    async fn find_page(&self, page: u32, per_page: u32) -> BridgeResult<ClientPage> {
        Ok(self.list_clients(page, per_page).await?)
    }

    async fn create(&self, body: &ClientBody) -> BridgeResult<ClientLink> {
        let request = self.json_request(HttpMethod::Post, "/client", body)?;
        Ok(self.send(request).await?)
    }

    async fn update(&self, id: &str, body: &ClientBody) -> BridgeResult<ClientLink> {
        let request = self.json_request(HttpMethod::Put, &format!("/client/{}", id), body)?;
        Ok(self.send(request).await?)
    }
}

#[async_trait]
impl IntegrationConfigStore for RepzoClient {
    async fn update_option(&self, app_id: &str, key: &str, value: Value) -> BridgeResult<()> {
        Ok(self.patch_options(app_id, key, value).await?)
    }
}

#[async_trait]
impl CommandLogStore for RepzoClient {
    async fn load(&self, sync_id: &str) -> BridgeResult<Option<CommandLogRecord>> {
        Ok(self.find_command_log(sync_id).await?)
    }

    async fn save(&self, record: &CommandLogRecord) -> BridgeResult<CommandLogRecord> {
        Ok(self.store_command_log(record).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::crm::IntegrationMeta;
    use bridge_traits::error::BridgeError;
    use bytes::Bytes;
    use mockall::mock;
    use serde_json::json;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    fn response(status: u16, body: Value) -> BridgeResult<HttpResponse> {
        Ok(HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        })
    }

    fn body_json(request: &HttpRequest) -> Value {
        serde_json::from_slice(request.body.as_deref().unwrap_or_default()).unwrap_or(Value::Null)
    }

    fn client(mock_http: MockHttpClient) -> RepzoClient {
        RepzoClient::new(Arc::new(mock_http), "rk".to_string(), Environment::Staging)
    }

    #[test]
    fn test_base_urls() {
        assert_eq!(base_url(Environment::Production), "https://sv.api.repzo.me");
        assert_eq!(
            base_url(Environment::Staging),
            "https://staging.sv.api.repzo.me"
        );
        assert_eq!(base_url(Environment::Local), "http://localhost:3030");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let repzo = client(MockHttpClient::new());
        assert!(!format!("{:?}", repzo).contains("\"rk\""));
    }

    #[tokio::test]
    async fn test_find_page() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .withf(|request| {
                request.method == HttpMethod::Get
                    && request.url == "https://staging.sv.api.repzo.me/client?per_page=300&page=2"
                    && request.headers.get("api-key").map(String::as_str) == Some("rk")
            })
            .returning(|_| {
                response(
                    200,
                    json!({
                        "total_result": 301,
                        "data": [{ "_id": "c1", "integration_meta": { "id": "acme_1" } }]
                    }),
                )
            });

        let page = client(mock_http).find_page(2, 300).await.unwrap();
        assert_eq!(page.total_result, 301);
        assert_eq!(page.data[0].id, "c1");
    }

    #[tokio::test]
    async fn test_create_posts_body() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .withf(|request| {
                request.method == HttpMethod::Post
                    && request.url == "https://staging.sv.api.repzo.me/client"
                    && body_json(request)
                        == json!({
                            "name": "Acme",
                            "client_code": "1-CUST-1",
                            "integration_meta": { "id": "acme_1", "netsuite_id": "1" }
                        })
            })
            .returning(|_| response(200, json!({ "_id": "new-1", "name": "Acme" })));

        let body = ClientBody {
            name: Some("Acme".to_string()),
            client_code: Some("1-CUST-1".to_string()),
            integration_meta: Some(IntegrationMeta {
                composite_id: Some("acme_1".to_string()),
                netsuite_id: Some("1".to_string()),
                netsuite_last_sync: None,
            }),
            ..Default::default()
        };

        let created = client(mock_http).create(&body).await.unwrap();
        assert_eq!(created.id, "new-1");
    }

    #[tokio::test]
    async fn test_update_uses_put_on_client_id() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .withf(|request| {
                request.method == HttpMethod::Put
                    && request.url == "https://staging.sv.api.repzo.me/client/c1"
            })
            .returning(|_| response(200, json!({ "_id": "c1" })));

        let updated = client(mock_http)
            .update("c1", &ClientBody::default())
            .await
            .unwrap();
        assert_eq!(updated.id, "c1");
    }

    #[tokio::test]
    async fn test_api_error_keeps_status_and_body() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| response(422, json!({ "message": "client_code must be unique" })));

        let err = client(mock_http)
            .create(&ClientBody::default())
            .await
            .unwrap_err();

        match err {
            BridgeError::Remote { status, message } => {
                assert_eq!(status, 422);
                assert!(message.contains("client_code must be unique"));
            }
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_option_uses_dotted_path() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .withf(|request| {
                request.method == HttpMethod::Put
                    && request.url == "https://staging.sv.api.repzo.me/integration-app/app-1"
                    && body_json(request)
                        == json!({ "options_formData.bench_time_client": "2025-05-10T05:20:40.000Z" })
            })
            .returning(|_| response(200, json!({ "_id": "app-1" })));

        client(mock_http)
            .update_option(
                "app-1",
                "bench_time_client",
                json!("2025-05-10T05:20:40.000Z"),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_load_missing_command_log() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .withf(|request| {
                request.url == "https://staging.sv.api.repzo.me/integration-command-log/sync-1"
            })
            .returning(|_| response(404, json!({ "message": "not found" })));

        let loaded = client(mock_http).load("sync-1").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_save_creates_then_updates() {
        let mut mock_http = MockHttpClient::new();
        let mut seq = mockall::Sequence::new();

        mock_http
            .expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|request| {
                request.method == HttpMethod::Post
                    && request.url == "https://staging.sv.api.repzo.me/integration-command-log"
            })
            .returning(|_| {
                response(
                    200,
                    json!({ "_id": "log-1", "app_id": "app-1", "command": "add_client", "status": "received" }),
                )
            });
        mock_http
            .expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|request| {
                request.method == HttpMethod::Put
                    && request.url
                        == "https://staging.sv.api.repzo.me/integration-command-log/log-1"
            })
            .returning(|_| {
                response(
                    200,
                    json!({ "_id": "log-1", "app_id": "app-1", "command": "add_client", "status": "processing" }),
                )
            });

        let repzo = client(mock_http);
        let record = CommandLogRecord {
            app_id: "app-1".to_string(),
            command: "add_client".to_string(),
            status: "received".to_string(),
            ..Default::default()
        };

        let mut stored = repzo.save(&record).await.unwrap();
        assert_eq!(stored.id.as_deref(), Some("log-1"));

        stored.status = "processing".to_string();
        let stored = repzo.save(&stored).await.unwrap();
        assert_eq!(stored.status, "processing");
    }
}
