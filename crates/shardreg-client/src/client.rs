//! Control-plane API client implementation.

use crate::api::RecordSetsApi;
use crate::config::RateLimitConfig;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::header::RETRY_AFTER;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use shardreg_core::{
    ChangeAction, ChangeBatch, RecordSetDescriptor, RecordStore, RegistryError, Result,
};
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for a hosted DNS control-plane API
#[derive(Clone)]
pub struct ControlPlaneClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    base_url: Url,
    token: Option<String>,
    rate_limiter: DefaultDirectRateLimiter,
}

impl fmt::Debug for ControlPlaneClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlPlaneClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &self.inner.token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl ControlPlaneClient {
    /// Create a client for the API at `base_url` using default settings
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        ControlPlaneClientBuilder::new(base_url).build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> ControlPlaneClientBuilder {
        ControlPlaneClientBuilder::new(base_url)
    }

    /// Access record set endpoints
    #[must_use]
    pub const fn record_sets(&self) -> RecordSetsApi<'_> {
        RecordSetsApi::new(self)
    }

    /// Perform a GET request with query parameters
    pub(crate) async fn get_with_query<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.endpoint(segments, params)?;
        debug!(url = %url, "GET request");

        self.inner.rate_limiter.until_ready().await;
        let response = self
            .authorize(self.inner.http.get(url))
            .send()
            .await
            .map_err(map_transport_error)?;

        self.handle_response(response).await
    }

    /// Perform a POST request with JSON body
    pub(crate) async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        let url = self.endpoint(segments, &[])?;
        debug!(url = %url, "POST request");

        self.inner.rate_limiter.until_ready().await;
        let response = self
            .authorize(self.inner.http.post(url).json(body))
            .send()
            .await
            .map_err(map_transport_error)?;

        self.handle_response(response).await
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.inner.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Build an endpoint URL from path segments and query parameters
    fn endpoint(&self, segments: &[&str], params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.inner.base_url.clone();

        url.path_segments_mut()
            .map_err(|()| {
                RegistryError::Config(format!("invalid base URL: {}", self.inner.base_url))
            })?
            .pop_if_empty()
            .extend(segments);

        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        Ok(url)
    }

    /// Handle an API response that returns JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await.map_err(map_transport_error)?;
            serde_json::from_str(&body).map_err(RegistryError::Json)
        } else {
            Err(Self::handle_error(status.as_u16(), response).await)
        }
    }

    /// Convert an error response to a `RegistryError`
    async fn handle_error(status: u16, response: reqwest::Response) -> RegistryError {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let body = response.text().await.unwrap_or_default();

        // Try to parse error message from JSON
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or(body);

        match status {
            400 => RegistryError::InvalidChangeBatch(message),
            401 | 403 => RegistryError::Unauthorized,
            404 => RegistryError::NotFound { resource: message },
            409 => RegistryError::Conflict(message),
            429 => {
                warn!("Rate limited by control plane");
                RegistryError::RateLimited { retry_after }
            }
            _ => RegistryError::Api {
                code: status,
                message,
            },
        }
    }

    async fn change(
        &self,
        zone_id: &str,
        action: ChangeAction,
        record_set: &RecordSetDescriptor,
    ) -> Result<()> {
        let comment = format!(
            "shardreg {action} {}",
            record_set.set_identifier.as_deref().unwrap_or(&record_set.name)
        );
        let batch = ChangeBatch::single(action, record_set.clone()).with_comment(comment);
        let info = self.record_sets().submit(zone_id, &batch).await?;

        debug!(change = %info.id, status = ?info.status, %action, "change accepted");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for ControlPlaneClient {
    async fn list(&self, zone_id: &str) -> Result<Vec<RecordSetDescriptor>> {
        self.record_sets().list(zone_id).await
    }

    async fn upsert(&self, zone_id: &str, record_set: &RecordSetDescriptor) -> Result<()> {
        self.change(zone_id, ChangeAction::Upsert, record_set).await
    }

    async fn delete(&self, zone_id: &str, record_set: &RecordSetDescriptor) -> Result<()> {
        self.change(zone_id, ChangeAction::Delete, record_set).await
    }
}

/// Classify a transport-level reqwest failure
pub(crate) fn map_transport_error(err: reqwest::Error) -> RegistryError {
    if err.is_timeout() {
        RegistryError::Timeout(err.to_string())
    } else if err.is_connect() {
        RegistryError::Connection(err.to_string())
    } else {
        RegistryError::Http(err.to_string())
    }
}

/// Builder for configuring a [`ControlPlaneClient`]
pub struct ControlPlaneClientBuilder {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
    user_agent: String,
    rate_limit: RateLimitConfig,
}

impl ControlPlaneClientBuilder {
    /// Create a new builder for the API at `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("shardreg/{}", env!("CARGO_PKG_VERSION")),
            rate_limit: RateLimitConfig::default(),
        }
    }

    /// Set the bearer token sent with every request
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set the client-side rate limit
    #[must_use]
    pub const fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ControlPlaneClient> {
        let base_url = Url::parse(&self.base_url)
            .map_err(|e| RegistryError::Config(format!("invalid endpoint {}: {e}", self.base_url)))?;

        if base_url.cannot_be_a_base() {
            return Err(RegistryError::Config(format!(
                "invalid endpoint {}: not a base URL",
                self.base_url
            )));
        }

        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| RegistryError::Config(format!("failed to build HTTP client: {e}")))?;

        let quota = Quota::per_second(
            NonZeroU32::new(self.rate_limit.requests_per_second).unwrap_or(NonZeroU32::MIN),
        )
        .allow_burst(NonZeroU32::new(self.rate_limit.burst_size).unwrap_or(NonZeroU32::MIN));

        Ok(ControlPlaneClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                token: self.token,
                rate_limiter: RateLimiter::direct(quota),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record_set() -> RecordSetDescriptor {
        RecordSetDescriptor {
            name: "svc.example.".into(),
            record_type: "A".into(),
            ttl: 60,
            set_identifier: Some("svc.example._65".into()),
            weight: Some(1),
            values: vec!["10.0.0.5".into()],
        }
    }

    fn accepted() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "C1",
            "status": "PENDING"
        }))
    }

    async fn client(server: &MockServer) -> ControlPlaneClient {
        ControlPlaneClient::builder(format!("{}/v1", server.uri()))
            .token("secret")
            .rate_limit(RateLimitConfig::new(1000, 1000))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_rejects_bad_endpoint() {
        assert!(matches!(
            ControlPlaneClient::new("not a url"),
            Err(RegistryError::Config(_))
        ));
        assert!(matches!(
            ControlPlaneClient::new("mailto:ops@example.com"),
            Err(RegistryError::Config(_))
        ));
    }

    #[test]
    fn test_debug_hides_token() {
        let client = ControlPlaneClient::builder("https://dns.example.net/v1")
            .token("s3cr3t-token")
            .build()
            .unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("https://dns.example.net/v1"), "{debug}");
        assert!(debug.contains("<redacted>"), "{debug}");
        assert!(!debug.contains("s3cr3t-token"), "{debug}");
    }

    #[test]
    fn test_endpoint_building() {
        let client = ControlPlaneClient::new("https://dns.example.com/v1/").unwrap();
        let url = client
            .endpoint(&["zones", "Z1", "rrsets"], &[("page_token", "a b")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://dns.example.com/v1/zones/Z1/rrsets?page_token=a+b"
        );
    }

    #[tokio::test]
    async fn test_upsert_sends_change_batch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/zones/Z1/changes"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(serde_json::json!({
                "comment": "shardreg UPSERT svc.example._65",
                "changes": [{
                    "action": "UPSERT",
                    "record_set": {
                        "name": "svc.example.",
                        "type": "A",
                        "set_identifier": "svc.example._65",
                        "weight": 1,
                        "values": ["10.0.0.5"]
                    }
                }]
            })))
            .respond_with(accepted())
            .expect(1)
            .mount(&server)
            .await;

        client(&server).await.upsert("Z1", &record_set()).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_sends_delete_action() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/zones/Z1/changes"))
            .and(body_partial_json(serde_json::json!({
                "changes": [{ "action": "DELETE" }]
            })))
            .respond_with(accepted())
            .expect(1)
            .mount(&server)
            .await;

        client(&server).await.delete("Z1", &record_set()).await.unwrap();
    }

    #[tokio::test]
    async fn test_error_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/zones/Z409/changes"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(serde_json::json!({ "error": "PriorRequestNotComplete" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/zones/Z429/changes"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/zones/Z401/changes"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/zones/Z400/changes"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({ "error": "values do not match" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/zones/Z503/changes"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let rs = record_set();

        match client.upsert("Z409", &rs).await.unwrap_err() {
            RegistryError::Conflict(msg) => assert_eq!(msg, "PriorRequestNotComplete"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            client.upsert("Z429", &rs).await.unwrap_err(),
            RegistryError::RateLimited { retry_after: Some(3) }
        ));
        assert!(matches!(
            client.upsert("Z401", &rs).await.unwrap_err(),
            RegistryError::Unauthorized
        ));
        match client.delete("Z400", &rs).await.unwrap_err() {
            RegistryError::InvalidChangeBatch(msg) => assert_eq!(msg, "values do not match"),
            other => panic!("unexpected error: {other}"),
        }
        let err = client.upsert("Z503", &rs).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err.status_code(), Some(503));
    }

    #[tokio::test]
    async fn test_connection_refused_is_retryable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ControlPlaneClient::builder(format!("http://{addr}"))
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let err = client.list("Z1").await.unwrap_err();
        assert!(err.is_retryable(), "{err}");
    }
}
