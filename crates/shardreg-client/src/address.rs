//! Public address discovery.

use reqwest::Client as HttpClient;
use shardreg_core::{RegistryError, Result};
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::debug;

use crate::client::map_transport_error;

/// Service answering with the caller's public IPv4 address as plain text
pub const DEFAULT_ADDRESS_URL: &str = "http://www.wgetip.com";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Looks up the address this node is seen from on the public internet
#[derive(Debug, Clone)]
pub struct AddressResolver {
    http: HttpClient,
    url: String,
}

impl AddressResolver {
    /// Create a resolver using [`DEFAULT_ADDRESS_URL`]
    pub fn new() -> Result<Self> {
        Self::with_url(DEFAULT_ADDRESS_URL)
    }

    /// Create a resolver querying a custom URL
    pub fn with_url(url: impl Into<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| RegistryError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }

    /// Fetch and parse this node's public address
    pub async fn resolve(&self) -> Result<Ipv4Addr> {
        debug!(url = %self.url, "resolving public address");

        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            return Err(RegistryError::Api {
                code: status.as_u16(),
                message: body,
            });
        }

        let text = body.trim();
        text.parse()
            .map_err(|_| RegistryError::InvalidAddress(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_resolve_trims_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.7\n"))
            .mount(&server)
            .await;

        let resolver = AddressResolver::with_url(server.uri()).unwrap();
        assert_eq!(resolver.resolve().await.unwrap(), Ipv4Addr::new(203, 0, 113, 7));
    }

    #[tokio::test]
    async fn test_resolve_rejects_non_ipv4() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("2001:db8::1"))
            .mount(&server)
            .await;

        let resolver = AddressResolver::with_url(server.uri()).unwrap();
        match resolver.resolve().await.unwrap_err() {
            RegistryError::InvalidAddress(value) => assert_eq!(value, "2001:db8::1"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let resolver = AddressResolver::with_url(server.uri()).unwrap();
        let err = resolver.resolve().await.unwrap_err();
        assert_eq!(err.status_code(), Some(502));
    }
}
