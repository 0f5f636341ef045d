// reconciler/src/pinning.rs
use std::time::Duration;

use async_trait::async_trait;
use common::PinningConfig;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::error::ReconcileError;

#[derive(Debug, Error)]
pub enum PinningError {
    #[error("no pinning service credential configured")]
    MissingCredential,
    #[error("pinning service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("pinning service answered HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid pinning service URL: {0}")]
    Url(#[from] url::ParseError),
}

/// The content-pinning collaborator
#[async_trait]
pub trait PinningService: Send + Sync {
    /// Whether `content_id` is currently pinned
    async fn is_pinned(&self, content_id: &str) -> Result<bool, PinningError>;

    /// Remove the pin for `content_id`. `Ok(false)` means the service refused.
    async fn unpin(&self, content_id: &str) -> Result<bool, PinningError>;
}

/// Pinata HTTP API client, authenticated with a bearer JWT
pub struct PinataClient {
    api_url: String,
    jwt: Option<String>,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct PinList {
    count: u64,
}

impl PinataClient {
    pub fn new(config: &PinningConfig) -> Result<Self, ReconcileError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ReconcileError::Configuration(format!("pinning HTTP client: {}", e)))?;

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            jwt: config.jwt.clone().filter(|t| !t.is_empty()),
            http,
        })
    }

    fn token(&self) -> Option<&str> {
        self.jwt.as_deref()
    }
}

#[async_trait]
impl PinningService for PinataClient {
    async fn is_pinned(&self, content_id: &str) -> Result<bool, PinningError> {
        // Advisory check: without a credential nothing counts as live
        let Some(token) = self.token() else {
            tracing::warn!("Missing pinning service credential, treating {} as not pinned", content_id);
            return Ok(false);
        };

        let url = Url::parse_with_params(
            &format!("{}/data/pinList", self.api_url),
            &[("hashContains", content_id)],
        )?;

        let response = self.http.get(url).bearer_auth(token).send().await?;

        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(PinningError::Status { status, body });
        }

        let list: PinList = response.json().await?;
        Ok(list.count > 0)
    }

    async fn unpin(&self, content_id: &str) -> Result<bool, PinningError> {
        let token = self.token().ok_or(PinningError::MissingCredential)?;

        let mut url = Url::parse(&self.api_url)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(["pinning", "unpin", content_id]);

        let response = self.http.delete(url).bearer_auth(token).send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Unpin of {} failed with HTTP {}: {}", content_id, status, body);
            return Ok(false);
        }

        tracing::info!("Unpinned {}", content_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, jwt: Option<&str>) -> PinataClient {
        PinataClient::new(&PinningConfig {
            api_url: server.uri(),
            gateway_url: "https://ipfs.io".to_string(),
            jwt: jwt.map(str::to_string),
            timeout_secs: 2,
            max_concurrent_probes: 4,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_pinned_when_count_positive() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/pinList"))
            .and(query_param("hashContains", "QmLive"))
            .and(header("authorization", "Bearer secret-jwt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 1, "rows": [] })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret-jwt"));
        assert!(client.is_pinned("QmLive").await.unwrap());
    }

    #[tokio::test]
    async fn test_not_pinned_when_count_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/pinList"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 0, "rows": [] })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret-jwt"));
        assert!(!client.is_pinned("QmGone").await.unwrap());
    }

    #[tokio::test]
    async fn test_non_200_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/pinList"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "bad token" })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("stale-jwt"));
        let err = client.is_pinned("QmX").await.unwrap_err();
        assert!(matches!(err, PinningError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_missing_credential_fails_closed_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 1 })))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        assert!(!client.is_pinned("QmX").await.unwrap());
        assert!(matches!(client.unpin("QmX").await, Err(PinningError::MissingCredential)));
    }

    #[tokio::test]
    async fn test_unpin() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/pinning/unpin/QmOk"))
            .and(header("authorization", "Bearer secret-jwt"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/pinning/unpin/QmForeign"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret-jwt"));
        assert!(client.unpin("QmOk").await.unwrap());
        assert!(!client.unpin("QmForeign").await.unwrap());
    }
}
