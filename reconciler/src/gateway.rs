// reconciler/src/gateway.rs
use std::time::Duration;

use common::{gateway_content_url, PinningConfig};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use serde::Serialize;
use thiserror::Error;

use crate::error::ReconcileError;

/// Bodies without a declared length are counted up to this many bytes
const DEFAULT_MAX_COUNTED_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("content id is empty")]
    EmptyContentId,
    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("gateway answered HTTP {0}")]
    Status(u16),
}

/// How a browser should preview the content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewKind {
    Image,
    Pdf,
    Other,
}

impl PreviewKind {
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type.map(|t| t.trim().to_ascii_lowercase()) {
            Some(t) if t.starts_with("image/") => Self::Image,
            Some(t) if t.starts_with("application/pdf") => Self::Pdf,
            _ => Self::Other,
        }
    }
}

/// What the gateway reports about a piece of content
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentInfo {
    pub content_id: String,
    pub url: String,
    pub content_type: Option<String>,
    pub size: Option<u64>,
    pub preview: PreviewKind,
}

/// Read-only client for the public content retrieval endpoint
pub struct ContentGateway {
    gateway_url: String,
    http: reqwest::Client,
    max_counted_bytes: u64,
}

impl ContentGateway {
    pub fn new(config: &PinningConfig) -> Result<Self, ReconcileError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ReconcileError::Configuration(format!("gateway HTTP client: {}", e)))?;

        Ok(Self {
            gateway_url: config.gateway_url.clone(),
            http,
            max_counted_bytes: DEFAULT_MAX_COUNTED_BYTES,
        })
    }

    pub fn with_max_counted_bytes(mut self, max: u64) -> Self {
        self.max_counted_bytes = max;
        self
    }

    pub fn content_url(&self, content_id: &str) -> String {
        gateway_content_url(&self.gateway_url, content_id)
    }

    /// Fetch the content and report its type and size
    pub async fn inspect(&self, content_id: &str) -> Result<ContentInfo, GatewayError> {
        let content_id = content_id.trim();
        if content_id.is_empty() {
            return Err(GatewayError::EmptyContentId);
        }

        let url = self.content_url(content_id);
        let mut response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let declared_size = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        // Chunked responses carry no length, count the body up to the cap
        let size = match declared_size {
            Some(size) => Some(size),
            None => {
                let mut counted = 0u64;
                let mut within_cap = true;
                while let Some(chunk) = response.chunk().await? {
                    counted += chunk.len() as u64;
                    if counted > self.max_counted_bytes {
                        within_cap = false;
                        break;
                    }
                }
                within_cap.then_some(counted)
            }
        };

        Ok(ContentInfo {
            content_id: content_id.to_string(),
            preview: PreviewKind::from_content_type(content_type.as_deref()),
            url,
            content_type,
            size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway_for(server: &MockServer) -> ContentGateway {
        gateway_at(server.uri())
    }

    #[tokio::test]
    async fn test_inspect_pdf() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ipfs/QmPdf"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(b"%PDF-1.7 fake".to_vec(), "application/pdf"),
            )
            .mount(&server)
            .await;

        let info = gateway_for(&server).inspect("QmPdf").await.unwrap();
        assert_eq!(info.preview, PreviewKind::Pdf);
        assert_eq!(info.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(info.size, Some(13));
        assert_eq!(info.url, format!("{}/ipfs/QmPdf", server.uri()));
    }

    #[tokio::test]
    async fn test_inspect_missing_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = gateway_for(&server).inspect("QmGone").await.unwrap_err();
        assert!(matches!(err, GatewayError::Status(404)));
    }

    /// One-shot HTTP server answering with a chunked body and no Content-Length
    async fn chunked_server(chunks: &'static [&'static str]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;

            let mut response = String::from(
                "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
            );
            for chunk in chunks {
                response.push_str(&format!("{:x}\r\n{}\r\n", chunk.len(), chunk));
            }
            response.push_str("0\r\n\r\n");
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        format!("http://{}", addr)
    }

    fn gateway_at(url: String) -> ContentGateway {
        ContentGateway::new(&PinningConfig {
            api_url: "https://api.pinata.cloud".to_string(),
            gateway_url: url,
            jwt: None,
            timeout_secs: 2,
            max_concurrent_probes: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_chunked_body_counted_within_cap() {
        let url = chunked_server(&["hello", "world"]).await;
        let info = gateway_at(url).inspect("QmChunked").await.unwrap();

        assert_eq!(info.size, Some(10));
        assert_eq!(info.preview, PreviewKind::Image);
    }

    #[tokio::test]
    async fn test_chunked_body_past_cap_has_no_size() {
        let url = chunked_server(&["hello", "world", "again"]).await;
        let info = gateway_at(url)
            .with_max_counted_bytes(8)
            .inspect("QmHuge")
            .await
            .unwrap();

        assert_eq!(info.size, None);
        assert_eq!(info.content_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_preview_kind() {
        assert_eq!(PreviewKind::from_content_type(Some("image/png")), PreviewKind::Image);
        assert_eq!(PreviewKind::from_content_type(Some("application/pdf; charset=binary")), PreviewKind::Pdf);
        assert_eq!(PreviewKind::from_content_type(Some("text/plain")), PreviewKind::Other);
        assert_eq!(PreviewKind::from_content_type(None), PreviewKind::Other);
    }
}
