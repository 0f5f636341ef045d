// Common Crate - messages.rs
// common/src/messages.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::certificate::CertificateRecord;

/// Credentials posted to the signup and login endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Plain status reply used by the auth and unpin endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Successful login reply carrying the session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

/// One entry of a wallet's certificate list as returned to the browser
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateView {
    pub content_id: String,
    pub issued_at: String,
    pub issued_at_utc: Option<DateTime<Utc>>,
    /// Gateway URL where the certificate content can be fetched
    pub url: String,
}

impl CertificateView {
    pub fn from_record(record: &CertificateRecord, gateway_url: &str) -> Self {
        Self {
            content_id: record.content_id.clone(),
            issued_at: record.issued_at.clone(),
            issued_at_utc: record.issued_at_utc(),
            url: gateway_content_url(gateway_url, &record.content_id),
        }
    }
}

/// `https://<gateway>/ipfs/<contentId>`
pub fn gateway_content_url(gateway_url: &str, content_id: &str) -> String {
    format!("{}/ipfs/{}", gateway_url.trim_end_matches('/'), content_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_uses_gateway_url() {
        let record = CertificateRecord::new("QmHash", "60");
        let view = CertificateView::from_record(&record, "https://ipfs.io/");

        assert_eq!(view.url, "https://ipfs.io/ipfs/QmHash");
        assert_eq!(view.issued_at_utc.map(|t| t.timestamp()), Some(60));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["contentId"], "QmHash");
        assert_eq!(json["issuedAt"], "60");
    }
}
