// common/src/models/certificate.rs
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A certificate as recorded on the ledger: a content identifier plus the
/// timestamp of the issuing transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    pub content_id: String,
    /// Raw timestamp text as reported by the ledger
    pub issued_at: String,
}

impl CertificateRecord {
    pub fn new(content_id: impl Into<String>, issued_at: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            issued_at: issued_at.into(),
        }
    }

    /// Issuance time in seconds since the epoch.
    ///
    /// Anything that is not a non-negative decimal integer counts as `0`, so
    /// malformed records sort first instead of being dropped.
    pub fn issued_at_secs(&self) -> u64 {
        self.issued_at.trim().parse().unwrap_or(0)
    }

    /// Issuance time as a UTC instant, if it fits chrono's range
    pub fn issued_at_utc(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.issued_at_secs()).ok()?;
        Utc.timestamp_opt(secs, 0).single()
    }
}

/// Ordered, read-only list of certificates ready for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DisplayList(Vec<CertificateRecord>);

impl DisplayList {
    pub fn records(&self) -> &[CertificateRecord] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CertificateRecord> {
        self.0.iter()
    }

    pub fn into_records(self) -> Vec<CertificateRecord> {
        self.0
    }
}

impl From<Vec<CertificateRecord>> for DisplayList {
    fn from(records: Vec<CertificateRecord>) -> Self {
        Self(records)
    }
}

impl<'a> IntoIterator for &'a DisplayList {
    type Item = &'a CertificateRecord;
    type IntoIter = std::slice::Iter<'a, CertificateRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
