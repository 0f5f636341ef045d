// reconciler/src/error.rs
use thiserror::Error;

/// Failures that abort a whole load event. Per-record probe failures never
/// show up here; they are absorbed by the prober.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("invalid account identifier: {0}")]
    InvalidAccount(String),

    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),

    #[error("malformed ledger response: {0}")]
    MalformedLedgerResponse(String),

    #[error("session expired")]
    SessionExpired,

    #[error("load cancelled before completion")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    Configuration(String),
}
