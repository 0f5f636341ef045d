//! Certificate reconciliation pipeline.
//!
//! A wallet load reads the account's certificate records from the ledger,
//! probes the pinning service for each record's content, then assembles the
//! live records into a display list ordered by issuance time.

pub mod abi;
pub mod account;
pub mod assembler;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod pinning;
pub mod pipeline;
pub mod prober;

pub use account::AccountId;
pub use assembler::{assemble, ExclusionPolicy};
pub use error::ReconcileError;
pub use gateway::{ContentGateway, ContentInfo, GatewayError, PreviewKind};
pub use ledger::{CertificateLedger, JsonRpcLedger};
pub use pinning::{PinataClient, PinningError, PinningService};
pub use pipeline::Reconciler;
pub use prober::probe_all;
