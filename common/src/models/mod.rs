// common/src/models/mod.rs
pub mod certificate;
pub mod session;

pub use certificate::{CertificateRecord, DisplayList};
pub use session::AuthenticatedSession;
