// web-server/src/middleware/mod.rs
pub mod auth;
pub mod rate_limiter;

pub use auth::Authenticated;
pub use rate_limiter::RateLimiter;
