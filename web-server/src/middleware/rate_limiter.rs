// web-server/src/middleware/rate_limiter.rs
use std::sync::Arc;
use std::time::{Instant, Duration};
use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::{header, StatusCode},
    Error, ResponseError,
    HttpResponse
};
use common::{MessageResponse, RateLimitConfig};
use dashmap::DashMap;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::fmt;

// Custom error for rate limiting
#[derive(Debug)]
struct RateLimitExceeded {
    retry_after: u64,
}

impl fmt::Display for RateLimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rate limit exceeded")
    }
}

impl ResponseError for RateLimitExceeded {
    fn status_code(&self) -> StatusCode {
        StatusCode::TOO_MANY_REQUESTS
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::TooManyRequests()
            .append_header((header::RETRY_AFTER, self.retry_after.to_string()))
            .json(MessageResponse::new("Rate limit exceeded. Please try again later."))
    }
}

/// Sliding-window request limiter keyed by client IP, applied to path prefixes
#[derive(Debug, Clone)]
pub struct RateLimiter {
    paths: Vec<String>,
    max_requests: usize,
    window: Duration,
    store: Arc<DashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(paths: Vec<String>, max_requests: usize, window: Duration) -> Self {
        Self {
            paths,
            max_requests,
            window,
            store: Arc::new(DashMap::new()),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            config.paths.clone(),
            config.max_requests,
            Duration::from_secs(config.window_secs),
        )
    }

    fn applies_to(&self, path: &str) -> bool {
        self.paths.iter().any(|p| path.starts_with(p.as_str()))
    }

    fn is_rate_limited(&self, ip: &str) -> bool {
        let now = Instant::now();
        let mut hits = self.store.entry(ip.to_string()).or_default();

        hits.retain(|time| now.duration_since(*time) < self.window);

        if hits.len() >= self.max_requests {
            true
        } else {
            hits.push(now);
            false
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RateLimiterMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimiterMiddleware {
            service,
            limiter: self.clone(),
        }))
    }
}

pub struct RateLimiterMiddleware<S> {
    service: S,
    limiter: RateLimiter,
}

impl<S, B> Service<ServiceRequest> for RateLimiterMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if self.limiter.applies_to(req.path()) {
            let ip = req.connection_info().realip_remote_addr()
                .unwrap_or("unknown")
                .to_string();

            if self.limiter.is_rate_limited(&ip) {
                tracing::warn!("Rate limit exceeded for IP: {}", ip);

                let retry_after = self.limiter.window.as_secs().max(1);
                return Box::pin(async move {
                    Err(RateLimitExceeded { retry_after }.into())
                });
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            fut.await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App};

    #[actix_web::test]
    async fn test_window_allows_up_to_limit() {
        let limiter = RateLimiter::new(vec!["/api/auth".into()], 2, Duration::from_secs(60));
        assert!(!limiter.is_rate_limited("1.2.3.4"));
        assert!(!limiter.is_rate_limited("1.2.3.4"));
        assert!(limiter.is_rate_limited("1.2.3.4"));
        // Separate budget per client
        assert!(!limiter.is_rate_limited("5.6.7.8"));
    }

    #[actix_web::test]
    async fn test_expired_hits_are_forgotten() {
        let limiter = RateLimiter::new(vec![], 1, Duration::from_millis(20));
        assert!(!limiter.is_rate_limited("ip"));
        assert!(limiter.is_rate_limited("ip"));
        actix_web::rt::time::sleep(Duration::from_millis(30)).await;
        assert!(!limiter.is_rate_limited("ip"));
    }

    #[actix_web::test]
    async fn test_only_listed_paths_are_limited() {
        let limiter = RateLimiter::new(vec!["/api/auth".into()], 1, Duration::from_secs(60));
        let app = test::init_service(
            App::new()
                .wrap(limiter)
                .route("/api/auth/login", web::post().to(|| async { "ok" }))
                .route("/api/other", web::get().to(|| async { "ok" })),
        )
        .await;

        let first = test::call_service(&app, test::TestRequest::post().uri("/api/auth/login").to_request()).await;
        assert_eq!(first.status(), 200);

        let second = app.call(test::TestRequest::post().uri("/api/auth/login").to_request()).await;
        let err = second.err().expect("second login should be limited");
        assert_eq!(err.as_response_error().status_code(), 429);

        for _ in 0..3 {
            let resp = test::call_service(&app, test::TestRequest::get().uri("/api/other").to_request()).await;
            assert_eq!(resp.status(), 200);
        }
    }
}
