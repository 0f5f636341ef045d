// web-server/src/middleware/auth.rs
use actix_web::{dev::Payload, http::{header, StatusCode}, web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use common::models::AuthenticatedSession;
use common::{validate_jwt_token, Config, MessageResponse};
use futures_util::future::{ready, Ready};
use std::fmt;

/// Extractor for routes that need a logged-in caller.
/// Reads `Authorization: Bearer <token>` and validates it against the JWT secret.
pub struct Authenticated(pub AuthenticatedSession);

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    Misconfigured,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Missing bearer token"),
            AuthError::InvalidToken => write!(f, "Invalid or expired token"),
            AuthError::Misconfigured => write!(f, "Internal server error"),
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Misconfigured => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(MessageResponse::new(self.to_string()))
    }
}

impl FromRequest for Authenticated {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(Authenticated))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedSession, AuthError> {
    let config = req.app_data::<web::Data<Config>>().ok_or_else(|| {
        tracing::error!("Config missing from app data, cannot validate tokens");
        AuthError::Misconfigured
    })?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    validate_jwt_token(token, config.jwt_secret.as_bytes()).map_err(|e| {
        tracing::warn!("Rejected bearer token: {}", e);
        AuthError::InvalidToken
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App, Responder, get};
    use common::generate_jwt_token;

    #[get("/whoami")]
    async fn whoami(user: Authenticated) -> impl Responder {
        HttpResponse::Ok().body(user.0.email().to_string())
    }

    fn config() -> Config {
        Config { jwt_secret: "auth-test".to_string(), ..Config::default() }
    }

    #[actix_web::test]
    async fn test_bearer_token_accepted() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(config())).service(whoami),
        )
        .await;
        let token = generate_jwt_token(3, "me@example.com", b"auth-test").unwrap();

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "me@example.com");
    }

    #[actix_web::test]
    async fn test_missing_or_forged_token_rejected() {
        let app = test::init_service(
            App::new().app_data(web::Data::new(config())).service(whoami),
        )
        .await;

        let req = test::TestRequest::get().uri("/whoami").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);

        let forged = generate_jwt_token(3, "me@example.com", b"other-secret").unwrap();
        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", forged)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }
}
