// web-server/src/api/mod.rs
pub mod auth;
pub mod certificates;
pub mod content;

use actix_web::{get, HttpResponse, Responder};
use serde_json::json;

#[get("/")]
pub async fn api_index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "name": "Certificate Verifier API",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(
        actix_web::web::scope("/api")
            .service(api_index)
            .service(
                actix_web::web::scope("/auth")
                    .service(auth::signup)
                    .service(auth::login)
            )
            .service(certificates::list_certificates)
            .service(certificates::delete_certificate)
            .service(content::inspect_content)
    );
}
