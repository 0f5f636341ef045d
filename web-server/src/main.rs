// Web Server - main.rs
// web-server/src/main.rs
mod api;
mod middleware;
mod user_store;
mod utils;

use actix_web::{web, App, HttpServer, Responder, HttpResponse, get};
use common::{setup_tracing, Config};
use middleware::RateLimiter;
use reconciler::{ContentGateway, Reconciler};
use std::io;
use user_store::UserStore;

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().body("Certificate Verifier Web Server")
}

fn startup_error(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Setup tracing
    setup_tracing();

    // Load configuration
    let config = Config::from_env();

    // Save address before moving config into web::Data
    let server_addr = config.web_server_addr.clone();

    let store = UserStore::start(&config.database.path, config.database.workers)
        .map_err(startup_error)?;
    let reconciler = Reconciler::from_config(&config).map_err(startup_error)?;
    let gateway = ContentGateway::new(&config.pinning).map_err(startup_error)?;
    let rate_limiter = RateLimiter::from_config(&config.rate_limit);

    if config.pinning.jwt.is_none() {
        tracing::warn!("No pinning service credential configured, every certificate will be hidden");
    }

    tracing::info!("Starting Web Server on {}", server_addr);

    // Create data references
    let pinning_data = web::Data::from(reconciler.pinning().clone());
    let config_data = web::Data::new(config);
    let store_data = web::Data::new(store);
    let reconciler_data = web::Data::new(reconciler);
    let gateway_data = web::Data::new(gateway);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .wrap(rate_limiter.clone())
            .app_data(config_data.clone())
            .app_data(store_data.clone())
            .app_data(reconciler_data.clone())
            .app_data(pinning_data.clone())
            .app_data(gateway_data.clone())
            .service(index)
            .configure(api::configure)
    })
    .bind(&server_addr)?
    .run()
    .await
}
