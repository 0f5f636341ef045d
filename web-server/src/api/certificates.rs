// web-server/src/api/certificates.rs
use actix_web::{delete, get, web, HttpResponse, Responder};
use common::{CertificateView, Config, MessageResponse};
use reconciler::{PinningService, ReconcileError, Reconciler};

use crate::middleware::Authenticated;

fn load_error_response(err: &ReconcileError) -> HttpResponse {
    match err {
        ReconcileError::InvalidAccount(_) => {
            HttpResponse::BadRequest().json(MessageResponse::new("Invalid account address"))
        },
        ReconcileError::SessionExpired => {
            HttpResponse::Unauthorized().json(MessageResponse::new("Session expired"))
        },
        ReconcileError::LedgerUnavailable(_) | ReconcileError::MalformedLedgerResponse(_) => {
            HttpResponse::BadGateway().json(MessageResponse::new("Could not read certificates from the ledger"))
        },
        ReconcileError::Cancelled => {
            HttpResponse::ServiceUnavailable().json(MessageResponse::new("Certificate load cancelled"))
        },
        ReconcileError::Configuration(_) => {
            HttpResponse::InternalServerError().json(MessageResponse::new("Server error"))
        }
    }
}

// List a wallet's live certificates, oldest first
#[get("/certificates/{account}")]
pub async fn list_certificates(
    path: web::Path<String>,
    user: Authenticated,
    reconciler: web::Data<Reconciler>,
    config: web::Data<Config>,
) -> impl Responder {
    let account = path.into_inner();

    match reconciler.load(&user.0, &account).await {
        Ok(list) => {
            let views: Vec<CertificateView> = list
                .iter()
                .map(|record| CertificateView::from_record(record, &config.pinning.gateway_url))
                .collect();
            HttpResponse::Ok().json(views)
        },
        Err(e) => {
            tracing::warn!("Certificate load for {} failed: {}", account, e);
            load_error_response(&e)
        }
    }
}

// Unpin a certificate's content so it drops out of future listings
#[delete("/certificates/{content_id}")]
pub async fn delete_certificate(
    path: web::Path<String>,
    user: Authenticated,
    pinning: web::Data<dyn PinningService>,
) -> impl Responder {
    let content_id = path.into_inner();
    if content_id.trim().is_empty() {
        return HttpResponse::BadRequest().json(MessageResponse::new("Content id is required"));
    }

    match pinning.unpin(&content_id).await {
        Ok(true) => {
            tracing::info!("User {} unpinned {}", user.0.user_id(), content_id);
            HttpResponse::Ok().json(MessageResponse::new("Certificate deleted successfully"))
        },
        Ok(false) => HttpResponse::BadGateway().json(MessageResponse::new(
            "Failed to delete from pinning service. Ensure it's pinned by your account.",
        )),
        Err(e) => {
            tracing::error!("Unpin of {} failed: {}", content_id, e);
            HttpResponse::BadGateway().json(MessageResponse::new(
                "Failed to delete from pinning service. Ensure it's pinned by your account.",
            ))
        }
    }
}
