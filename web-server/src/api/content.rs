// web-server/src/api/content.rs
use actix_web::{get, web, HttpResponse, Responder};
use common::MessageResponse;
use reconciler::{ContentGateway, GatewayError};

use crate::middleware::Authenticated;

// Type and size of a certificate's content, for the explore view
#[get("/content/{content_id}")]
pub async fn inspect_content(
    path: web::Path<String>,
    _user: Authenticated,
    gateway: web::Data<ContentGateway>,
) -> impl Responder {
    let content_id = path.into_inner();

    match gateway.inspect(&content_id).await {
        Ok(info) => HttpResponse::Ok().json(info),
        Err(GatewayError::EmptyContentId) => {
            HttpResponse::BadRequest().json(MessageResponse::new("Content id is required"))
        },
        Err(e) => {
            tracing::warn!("Gateway lookup for {} failed: {}", content_id, e);
            HttpResponse::BadGateway().json(MessageResponse::new(
                "Failed to load file from IPFS. It might have been unpinned or the CID is invalid.",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::header, test, App};
    use common::{generate_jwt_token, Config};

    const SECRET: &str = "content-test";

    macro_rules! content_app {
        () => {{
            let config = Config { jwt_secret: SECRET.to_string(), ..Config::default() };
            let gateway = ContentGateway::new(&config.pinning).unwrap();
            test::init_service(
                App::new()
                    .app_data(web::Data::new(config))
                    .app_data(web::Data::new(gateway))
                    .service(inspect_content),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_requires_token() {
        let app = content_app!();

        let req = test::TestRequest::get().uri("/content/QmAnything").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_blank_content_id_rejected() {
        let app = content_app!();
        let token = generate_jwt_token(5, "explorer@example.com", SECRET.as_bytes()).unwrap();

        let req = test::TestRequest::get()
            .uri("/content/%20")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }
}
