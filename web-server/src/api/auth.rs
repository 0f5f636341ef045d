// web-server/src/api/auth.rs
use actix::Addr;
use actix_web::{post, web, HttpResponse, Responder};
use common::{generate_jwt_token, Config, Credentials, LoginResponse, MessageResponse};

use crate::user_store::{CreateUser, FindUserByEmail, StoreError, UserStore};
use crate::utils::password::{hash_password, verify_password};

fn server_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(MessageResponse::new("Server error"))
}

fn normalize(credentials: Credentials) -> Option<(String, String)> {
    let email = credentials.email.trim().to_lowercase();
    if email.is_empty() || credentials.password.is_empty() {
        return None;
    }
    Some((email, credentials.password))
}

// Register a new user
#[post("/signup")]
pub async fn signup(
    body: web::Json<Credentials>,
    store: web::Data<Addr<UserStore>>,
) -> impl Responder {
    let Some((email, password)) = normalize(body.into_inner()) else {
        return HttpResponse::BadRequest().json(MessageResponse::new("Email and password are required"));
    };

    // Argon2 is CPU bound, run it on the blocking pool
    let password_hash = match web::block(move || hash_password(&password)).await {
        Ok(Ok(hash)) => hash,
        Ok(Err(e)) => {
            tracing::error!("Password hashing failed: {}", e);
            return server_error();
        },
        Err(e) => {
            tracing::error!("Password hashing task failed: {}", e);
            return server_error();
        }
    };

    match store.send(CreateUser { email, password_hash }).await {
        Ok(Ok(user_id)) => {
            tracing::info!("User {} signed up", user_id);
            HttpResponse::Created().json(MessageResponse::new("User registered successfully"))
        },
        Ok(Err(StoreError::DuplicateEmail)) => {
            HttpResponse::Conflict().json(MessageResponse::new("Email already exists"))
        },
        Ok(Err(e)) => {
            tracing::error!("Error storing user: {}", e);
            HttpResponse::InternalServerError().json(MessageResponse::new("Database error"))
        },
        Err(e) => {
            tracing::error!("User store unavailable: {}", e);
            server_error()
        }
    }
}

// Check credentials and hand out a session token
#[post("/login")]
pub async fn login(
    body: web::Json<Credentials>,
    store: web::Data<Addr<UserStore>>,
    config: web::Data<Config>,
) -> impl Responder {
    let Some((email, password)) = normalize(body.into_inner()) else {
        return HttpResponse::BadRequest().json(MessageResponse::new("Email and password are required"));
    };

    let user = match store.send(FindUserByEmail { email }).await {
        Ok(Ok(Some(user))) => user,
        Ok(Ok(None)) => {
            return HttpResponse::NotFound().json(MessageResponse::new("User not found"));
        },
        Ok(Err(e)) => {
            tracing::error!("Error looking up user: {}", e);
            return HttpResponse::InternalServerError().json(MessageResponse::new("Database error"));
        },
        Err(e) => {
            tracing::error!("User store unavailable: {}", e);
            return server_error();
        }
    };

    let stored_hash = user.password_hash.clone();
    let matches = match web::block(move || verify_password(&password, &stored_hash)).await {
        Ok(Ok(matches)) => matches,
        Ok(Err(e)) => {
            tracing::error!("Stored hash for user {} is unusable: {}", user.id, e);
            return server_error();
        },
        Err(e) => {
            tracing::error!("Password check task failed: {}", e);
            return server_error();
        }
    };

    if !matches {
        tracing::info!("Failed login for user {}", user.id);
        return HttpResponse::Unauthorized().json(MessageResponse::new("Invalid credentials"));
    }

    match generate_jwt_token(user.id, &user.email, config.jwt_secret.as_bytes()) {
        Ok(token) => {
            tracing::info!("User {} logged in", user.id);
            HttpResponse::Ok().json(LoginResponse {
                message: "Login successful".to_string(),
                token,
            })
        },
        Err(e) => {
            tracing::error!("Error signing token: {}", e);
            server_error()
        }
    }
}
