use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::db::user_repo;
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::UserResponse;
use crate::security::{self, jwt};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8))]
    pub password: String,

    #[validate(length(max = 100))]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// POST /api/auth/register
pub async fn register(
    pool: web::Data<PgPool>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    if user_repo::email_exists(&pool, &req.email).await? {
        return Err(AppError::Validation("Email is already registered".to_string()));
    }
    if user_repo::username_exists(&pool, &req.username).await? {
        return Err(AppError::Validation("Username is already taken".to_string()));
    }

    let password_hash = security::hash_password(&req.password)?;
    let user = user_repo::create_user(
        &pool,
        &req.username,
        &req.email,
        &password_hash,
        req.display_name.as_deref(),
    )
    .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");

    let token = jwt::generate_token(user.id, &user.username)?;
    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// POST /api/auth/login
pub async fn login(
    pool: web::Data<PgPool>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    // Same error for unknown email and bad password.
    let user = user_repo::find_by_email(&pool, &req.email)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("Invalid credentials".to_string()))?;

    security::verify_password(&req.password, &user.password_hash)?;

    let token = jwt::generate_token(user.id, &user.username)?;
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// GET /api/auth/me
pub async fn me(pool: web::Data<PgPool>, auth: AuthUser) -> Result<HttpResponse> {
    let user = user_repo::find_by_id(&pool, auth.id)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("Unknown user".to_string()))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
