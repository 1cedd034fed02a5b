use actix_web::{web, HttpResponse};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::like_repo;
use crate::error::Result;
use crate::middleware::AuthUser;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub liked: bool,
    pub likes_count: i64,
}

/// POST /api/posts/{id}/like
///
/// Toggles the caller's like. The response reports the state after the
/// toggle and the post's recomputed like count.
pub async fn toggle_like(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post_id = path.into_inner();

    let (liked, likes_count) = like_repo::toggle_like(&pool, post_id, auth.id).await?;

    Ok(HttpResponse::Ok().json(LikeResponse { liked, likes_count }))
}
