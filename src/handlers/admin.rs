use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{comment_repo, post_repo, user_repo};
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{PostStatus, UserResponse, UserRole};
use crate::pagination::{PageInfo, PageQuery};
use crate::security::require_admin;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: i64,
    pub total_posts: i64,
    pub total_comments: i64,
    pub published_posts: i64,
    pub draft_posts: i64,
    pub new_users_last_30_days: i64,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub pagination: PageInfo,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPostQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<PostStatus>,
}

/// GET /api/admin/stats
pub async fn stats(pool: web::Data<PgPool>, auth: AuthUser) -> Result<HttpResponse> {
    require_admin(&auth)?;

    let since = chrono::Utc::now() - chrono::Duration::days(30);
    let (total_users, total_posts, total_comments, published_posts, draft_posts, new_users) =
        tokio::try_join!(
            user_repo::count_users(&pool),
            post_repo::count_all(&pool, None),
            comment_repo::count_all(&pool),
            post_repo::count_by_status(&pool, PostStatus::Published),
            post_repo::count_by_status(&pool, PostStatus::Draft),
            user_repo::count_users_since(&pool, since),
        )?;

    Ok(HttpResponse::Ok().json(AdminStats {
        total_users,
        total_posts,
        total_comments,
        published_posts,
        draft_posts,
        new_users_last_30_days: new_users,
    }))
}

/// GET /api/admin/users
pub async fn list_users(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    require_admin(&auth)?;
    let page = query.resolve();

    let users = user_repo::list_users(&pool, page.limit, page.offset()).await?;
    let total = user_repo::count_users(&pool).await?;

    Ok(HttpResponse::Ok().json(UserListResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
        pagination: PageInfo::new(page, total),
    }))
}

/// PUT /api/admin/users/{id}/role
pub async fn update_user_role(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateRoleRequest>,
) -> Result<HttpResponse> {
    require_admin(&auth)?;
    let user_id = path.into_inner();

    let updated = user_repo::update_role(&pool, user_id, req.role)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %user_id, role = ?req.role, actor_id = %auth.id, "role updated");

    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    require_admin(&auth)?;
    let user_id = path.into_inner();

    let target = user_repo::find_by_id(&pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    // Other admins must be demoted first; deleting your own account is allowed.
    if target.role == UserRole::Admin && target.id != auth.id {
        return Err(AppError::Forbidden("Cannot delete an admin account".to_string()));
    }

    user_repo::delete_user_cascade(&pool, user_id).await?;

    tracing::info!(user_id = %user_id, actor_id = %auth.id, "user deleted");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "User deleted successfully"
    })))
}

/// GET /api/admin/posts
pub async fn list_posts(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    query: web::Query<AdminPostQuery>,
) -> Result<HttpResponse> {
    require_admin(&auth)?;

    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .resolve();

    let posts = post_repo::list_all(&pool, query.status, page.limit, page.offset()).await?;
    let total = post_repo::count_all(&pool, query.status).await?;

    Ok(HttpResponse::Ok().json(super::posts::PostListResponse {
        posts: super::posts::with_authors(&pool, posts).await?,
        pagination: PageInfo::new(page, total),
    }))
}
