use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db::{post_repo, user_repo};
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{Post, PostResponse, PostStatus};
use crate::pagination::{PageInfo, PageQuery};
use crate::security::{authorize, Action};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1))]
    pub body: String,

    pub image_url: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    pub status: Option<PostStatus>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub body: Option<String>,

    /// Present-and-null clears the image; absent leaves it unchanged.
    #[serde(default, deserialize_with = "deserialize_explicit_null")]
    pub image_url: Option<Option<String>>,

    pub tags: Option<Vec<String>>,

    pub status: Option<PostStatus>,
}

fn deserialize_explicit_null<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub pagination: PageInfo,
}

/// Attach author info to a page of posts with one batched lookup.
pub(crate) async fn with_authors(pool: &PgPool, posts: Vec<Post>) -> Result<Vec<PostResponse>> {
    let author_ids: Vec<Uuid> = posts.iter().map(|p| p.author_id).collect();
    let mut authors = user_repo::get_authors(pool, &author_ids).await?;

    posts
        .into_iter()
        .map(|post| {
            let author = authors
                .get(&post.author_id)
                .cloned()
                .ok_or_else(|| AppError::Internal("Post author missing".to_string()))?;
            Ok(PostResponse::from_post(post, author))
        })
        .collect()
}

async fn load_author(pool: &PgPool, author_id: Uuid) -> Result<crate::models::AuthorInfo> {
    user_repo::get_authors(pool, &[author_id])
        .await?
        .remove(&author_id)
        .ok_or_else(|| AppError::Internal("Post author missing".to_string()))
}

/// POST /api/posts
pub async fn create_post(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let status = req.status.unwrap_or(PostStatus::Published);
    let post = post_repo::create_post(
        &pool,
        auth.id,
        &req.title,
        &req.body,
        req.image_url.as_deref(),
        &req.tags,
        status,
    )
    .await?;

    tracing::info!(post_id = %post.id, author_id = %auth.id, "post created");

    let author = load_author(&pool, auth.id).await?;
    Ok(HttpResponse::Created().json(PostResponse::from_post(post, author)))
}

/// GET /api/posts
pub async fn list_posts(
    pool: web::Data<PgPool>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let page = query.resolve();

    let posts = post_repo::list_published(&pool, page.limit, page.offset()).await?;
    let total = post_repo::count_published(&pool).await?;

    Ok(HttpResponse::Ok().json(PostListResponse {
        posts: with_authors(&pool, posts).await?,
        pagination: PageInfo::new(page, total),
    }))
}

/// GET /api/posts/{id}
pub async fn get_post(pool: web::Data<PgPool>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let post_id = path.into_inner();

    let post = post_repo::find_post_by_id(&pool, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let author = load_author(&pool, post.author_id).await?;
    Ok(HttpResponse::Ok().json(PostResponse::from_post(post, author)))
}

/// GET /api/posts/user/{user_id}
pub async fn list_posts_by_user(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();
    let page = query.resolve();

    if user_repo::find_by_id(&pool, user_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let posts =
        post_repo::list_published_by_author(&pool, user_id, page.limit, page.offset()).await?;
    let total = post_repo::count_published_by_author(&pool, user_id).await?;

    Ok(HttpResponse::Ok().json(PostListResponse {
        posts: with_authors(&pool, posts).await?,
        pagination: PageInfo::new(page, total),
    }))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let post_id = path.into_inner();

    let post = post_repo::find_post_by_id(&pool, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    authorize(&auth, Action::UpdatePost, Some(post.author_id))?;

    let updated = post_repo::update_post(
        &pool,
        post_id,
        req.title.as_deref(),
        req.body.as_deref(),
        req.image_url.as_ref().map(|v| v.as_deref()),
        req.tags.as_deref(),
        req.status,
    )
    .await?;

    let author = load_author(&pool, updated.author_id).await?;
    Ok(HttpResponse::Ok().json(PostResponse::from_post(updated, author)))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post_id = path.into_inner();

    let post = post_repo::find_post_by_id(&pool, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    authorize(&auth, Action::DeletePost, Some(post.author_id))?;

    // Comments and likes go with the post via FK cascade.
    post_repo::delete_post(&pool, post_id).await?;

    tracing::info!(post_id = %post_id, actor_id = %auth.id, "post deleted");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Post deleted successfully"
    })))
}
