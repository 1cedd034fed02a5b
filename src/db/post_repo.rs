/// Post repository - CRUD and paged listings
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Post, PostStatus};

const POST_COLUMNS: &str = "id, author_id, title, body, image_url, tags, status, likes_count, comments_count, created_at, updated_at";

pub async fn create_post(
    pool: &PgPool,
    author_id: Uuid,
    title: &str,
    body: &str,
    image_url: Option<&str>,
    tags: &[String],
    status: PostStatus,
) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(&format!(
        r#"
        INSERT INTO posts (author_id, title, body, image_url, tags, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {POST_COLUMNS}
        "#
    ))
    .bind(author_id)
    .bind(title)
    .bind(body)
    .bind(image_url)
    .bind(tags)
    .bind(status)
    .fetch_one(pool)
    .await
}

pub async fn find_post_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(&format!(
        "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Partial update; `None` fields keep their stored value.
pub async fn update_post(
    pool: &PgPool,
    id: Uuid,
    title: Option<&str>,
    body: Option<&str>,
    image_url: Option<Option<&str>>,
    tags: Option<&[String]>,
    status: Option<PostStatus>,
) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(&format!(
        r#"
        UPDATE posts
        SET title = COALESCE($2, title),
            body = COALESCE($3, body),
            image_url = CASE WHEN $4 THEN $5 ELSE image_url END,
            tags = COALESCE($6, tags),
            status = COALESCE($7, status),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {POST_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(title)
    .bind(body)
    .bind(image_url.is_some())
    .bind(image_url.flatten())
    .bind(tags)
    .bind(status)
    .fetch_one(pool)
    .await
}

/// Delete a post; comments and likes go with it through FK cascades.
pub async fn delete_post(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn list_published(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(&format!(
        r#"
        SELECT {POST_COLUMNS}
        FROM posts
        WHERE status = 'published'
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_published(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE status = 'published'")
        .fetch_one(pool)
        .await
}

pub async fn list_published_by_author(
    pool: &PgPool,
    author_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(&format!(
        r#"
        SELECT {POST_COLUMNS}
        FROM posts
        WHERE author_id = $1 AND status = 'published'
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(author_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_published_by_author(
    pool: &PgPool,
    author_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM posts WHERE author_id = $1 AND status = 'published'",
    )
    .bind(author_id)
    .fetch_one(pool)
    .await
}

/// Admin listing across all statuses, optionally filtered by one.
pub async fn list_all(
    pool: &PgPool,
    status: Option<PostStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(&format!(
        r#"
        SELECT {POST_COLUMNS}
        FROM posts
        WHERE $1::post_status IS NULL OR status = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(status)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_all(pool: &PgPool, status: Option<PostStatus>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM posts WHERE $1::post_status IS NULL OR status = $1",
    )
    .bind(status)
    .fetch_one(pool)
    .await
}

pub async fn count_by_status(pool: &PgPool, status: PostStatus) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE status = $1")
        .bind(status)
        .fetch_one(pool)
        .await
}
