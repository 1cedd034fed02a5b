/// User repository - all database operations for users
use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{AuthorInfo, User, UserRole};

const USER_COLUMNS: &str = "id, username, email, password_hash, display_name, avatar_url, role, created_at, updated_at";

pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
    display_name: Option<&str>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (username, email, password_hash, display_name)
        VALUES ($1, $2, $3, $4)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(username)
    .bind(email.to_lowercase())
    .bind(password_hash)
    .bind(display_name)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email.to_lowercase())
    .fetch_optional(pool)
    .await
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email.to_lowercase())
        .fetch_one(pool)
        .await
}

pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
        .bind(username)
        .fetch_one(pool)
        .await
}

/// Batch author projection for embedding in posts and comments.
pub async fn get_authors(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, AuthorInfo>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let authors = sqlx::query_as::<_, AuthorInfo>(
        "SELECT id, username, avatar_url FROM users WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(authors.into_iter().map(|a| (a.id, a)).collect())
}

pub async fn list_users(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_users(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
}

pub async fn count_users_since(
    pool: &PgPool,
    since: chrono::DateTime<chrono::Utc>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE created_at >= $1")
        .bind(since)
        .fetch_one(pool)
        .await
}

pub async fn update_role(
    pool: &PgPool,
    user_id: Uuid,
    role: UserRole,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET role = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(role)
    .fetch_optional(pool)
    .await
}

/// Delete a user together with their posts and comments.
///
/// FK cascades remove the user's own posts (and everything under them),
/// their comments, and their likes. Posts by *other* users that lost
/// comments or likes in the cascade then get their cached counters
/// recounted from the surviving sets, all inside one transaction.
pub async fn delete_user_cascade(pool: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    // Surviving posts whose engagement the cascade will touch. Comment
    // subtrees rooted under this user's comments disappear too, so the
    // affected-post set is computed over the full closure.
    let affected: Vec<Uuid> = sqlx::query_scalar(
        r#"
        WITH RECURSIVE doomed AS (
            SELECT id, post_id FROM comments WHERE author_id = $1
            UNION
            SELECT c.id, c.post_id FROM comments c
            JOIN doomed d ON c.parent_comment_id = d.id
        )
        SELECT DISTINCT p.id
        FROM posts p
        WHERE p.author_id <> $1
          AND (p.id IN (SELECT post_id FROM doomed)
               OR p.id IN (SELECT post_id FROM post_likes WHERE user_id = $1))
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    if !affected.is_empty() {
        sqlx::query(
            r#"
            UPDATE posts
            SET likes_count = (SELECT COUNT(*) FROM post_likes pl WHERE pl.post_id = posts.id),
                comments_count = (SELECT COUNT(*) FROM comments c WHERE c.post_id = posts.id)
            WHERE id = ANY($1)
            "#,
        )
        .bind(&affected)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}
