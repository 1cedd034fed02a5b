/// Like repository - set membership toggling with a cached cardinality
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result as AppResult};

/// Toggle a (post, user) membership in the like set.
///
/// Runs in a single transaction: the set mutation is one row inserted or
/// deleted (never a read-then-overwrite of the whole set), and the cached
/// `likes_count` is re-derived from the set itself before commit, so the
/// cache can never drift from the set it summarizes. The post row is
/// locked up front, so a post deleted mid-flight surfaces as `NotFound`
/// rather than a failed counter update.
///
/// Returns `(liked, likes_count)` as observed after the mutation.
pub async fn toggle_like(
    pool: &PgPool,
    post_id: Uuid,
    user_id: Uuid,
) -> AppResult<(bool, i64)> {
    let mut tx = pool.begin().await?;

    let post: Option<Uuid> = sqlx::query_scalar("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await?;
    if post.is_none() {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    let inserted = sqlx::query(
        r#"
        INSERT INTO post_likes (post_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT (post_id, user_id) DO NOTHING
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?
    .rows_affected()
        == 1;

    if !inserted {
        sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }

    let likes_count: i64 = sqlx::query_scalar(
        r#"
        UPDATE posts
        SET likes_count = (SELECT COUNT(*) FROM post_likes WHERE post_id = $1)
        WHERE id = $1
        RETURNING likes_count
        "#,
    )
    .bind(post_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((inserted, likes_count))
}

/// Check if a user currently appears in a post's like set.
pub async fn has_liked(pool: &PgPool, post_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM post_likes WHERE post_id = $1 AND user_id = $2)",
    )
    .bind(post_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

/// Cardinality of the like set itself (not the cached column).
pub async fn count_likes(pool: &PgPool, post_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post_likes WHERE post_id = $1")
        .bind(post_id)
        .fetch_one(pool)
        .await
}
