/// Comment repository - threaded creation, subtree queries, cascading delete
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result as AppResult};
use crate::models::Comment;

const COMMENT_COLUMNS: &str =
    "id, post_id, author_id, parent_comment_id, content, created_at, updated_at";

/// Create a comment, optionally as a reply.
///
/// One transaction covers the parent checks, the insert, and the post's
/// `comments_count` increment, so a crash cannot leave the counter out of
/// step with the stored comments. A reply's parent must exist and must
/// belong to the same post.
pub async fn create_comment(
    pool: &PgPool,
    post_id: Uuid,
    author_id: Uuid,
    content: &str,
    parent_comment_id: Option<Uuid>,
) -> AppResult<Comment> {
    let mut tx = pool.begin().await?;

    let post_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await?;

    if !post_exists {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    if let Some(parent_id) = parent_comment_id {
        let parent_post: Option<Uuid> =
            sqlx::query_scalar("SELECT post_id FROM comments WHERE id = $1")
                .bind(parent_id)
                .fetch_optional(&mut *tx)
                .await?;

        match parent_post {
            None => {
                return Err(AppError::NotFound("Parent comment not found".to_string()));
            }
            Some(parent_post_id) if parent_post_id != post_id => {
                return Err(AppError::Validation(
                    "Parent comment belongs to a different post".to_string(),
                ));
            }
            Some(_) => {}
        }
    }

    let comment = sqlx::query_as::<_, Comment>(&format!(
        r#"
        INSERT INTO comments (post_id, author_id, parent_comment_id, content)
        VALUES ($1, $2, $3, $4)
        RETURNING {COMMENT_COLUMNS}
        "#
    ))
    .bind(post_id)
    .bind(author_id)
    .bind(parent_comment_id)
    .bind(content)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE posts SET comments_count = comments_count + 1 WHERE id = $1")
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(comment)
}

pub async fn get_comment_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!(
        "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn update_comment(
    pool: &PgPool,
    id: Uuid,
    content: &str,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!(
        r#"
        UPDATE comments
        SET content = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {COMMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(content)
    .fetch_one(pool)
    .await
}

/// Delete a comment and every descendant reply.
///
/// The descendant closure is snapshotted with a recursive CTE before any
/// row is removed, so partial deletion cannot orphan a reply. The post's
/// `comments_count` is then recomputed from the rows that remain, in the
/// same transaction; a reply that slipped in after the snapshot and died
/// with the cascade still leaves the counter true. Returns the snapshot
/// size.
pub async fn delete_comment_cascade(pool: &PgPool, comment_id: Uuid) -> AppResult<i64> {
    let mut tx = pool.begin().await?;

    let post_id: Option<Uuid> = sqlx::query_scalar("SELECT post_id FROM comments WHERE id = $1")
        .bind(comment_id)
        .fetch_optional(&mut *tx)
        .await?;

    let post_id = post_id.ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    let doomed: Vec<Uuid> = sqlx::query_scalar(
        r#"
        WITH RECURSIVE subtree AS (
            SELECT id FROM comments WHERE id = $1
            UNION ALL
            SELECT c.id FROM comments c
            JOIN subtree s ON c.parent_comment_id = s.id
        )
        SELECT id FROM subtree
        "#,
    )
    .bind(comment_id)
    .fetch_all(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM comments WHERE id = ANY($1)")
        .bind(&doomed)
        .execute(&mut *tx)
        .await?;

    let removed = doomed.len() as i64;

    sqlx::query(
        r#"
        UPDATE posts
        SET comments_count = (SELECT COUNT(*) FROM comments WHERE post_id = $1)
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(removed)
}

/// Top-level comments for a post, newest first.
pub async fn list_top_level(
    pool: &PgPool,
    post_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!(
        r#"
        SELECT {COMMENT_COLUMNS}
        FROM comments
        WHERE post_id = $1 AND parent_comment_id IS NULL
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(post_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_top_level(pool: &PgPool, post_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM comments WHERE post_id = $1 AND parent_comment_id IS NULL",
    )
    .bind(post_id)
    .fetch_one(pool)
    .await
}

/// All comments in the subtrees rooted at `root_ids`, roots included.
pub async fn fetch_subtrees(
    pool: &PgPool,
    root_ids: &[Uuid],
) -> Result<Vec<Comment>, sqlx::Error> {
    if root_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Comment>(&format!(
        r#"
        WITH RECURSIVE subtree AS (
            SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ANY($1)
            UNION ALL
            SELECT c.id, c.post_id, c.author_id, c.parent_comment_id, c.content, c.created_at, c.updated_at
            FROM comments c
            JOIN subtree s ON c.parent_comment_id = s.id
        )
        SELECT {COMMENT_COLUMNS} FROM subtree
        "#
    ))
    .bind(root_ids)
    .fetch_all(pool)
    .await
}

pub async fn count_by_post(pool: &PgPool, post_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE post_id = $1")
        .bind(post_id)
        .fetch_one(pool)
        .await
}

pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments")
        .fetch_one(pool)
        .await
}
