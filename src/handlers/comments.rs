use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db::{comment_repo, user_repo};
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{AuthorInfo, Comment, CommentTreeResponse};
use crate::pagination::{PageInfo, PageQuery};
use crate::security::{authorize, Action};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 5000))]
    pub content: String,

    pub post_id: Uuid,

    pub parent_comment_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub comments: Vec<CommentTreeResponse>,
    pub pagination: PageInfo,
}

/// Nest a flat batch of comments under the given root ids.
///
/// `comments` is the closure of every root's subtree (roots included);
/// ordering inside a reply list is oldest first, while the root order
/// follows `roots`. Nodes whose author is absent from `authors` are
/// dropped along with their subtrees.
pub fn assemble_comment_trees(
    roots: &[Uuid],
    mut comments: Vec<Comment>,
    authors: &HashMap<Uuid, AuthorInfo>,
) -> Vec<CommentTreeResponse> {
    comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for comment in &comments {
        if let Some(parent) = comment.parent_comment_id {
            children.entry(parent).or_default().push(comment.id);
        }
    }

    let mut by_id: HashMap<Uuid, Comment> = comments.into_iter().map(|c| (c.id, c)).collect();

    fn build(
        id: Uuid,
        by_id: &mut HashMap<Uuid, Comment>,
        children: &HashMap<Uuid, Vec<Uuid>>,
        authors: &HashMap<Uuid, AuthorInfo>,
    ) -> Option<CommentTreeResponse> {
        let comment = by_id.remove(&id)?;
        let author = authors.get(&comment.author_id)?.clone();

        let replies = children
            .get(&id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|child| build(*child, by_id, children, authors))
                    .collect()
            })
            .unwrap_or_default();

        Some(CommentTreeResponse {
            id: comment.id,
            post_id: comment.post_id,
            parent_comment_id: comment.parent_comment_id,
            content: comment.content,
            author,
            replies,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        })
    }

    roots
        .iter()
        .filter_map(|root| build(*root, &mut by_id, &children, authors))
        .collect()
}

/// POST /api/comments
pub async fn create_comment(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    if req.content.trim().is_empty() {
        return Err(AppError::Validation("Comment content cannot be empty".to_string()));
    }

    let comment = comment_repo::create_comment(
        &pool,
        req.post_id,
        auth.id,
        &req.content,
        req.parent_comment_id,
    )
    .await?;

    tracing::info!(comment_id = %comment.id, post_id = %req.post_id, "comment created");

    let authors = user_repo::get_authors(&pool, &[auth.id]).await?;
    let roots = [comment.id];
    let mut trees = assemble_comment_trees(&roots, vec![comment], &authors);
    let tree = trees
        .pop()
        .ok_or_else(|| AppError::Internal("Comment author missing".to_string()))?;

    Ok(HttpResponse::Created().json(tree))
}

/// GET /api/comments/post/{post_id}
///
/// Pages over top-level comments, newest first, each carrying its full
/// reply subtree.
pub async fn list_comments(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let post_id = path.into_inner();
    let page = query.resolve();

    let top_level = comment_repo::list_top_level(&pool, post_id, page.limit, page.offset()).await?;
    let total = comment_repo::count_top_level(&pool, post_id).await?;

    let roots: Vec<Uuid> = top_level.iter().map(|c| c.id).collect();
    let subtree = comment_repo::fetch_subtrees(&pool, &roots).await?;

    let author_ids: Vec<Uuid> = subtree.iter().map(|c| c.author_id).collect();
    let authors = user_repo::get_authors(&pool, &author_ids).await?;

    Ok(HttpResponse::Ok().json(CommentListResponse {
        comments: assemble_comment_trees(&roots, subtree, &authors),
        pagination: PageInfo::new(page, total),
    }))
}

/// PUT /api/comments/{id}
pub async fn update_comment(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let comment_id = path.into_inner();

    if req.content.trim().is_empty() {
        return Err(AppError::Validation("Comment content cannot be empty".to_string()));
    }

    let existing = comment_repo::get_comment_by_id(&pool, comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    authorize(&auth, Action::UpdateComment, Some(existing.author_id))?;

    let updated = comment_repo::update_comment(&pool, comment_id, &req.content).await?;

    let authors = user_repo::get_authors(&pool, &[updated.author_id]).await?;
    let roots = [updated.id];
    let mut trees = assemble_comment_trees(&roots, vec![updated], &authors);
    let tree = trees
        .pop()
        .ok_or_else(|| AppError::Internal("Comment author missing".to_string()))?;

    Ok(HttpResponse::Ok().json(tree))
}

/// DELETE /api/comments/{id}
///
/// Removes the comment and every descendant reply; the post's comment
/// counter drops by the full subtree size.
pub async fn delete_comment(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let comment_id = path.into_inner();

    let existing = comment_repo::get_comment_by_id(&pool, comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    authorize(&auth, Action::DeleteComment, Some(existing.author_id))?;

    let removed = comment_repo::delete_comment_cascade(&pool, comment_id).await?;

    tracing::info!(comment_id = %comment_id, removed, "comment subtree deleted");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Comment deleted successfully",
        "removedCount": removed
    })))
}
