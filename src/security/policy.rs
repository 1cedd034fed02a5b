//! Single policy-evaluation point for every role/ownership decision.
//!
//! Handlers never compare roles or author ids inline; they ask
//! `authorize(identity, action, owner)` and propagate the error.

use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::UserRole;

/// Everything a caller may ask to do to someone else's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    UpdatePost,
    DeletePost,
    UpdateComment,
    DeleteComment,
    Moderate,
}

impl Action {
    fn denial_message(&self) -> &'static str {
        match self {
            Action::UpdatePost => "Not authorized to update this post",
            Action::DeletePost => "Not authorized to delete this post",
            Action::UpdateComment => "Not authorized to update this comment",
            Action::DeleteComment => "Not authorized to delete this comment",
            Action::Moderate => "Admin access required",
        }
    }
}

/// Allow when the identity owns the entity or holds the admin role.
/// `Moderate` ignores ownership and requires admin outright.
pub fn authorize(
    identity: &AuthUser,
    action: Action,
    owner: Option<Uuid>,
) -> Result<(), AppError> {
    if identity.role == UserRole::Admin {
        return Ok(());
    }

    match action {
        Action::Moderate => Err(AppError::Forbidden(action.denial_message().to_string())),
        _ => {
            if owner == Some(identity.id) {
                Ok(())
            } else {
                Err(AppError::Forbidden(action.denial_message().to_string()))
            }
        }
    }
}

/// Shorthand for admin-only surfaces.
pub fn require_admin(identity: &AuthUser) -> Result<(), AppError> {
    authorize(identity, Action::Moderate, None)
}
