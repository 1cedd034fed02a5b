use actix_web::ResponseError;
use uuid::Uuid;

use chronicle::error::AppError;
use chronicle::middleware::AuthUser;
use chronicle::models::UserRole;
use chronicle::security::{authorize, require_admin, Action};

fn member(id: Uuid) -> AuthUser {
    AuthUser {
        id,
        role: UserRole::Member,
    }
}

fn admin(id: Uuid) -> AuthUser {
    AuthUser {
        id,
        role: UserRole::Admin,
    }
}

const MUTATIONS: [Action; 4] = [
    Action::UpdatePost,
    Action::DeletePost,
    Action::UpdateComment,
    Action::DeleteComment,
];

#[test]
fn test_owner_allowed_for_every_mutation() {
    let id = Uuid::new_v4();
    for action in MUTATIONS {
        assert!(authorize(&member(id), action, Some(id)).is_ok());
    }
}

#[test]
fn test_stranger_denied_for_every_mutation() {
    let caller = member(Uuid::new_v4());
    let owner = Uuid::new_v4();
    for action in MUTATIONS {
        let err = authorize(&caller, action, Some(owner)).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}

#[test]
fn test_admin_allowed_regardless_of_owner() {
    let caller = admin(Uuid::new_v4());
    let owner = Uuid::new_v4();
    for action in MUTATIONS {
        assert!(authorize(&caller, action, Some(owner)).is_ok());
    }
    assert!(authorize(&caller, Action::Moderate, None).is_ok());
}

#[test]
fn test_moderate_ignores_ownership() {
    // Owning the target does not grant moderation rights.
    let id = Uuid::new_v4();
    let err = authorize(&member(id), Action::Moderate, Some(id)).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[test]
fn test_missing_owner_denies_non_admin() {
    let caller = member(Uuid::new_v4());
    assert!(authorize(&caller, Action::DeletePost, None).is_err());
}

#[test]
fn test_require_admin_helper() {
    assert!(require_admin(&admin(Uuid::new_v4())).is_ok());
    assert!(require_admin(&member(Uuid::new_v4())).is_err());
}

#[test]
fn test_denial_maps_to_403() {
    let err = require_admin(&member(Uuid::new_v4())).unwrap_err();
    assert_eq!(err.status_code().as_u16(), 403);
}
