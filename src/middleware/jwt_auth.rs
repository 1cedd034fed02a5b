/// Bearer-token authentication middleware.
/// Validates the JWT, then resolves the caller's identity and role from the
/// store so role changes and deletions take effect immediately. The resolved
/// `AuthUser` is added to request extensions.
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;
use std::rc::Rc;
use uuid::Uuid;

use crate::db::user_repo;
use crate::error::AppError;
use crate::models::UserRole;
use crate::security::jwt;

/// Caller identity resolved by the authorization gate.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: UserRole,
}

/// JWT authentication middleware factory
pub struct JwtAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            // Extract header data to an owned String before any mutable
            // access to the request extensions.
            let auth_header = match req.headers().get("Authorization") {
                Some(header) => match header.to_str() {
                    Ok(h) => h.to_string(),
                    Err(_) => {
                        return Err(AppError::Unauthenticated(
                            "Invalid Authorization header".to_string(),
                        )
                        .into());
                    }
                },
                None => {
                    return Err(AppError::Unauthenticated(
                        "Missing Authorization header".to_string(),
                    )
                    .into());
                }
            };

            let token = match auth_header.strip_prefix("Bearer ") {
                Some(t) => t,
                None => {
                    return Err(AppError::Unauthenticated(
                        "Invalid Authorization scheme, expected Bearer".to_string(),
                    )
                    .into());
                }
            };

            let user_id = match jwt::validate_token(token) {
                Ok(token_data) => match Uuid::parse_str(&token_data.claims.sub) {
                    Ok(id) => id,
                    Err(_) => {
                        return Err(AppError::Unauthenticated(
                            "Invalid user ID in token".to_string(),
                        )
                        .into());
                    }
                },
                Err(e) => {
                    tracing::debug!("Token validation failed: {}", e);
                    return Err(
                        AppError::Unauthenticated("Invalid or expired token".to_string()).into(),
                    );
                }
            };

            // The token alone is not the identity: the user row must still
            // exist, and its role is read fresh.
            let pool = req
                .app_data::<web::Data<PgPool>>()
                .cloned()
                .ok_or_else(|| AppError::Internal("Database pool not configured".to_string()))?;

            let user = user_repo::find_by_id(pool.get_ref(), user_id)
                .await
                .map_err(AppError::Database)?
                .ok_or_else(|| AppError::Unauthenticated("Unknown user".to_string()))?;

            req.extensions_mut().insert(AuthUser {
                id: user.id,
                role: user.role,
            });

            let res = service.call(req).await?;
            Ok(res)
        })
    }
}

impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthUser>().copied() {
            Some(user) => ready(Ok(user)),
            None => ready(Err(AppError::Unauthenticated(
                "User identity missing in request".to_string(),
            )
            .into())),
        }
    }
}
