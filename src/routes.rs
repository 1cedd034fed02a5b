//! Route configuration
//!
//! Centralized route setup; each domain manages its own sub-scope.

use actix_web::web;

use crate::handlers;
use crate::middleware::JwtAuthMiddleware;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Stored media, public by URL
        .route("/uploads/{filename}", web::get().to(handlers::uploads::serve_upload))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(handlers::health::health_check))
                .configure(routes::auth::configure)
                .configure(routes::posts::configure)
                .configure(routes::comments::configure)
                .configure(routes::admin::configure),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    async fn status_of(req: test::TestRequest) -> StatusCode {
        let app = test::init_service(App::new().configure(configure_routes)).await;
        match test::try_call_service(&app, req.to_request()).await {
            Ok(resp) => resp.status(),
            Err(e) => e.error_response().status(),
        }
    }

    #[actix_web::test]
    async fn test_protected_routes_reject_missing_token() {
        let status = status_of(test::TestRequest::post().uri("/api/posts")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let status = status_of(test::TestRequest::delete().uri(
            "/api/comments/00000000-0000-0000-0000-000000000000",
        ))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let status = status_of(test::TestRequest::get().uri("/api/admin/stats")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_non_bearer_scheme_rejected() {
        let status = status_of(
            test::TestRequest::get()
                .uri("/api/auth/me")
                .insert_header(("Authorization", "Basic dXNlcjpwYXNz")),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_unknown_route_is_not_found() {
        let status = status_of(test::TestRequest::get().uri("/api/nothing-here")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

// Sub-modules for each domain
mod routes {
    use super::*;

    pub mod auth {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/auth")
                    .route("/register", web::post().to(handlers::auth::register))
                    .route("/login", web::post().to(handlers::auth::login))
                    .service(
                        web::scope("")
                            .wrap(JwtAuthMiddleware)
                            .route("/me", web::get().to(handlers::auth::me)),
                    ),
            );
        }
    }

    pub mod posts {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/posts")
                    .route("", web::get().to(handlers::posts::list_posts))
                    .route("/user/{user_id}", web::get().to(handlers::posts::list_posts_by_user))
                    .route("/{id}", web::get().to(handlers::posts::get_post))
                    .service(
                        web::scope("")
                            .wrap(JwtAuthMiddleware)
                            .route("", web::post().to(handlers::posts::create_post))
                            .route("/upload-image", web::post().to(handlers::uploads::upload_image))
                            .route("/{id}", web::put().to(handlers::posts::update_post))
                            .route("/{id}", web::delete().to(handlers::posts::delete_post))
                            .route("/{id}/like", web::post().to(handlers::likes::toggle_like)),
                    ),
            );
        }
    }

    pub mod comments {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/comments")
                    .route("/post/{post_id}", web::get().to(handlers::comments::list_comments))
                    .service(
                        web::scope("")
                            .wrap(JwtAuthMiddleware)
                            .route("", web::post().to(handlers::comments::create_comment))
                            .route("/{id}", web::put().to(handlers::comments::update_comment))
                            .route("/{id}", web::delete().to(handlers::comments::delete_comment)),
                    ),
            );
        }
    }

    pub mod admin {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/admin")
                    .wrap(JwtAuthMiddleware)
                    .route("/stats", web::get().to(handlers::admin::stats))
                    .route("/users", web::get().to(handlers::admin::list_users))
                    .route("/users/{id}/role", web::put().to(handlers::admin::update_user_role))
                    .route("/users/{id}", web::delete().to(handlers::admin::delete_user))
                    .route("/posts", web::get().to(handlers::admin::list_posts)),
            );
        }
    }
}
