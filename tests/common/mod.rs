//! Shared setup for database-backed tests. These run against the
//! database named by DATABASE_URL and are gated behind the `db_tests`
//! cargo feature.

use sqlx::PgPool;
use uuid::Uuid;

use chronicle::db::{create_pool, run_migrations, user_repo};
use chronicle::models::{PostStatus, User};

pub async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for db tests");
    let pool = create_pool(&url, 5).await.expect("failed to connect");
    run_migrations(&pool).await.expect("failed to migrate");
    pool
}

/// A fresh user with unique username/email per call.
pub async fn seed_user(pool: &PgPool) -> User {
    let tag = Uuid::new_v4().simple().to_string();
    user_repo::create_user(
        pool,
        &format!("user_{}", &tag[..12]),
        &format!("{}@test.invalid", &tag[..12]),
        "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$AAAAAAAAAAAAAAAAAAAAAA",
        None,
    )
    .await
    .expect("failed to seed user")
}

pub async fn seed_post(pool: &PgPool, author: &User) -> chronicle::models::Post {
    chronicle::db::post_repo::create_post(
        pool,
        author.id,
        "A seeded post",
        "Body text",
        None,
        &[],
        PostStatus::Published,
    )
    .await
    .expect("failed to seed post")
}
