use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;

/// GET /api/health
pub async fn health_check(pool: web::Data<PgPool>) -> impl Responder {
    let db_ok = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool.get_ref())
        .await
        .is_ok();

    let status = if db_ok { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(serde_json::json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": status,
        "database": if db_ok { "up" } else { "down" },
    }))
}
