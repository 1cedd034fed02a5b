use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use serde::Serialize;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::services::storage;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub image_url: String,
}

/// POST /api/posts/upload-image
///
/// Accepts one multipart field named `image`. The stored URL is returned
/// for the client to attach to a post.
pub async fn upload_image(
    config: web::Data<Config>,
    _auth: AuthUser,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    while let Some(field) = payload.next().await {
        let mut field =
            field.map_err(|e| AppError::Validation(format!("Malformed multipart body: {}", e)))?;

        if field.name() != "image" {
            // Drain unrelated fields so the stream stays consumable.
            while field.next().await.is_some() {}
            continue;
        }

        let content_type = field.content_type().essence_str().to_string();

        // Reject unsupported types before buffering any bytes.
        if storage::extension_for(&content_type).is_none() {
            return Err(AppError::Validation(format!(
                "Unsupported image type: {}",
                content_type
            )));
        }

        let max_bytes = config.upload.max_bytes;
        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?;
            if bytes.len() + chunk.len() > max_bytes {
                return Err(AppError::Validation(format!(
                    "Image exceeds the {} byte limit",
                    max_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(AppError::Validation("Empty image upload".to_string()));
        }

        let filename = storage::store(&config.upload.dir, &content_type, &bytes).await?;

        tracing::info!(filename = %filename, size = bytes.len(), "image stored");

        return Ok(HttpResponse::Created().json(UploadResponse {
            message: "Image uploaded successfully".to_string(),
            image_url: format!("{}/uploads/{}", config.app.base_url, filename),
        }));
    }

    Err(AppError::Validation("No image field in upload".to_string()))
}

/// GET /uploads/{filename}
pub async fn serve_upload(
    config: web::Data<Config>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let filename = path.into_inner();
    let bytes = storage::load(&config.upload.dir, &filename).await?;

    Ok(HttpResponse::Ok()
        .content_type(storage::content_type_for(&filename))
        .body(bytes))
}
