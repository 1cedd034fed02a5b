//! Local media storage. The rest of the service only sees opaque
//! filenames and URLs, so this collaborator can be swapped for object
//! storage without touching the handlers.

use std::path::{Path, PathBuf};

use rand::Rng;

use crate::error::{AppError, Result};

/// MIME types accepted for image ingestion, with their stored extension.
const ALLOWED_IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

/// Extension for an accepted image content type, or None if not allowed.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    ALLOWED_IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
}

/// Content type to serve a stored file under, from its extension.
pub fn content_type_for(filename: &str) -> &'static str {
    match Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
    {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Reject anything that could escape the upload directory.
pub fn sanitize_filename(name: &str) -> Option<&str> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.starts_with('.')
    {
        None
    } else {
        Some(name)
    }
}

/// Random 16-byte hex name keeping the given extension.
pub fn random_filename(extension: &str) -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    format!("{}.{}", hex::encode(bytes), extension)
}

pub async fn ensure_dir(dir: &str) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create upload dir {}: {}", dir, e)))
}

/// Persist uploaded bytes; returns the stored filename.
pub async fn store(dir: &str, content_type: &str, bytes: &[u8]) -> Result<String> {
    let extension = extension_for(content_type).ok_or_else(|| {
        AppError::Validation(format!("Unsupported image type: {}", content_type))
    })?;

    let filename = random_filename(extension);
    let path = PathBuf::from(dir).join(&filename);

    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store upload: {}", e)))?;

    Ok(filename)
}

/// Read a stored file back; NotFound when the name is unknown.
pub async fn load(dir: &str, filename: &str) -> Result<Vec<u8>> {
    let safe_name =
        sanitize_filename(filename).ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

    let path = PathBuf::from(dir).join(safe_name);

    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::NotFound("File not found".to_string()))
        }
        Err(e) => Err(AppError::Internal(format!("Failed to read upload: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_mapping() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("video/mp4"), None);
        assert_eq!(extension_for("text/html"), None);
    }

    #[test]
    fn test_content_type_roundtrip() {
        assert_eq!(content_type_for("a.jpg"), "image/jpeg");
        assert_eq!(content_type_for("a.webp"), "image/webp");
        assert_eq!(content_type_for("a.bin"), "application/octet-stream");
    }

    #[test]
    fn test_sanitize_rejects_traversal() {
        assert!(sanitize_filename("../etc/passwd").is_none());
        assert!(sanitize_filename("a/b.png").is_none());
        assert!(sanitize_filename("a\\b.png").is_none());
        assert!(sanitize_filename(".hidden").is_none());
        assert!(sanitize_filename("").is_none());
        assert_eq!(sanitize_filename("abc123.png"), Some("abc123.png"));
    }

    #[test]
    fn test_random_filenames_differ() {
        let a = random_filename("png");
        let b = random_filename("png");
        assert_ne!(a, b);
        assert!(a.ends_with(".png"));
        assert_eq!(a.len(), 32 + 4);
    }

    #[tokio::test]
    async fn test_store_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let dir_str = dir.path().to_str().unwrap();

        let name = store(dir_str, "image/png", b"not-really-a-png")
            .await
            .unwrap();
        let bytes = load(dir_str, &name).await.unwrap();
        assert_eq!(bytes, b"not-really-a-png");

        assert!(store(dir_str, "application/zip", b"zip").await.is_err());
        assert!(load(dir_str, "missing.png").await.is_err());
    }
}
