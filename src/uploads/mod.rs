use std::path::Path;

use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Extensions accepted for catalog images.
const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Persist an uploaded image under `dir` with a fresh UUID name, returning
/// the public `/uploads/...` reference stored on the record. The original
/// file name contributes only its extension.
pub async fn save_image(dir: &Path, original_name: &str, bytes: &[u8]) -> AppResult<String> {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| AppError::BadRequest("image file must have an extension".to_string()))?;

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::BadRequest(format!(
            "unsupported image type: {} (allowed: {})",
            ext,
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    if bytes.is_empty() {
        return Err(AppError::BadRequest("image file is empty".to_string()));
    }

    tokio::fs::create_dir_all(dir).await?;

    let file_name = format!("{}.{}", Uuid::new_v4(), ext);
    tokio::fs::write(dir.join(&file_name), bytes).await?;

    Ok(format!("/uploads/{}", file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("sweetshop-uploads-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn saves_image_and_returns_public_path() {
        let dir = temp_dir();
        let reference = save_image(&dir, "kaju.png", b"fake-png-bytes").await.unwrap();

        assert!(reference.starts_with("/uploads/"));
        assert!(reference.ends_with(".png"));

        let file_name = reference.strip_prefix("/uploads/").unwrap();
        let on_disk = tokio::fs::read(dir.join(file_name)).await.unwrap();
        assert_eq!(on_disk, b"fake-png-bytes");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn normalizes_extension_case() {
        let dir = temp_dir();
        let reference = save_image(&dir, "photo.JPEG", b"bytes").await.unwrap();
        assert!(reference.ends_with(".jpeg"));
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_disallowed_extension() {
        let err = save_image(&temp_dir(), "payload.exe", b"bytes").await;
        assert!(matches!(err, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn rejects_missing_extension() {
        let err = save_image(&temp_dir(), "noext", b"bytes").await;
        assert!(matches!(err, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn rejects_empty_file() {
        let err = save_image(&temp_dir(), "empty.png", b"").await;
        assert!(matches!(err, Err(AppError::BadRequest(_))));
    }
}
