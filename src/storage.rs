//! Image storage for banners and service photos. Files land in the upload
//! directory under a fresh id and are served back from `/uploads`.

use std::path::Path;

use crate::{
    auth::new_id,
    error::{AppError, AppResult},
};

pub const PUBLIC_PREFIX: &str = "/uploads";

fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

pub fn public_url(file_name: &str) -> String {
    format!("{PUBLIC_PREFIX}/{file_name}")
}

/// Writes `bytes` and returns the public URL of the stored file.
pub async fn upload(
    dir: &Path,
    bytes: &[u8],
    content_type: Option<&str>,
    max_bytes: usize,
) -> AppResult<String> {
    let Some(extension) = content_type.and_then(extension_for) else {
        return Err(AppError::invalid(
            "file",
            "Only JPEG, PNG, WebP or GIF images can be uploaded",
        ));
    };
    if bytes.is_empty() {
        return Err(AppError::invalid("file", "Upload is empty"));
    }
    if bytes.len() > max_bytes {
        return Err(AppError::invalid(
            "file",
            format!("Upload exceeds the {max_bytes} byte limit"),
        ));
    }

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(AppError::storage("Error uploading image"))?;

    let file_name = format!("{}.{extension}", new_id());
    tokio::fs::write(dir.join(&file_name), bytes)
        .await
        .map_err(AppError::storage("Error uploading image"))?;

    log::info!("Stored upload {file_name} ({} bytes)", bytes.len());
    Ok(public_url(&file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types_map_to_extensions() {
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("IMAGE/JPEG; charset=binary"), Some("jpg"));
        assert_eq!(extension_for("application/pdf"), None);
    }

    #[actix_web::test]
    async fn upload_writes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let url = upload(dir.path(), b"\x89PNG....", Some("image/png"), 1024)
            .await
            .unwrap();

        let name = url.strip_prefix("/uploads/").unwrap();
        assert!(name.ends_with(".png"));
        let stored = std::fs::read(dir.path().join(name)).unwrap();
        assert_eq!(stored, b"\x89PNG....");
    }

    #[actix_web::test]
    async fn upload_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        assert!(upload(dir.path(), b"", Some("image/png"), 1024).await.is_err());
        assert!(upload(dir.path(), b"data", Some("text/plain"), 1024).await.is_err());
        assert!(upload(dir.path(), b"data", None, 1024).await.is_err());
        assert!(upload(dir.path(), &[0u8; 2048], Some("image/gif"), 1024).await.is_err());
    }
}
