use std::path::{Path, PathBuf};

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;

pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_EXTENSION: &str = ".jpg";

/// An image file pulled out of a multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Validates and writes the upload under `upload_dir`, returning the stored path.
pub async fn save_image(upload: &ImageUpload, upload_dir: &str) -> Result<String, AppError> {
    let is_image = upload
        .content_type
        .as_deref()
        .map(|ct| ct.starts_with("image/"))
        .unwrap_or(false);
    if !is_image {
        return Err(AppError::Upload("invalid file type, only images are accepted".to_string()));
    }

    if upload.bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::Upload("file exceeds the 10MB limit".to_string()));
    }

    let file_name = format!(
        "{}{}",
        Uuid::new_v4(),
        extension_for(upload.file_name.as_deref())
    );

    tokio::fs::create_dir_all(upload_dir).await?;
    let path: PathBuf = Path::new(upload_dir).join(file_name);
    tokio::fs::write(&path, &upload.bytes).await?;

    let stored = path.to_string_lossy().into_owned();
    info!("🖼️ Stored image {} ({} bytes)", stored, upload.bytes.len());
    Ok(stored)
}

/// Best-effort removal; a missing or locked file is only logged. Returns
/// whether a file was actually deleted.
pub async fn remove_image(image_path: &str) -> bool {
    if image_path.is_empty() {
        return false;
    }
    match tokio::fs::remove_file(image_path).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to remove image file {}: {}", image_path, e);
            false
        }
    }
}

/// Public URL for a stored image path; empty for records without an image.
pub fn image_url(image_path: &str) -> String {
    if image_path.is_empty() {
        return String::new();
    }
    let url = image_path.replace('\\', "/");
    if url.starts_with('/') {
        url
    } else {
        format!("/{}", url)
    }
}

fn extension_for(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}
