//! Embedded base64 image payloads decoded to files under the media root
//!
//! Binary content never enters the relational store: rows keep a relative
//! path like `recipes/01J....png` and the files are served under `/media`.

use crate::error::AppError;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::path::Path;
use ulid::Ulid;

/// Decode a `data:image/...;base64,` payload (or bare base64, defaulting to
/// PNG) and persist it under `<media_root>/<subdir>/`. Returns the relative
/// path stored on the owning row.
pub async fn save_base64_image(
    media_root: &Path,
    subdir: &str,
    payload: &str,
) -> Result<String, AppError> {
    let (extension, encoded) = split_data_url(payload)
        .ok_or_else(|| AppError::validation("image", "Unsupported image format."))?;

    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|_| AppError::validation("image", "Invalid base64 image payload."))?;

    if bytes.is_empty() {
        return Err(AppError::validation("image", "This field is required."));
    }

    let relative = format!("{subdir}/{}.{extension}", Ulid::new().to_string().to_lowercase());
    let target = media_root.join(&relative);

    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::Internal(format!("failed to create media dir: {e}")))?;
    }
    tokio::fs::write(&target, &bytes)
        .await
        .map_err(|e| AppError::Internal(format!("failed to write media file: {e}")))?;

    Ok(relative)
}

/// Remove a stored media file. A missing file is not an error: the row is
/// the source of truth and the delete is best-effort.
pub async fn delete_media(media_root: &Path, relative: &str) {
    let target = media_root.join(relative);
    if let Err(e) = tokio::fs::remove_file(&target).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %target.display(), error = %e, "Failed to delete media file");
        }
    }
}

/// Absolute URL for a stored media path
pub fn media_url(base_url: &str, relative: &str) -> String {
    format!("{}/media/{}", base_url.trim_end_matches('/'), relative)
}

/// Split `data:image/<subtype>;base64,<data>`. Bare base64 without a data
/// URL prefix is accepted and treated as PNG.
fn split_data_url(payload: &str) -> Option<(&'static str, &str)> {
    let Some(rest) = payload.strip_prefix("data:") else {
        return Some(("png", payload));
    };
    let (mime, encoded) = rest.split_once(";base64,")?;
    let extension = match mime {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => return None,
    };
    Some((extension, encoded))
}
