use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::body::Bytes;
use tracing::{debug, warn};

use crate::{error::AppError, messages, models::MovieDraft};

/// An image buffered from the multipart body, not yet on disk.
#[derive(Clone, Debug)]
pub struct PendingUpload {
    pub field: String,
    pub original_name: String,
    pub bytes: Bytes,
}

/// Writes uploaded images into the directory that the static file server exposes.
#[derive(Clone, Debug)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Persists the upload and returns the stored basename.
    pub async fn save(&self, upload: &PendingUpload) -> anyhow::Result<String> {
        let name = stored_name(&upload.field, &upload.original_name);
        let path = self.dir.join(&name);
        tokio::fs::write(&path, &upload.bytes)
            .await
            .with_context(|| format!("writing upload {}", path.display()))?;
        debug!(file = %name, bytes = upload.bytes.len(), "stored upload");
        Ok(name)
    }

    /// Best-effort removal of files written for a request that later failed.
    pub async fn discard(&self, names: &[String]) {
        for name in names {
            if let Err(err) = tokio::fs::remove_file(self.dir.join(name)).await {
                warn!(file = %name, error = %err, "failed to remove orphaned upload");
            }
        }
    }
}

/// `{field}-{unix millis}-{random token}-{original name}`
pub fn stored_name(field: &str, original_name: &str) -> String {
    let millis = jiff::Timestamp::now().as_millisecond();
    let token = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{millis}-{}-{}", sanitize(field), &token[..9], sanitize(base_name(original_name)))
}

fn base_name(name: &str) -> &str {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("upload")
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect()
}

/// Orders `uploads` so that `result[i]` belongs to `drafts[i]`.
///
/// When every draft names an `imageKey`, uploads are matched on their
/// original filename. When none do, position decides.
pub fn pair_uploads(
    drafts: &[MovieDraft],
    mut uploads: Vec<PendingUpload>,
) -> Result<Vec<PendingUpload>, AppError> {
    if uploads.len() != drafts.len() {
        return Err(AppError::BadRequest(messages::IMAGE_COUNT_MISMATCH.to_string()));
    }

    let keyed = drafts.iter().filter(|d| d.image_key.is_some()).count();
    if keyed == 0 {
        return Ok(uploads);
    }
    if keyed != drafts.len() {
        return Err(AppError::BadRequest(messages::image_keys_incomplete()));
    }

    let mut paired = Vec::with_capacity(drafts.len());
    for key in drafts.iter().filter_map(|d| d.image_key.as_deref()) {
        let pos = uploads
            .iter()
            .position(|u| u.original_name == key)
            .ok_or_else(|| AppError::BadRequest(messages::image_key_mismatch(key)))?;
        paired.push(uploads.swap_remove(pos));
    }
    Ok(paired)
}
