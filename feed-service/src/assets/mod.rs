/// Uploaded-image lifecycle.
///
/// Accepted files land in the upload directory under a timestamped name and
/// are referenced by posts through a public `/image/...` path. Replacing or
/// deleting a post reconciles the superseded file; the reserved placeholder
/// is never deleted, and a deletion failure never fails the caller.
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::config::AssetConfig;
use crate::error::{AppError, Result};

/// Content types accepted at the upload boundary.
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/png", "image/jpg", "image/jpeg"];

#[derive(Clone)]
pub struct AssetStore {
    upload_dir: PathBuf,
    public_base: String,
    placeholder: String,
}

impl AssetStore {
    pub fn new(config: &AssetConfig) -> Self {
        Self {
            upload_dir: PathBuf::from(&config.upload_dir),
            public_base: config.public_base.trim_end_matches('/').to_string(),
            placeholder: config.placeholder.clone(),
        }
    }

    /// The reserved asset used when a post carries no upload.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn accepts(content_type: &str) -> bool {
        ALLOWED_IMAGE_TYPES.contains(&content_type)
    }

    /// Store an uploaded file and return its public path.
    ///
    /// Disallowed content types are excluded silently (`Ok(None)`), so a
    /// request without a usable file still proceeds and resolves to the
    /// placeholder downstream.
    pub async fn store(
        &self,
        original_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<Option<String>> {
        if !Self::accepts(content_type) {
            tracing::debug!(%content_type, "rejected upload content type");
            return Ok(None);
        }

        let file_name = timestamped_name(original_name);

        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|e| AppError::Upstream(format!("failed to create upload dir: {}", e)))?;
        tokio::fs::write(self.upload_dir.join(&file_name), bytes)
            .await
            .map_err(|e| AppError::Upstream(format!("failed to store upload: {}", e)))?;

        Ok(Some(format!("{}/{}", self.public_base, file_name)))
    }

    /// Reconcile a superseded image path.
    ///
    /// Deletes the file backing `old` when the post has moved to a different
    /// path. The placeholder is never deleted, and failures are downgraded
    /// to a log line - a dangling file must not fail the mutation that
    /// replaced it.
    pub async fn reconcile(&self, old: &str, new: &str) {
        if old == new || old == self.placeholder {
            return;
        }

        if let Err(e) = self.delete(old).await {
            tracing::warn!(path = %old, "failed to remove superseded asset: {}", e);
        }
    }

    async fn delete(&self, public_path: &str) -> std::io::Result<()> {
        let Some(file_name) = self.file_name(public_path) else {
            tracing::debug!(path = %public_path, "skipping deletion of foreign asset path");
            return Ok(());
        };

        match tokio::fs::remove_file(self.upload_dir.join(file_name)).await {
            Ok(()) => Ok(()),
            // Already gone counts as success
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Map a public path back to its file name inside the upload directory.
    fn file_name<'a>(&self, public_path: &'a str) -> Option<&'a str> {
        let rest = public_path.strip_prefix(&self.public_base)?;
        let name = rest.strip_prefix('/')?;
        if name.is_empty() || name.contains('/') || name.contains("..") {
            return None;
        }
        Some(name)
    }
}

/// `{basename}-{millis}{ext}`; the timestamp keeps repeated uploads of the
/// same file from colliding.
fn timestamped_name(original_name: &str) -> String {
    let base = Path::new(original_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");

    let (stem, ext) = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (base, None),
    };

    let stem: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    let ts = Utc::now().timestamp_millis();
    match ext {
        Some(ext) => format!("{}-{}.{}", stem, ts, ext),
        None => format!("{}-{}", stem, ts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssetConfig;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> AssetStore {
        AssetStore::new(&AssetConfig {
            upload_dir: dir.path().to_string_lossy().to_string(),
            public_base: "/image".to_string(),
            placeholder: "/image/dummy.png".to_string(),
        })
    }

    #[tokio::test]
    async fn test_store_accepts_allowed_types() {
        let dir = TempDir::new().unwrap();
        let assets = store(&dir);

        let path = assets
            .store("cat picture.png", "image/png", b"png-bytes")
            .await
            .unwrap()
            .expect("png should be stored");

        assert!(path.starts_with("/image/cat_picture-"));
        assert!(path.ends_with(".png"));

        let on_disk = dir.path().join(path.strip_prefix("/image/").unwrap());
        assert_eq!(tokio::fs::read(on_disk).await.unwrap(), b"png-bytes");
    }

    #[tokio::test]
    async fn test_store_excludes_disallowed_types_silently() {
        let dir = TempDir::new().unwrap();
        let assets = store(&dir);

        let result = assets
            .store("notes.txt", "text/plain", b"hello")
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_reconcile_deletes_superseded_file() {
        let dir = TempDir::new().unwrap();
        let assets = store(&dir);

        let old = assets
            .store("old.png", "image/png", b"old")
            .await
            .unwrap()
            .unwrap();
        let on_disk = dir.path().join(old.strip_prefix("/image/").unwrap());
        assert!(on_disk.exists());

        assets.reconcile(&old, "/image/new-1.png").await;
        assert!(!on_disk.exists());
    }

    #[tokio::test]
    async fn test_reconcile_skips_placeholder_and_same_path() {
        let dir = TempDir::new().unwrap();
        let assets = store(&dir);

        // Same path: nothing to do
        let kept = assets
            .store("keep.png", "image/png", b"keep")
            .await
            .unwrap()
            .unwrap();
        assets.reconcile(&kept, &kept).await;
        assert!(dir
            .path()
            .join(kept.strip_prefix("/image/").unwrap())
            .exists());

        // Placeholder is never deleted even when superseded
        assets.reconcile("/image/dummy.png", "/image/other.png").await;
    }

    #[tokio::test]
    async fn test_reconcile_tolerates_missing_file() {
        let dir = TempDir::new().unwrap();
        let assets = store(&dir);

        // Must not panic or surface an error
        assets
            .reconcile("/image/already-gone.png", "/image/new.png")
            .await;
    }

    #[test]
    fn test_timestamped_name_shape() {
        let name = timestamped_name("holiday photo.jpeg");
        assert!(name.starts_with("holiday_photo-"));
        assert!(name.ends_with(".jpeg"));

        let bare = timestamped_name("README");
        assert!(bare.starts_with("README-"));
    }
}
