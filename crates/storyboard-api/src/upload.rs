//! Multipart upload handling.
//!
//! Uploaded audio is buffered to the upload directory under a random name,
//! forwarded to the provider, then deleted. Deletion must happen exactly
//! once on every exit path; `TempUpload` owns that contract — `remove`
//! consumes the guard, and `Drop` covers paths that never reach it.
//! Deletion failures are logged, never propagated.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use uuid::Uuid;

use storyboard_core::error::DomainError;

/// A file buffered to disk for the duration of one request.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    original_name: Option<String>,
    armed: bool,
}

impl TempUpload {
    /// Buffer `bytes` to a fresh random file under `dir`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` when the directory or file
    /// cannot be written.
    pub async fn write(
        dir: &Path,
        original_name: Option<String>,
        bytes: &[u8],
    ) -> Result<Self, DomainError> {
        tokio::fs::create_dir_all(dir).await.map_err(|err| {
            DomainError::Infrastructure(format!("creating upload dir {}: {err}", dir.display()))
        })?;
        let path = dir.join(Uuid::new_v4().to_string());
        tokio::fs::write(&path, bytes).await.map_err(|err| {
            DomainError::Infrastructure(format!("writing upload {}: {err}", path.display()))
        })?;
        Ok(Self {
            path,
            original_name,
            armed: true,
        })
    }

    /// Path of the buffered file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name the file was uploaded under, when the client sent one.
    #[must_use]
    pub fn original_name(&self) -> Option<&str> {
        self.original_name.as_deref()
    }

    /// Delete the buffered file. Consumes the guard, so the file cannot be
    /// deleted twice.
    pub async fn remove(mut self) {
        self.armed = false;
        if let Err(err) = tokio::fs::remove_file(&self.path).await {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to remove temporary upload");
        }
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if self.armed {
            if let Err(err) = std::fs::remove_file(&self.path) {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to remove temporary upload");
            }
        }
    }
}

/// Parsed multipart form: at most one buffered file plus the text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    /// The `file` part, when present.
    pub file: Option<TempUpload>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// A non-empty text field, by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Read an entire multipart body: the `file` part is buffered to
/// `upload_dir`, every other part is collected as a text field.
///
/// # Errors
///
/// Returns `DomainError::Validation` for malformed multipart bodies and
/// `DomainError::Infrastructure` when buffering fails.
pub async fn collect(upload_dir: &Path, mut multipart: Multipart) -> Result<UploadForm, DomainError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let original_name = field.file_name().map(ToString::to_string);
            let bytes = field.bytes().await.map_err(bad_multipart)?;
            form.file = Some(TempUpload::write(upload_dir, original_name, &bytes).await?);
        } else {
            let value = field.text().await.map_err(bad_multipart)?;
            form.fields.insert(name, value);
        }
    }
    Ok(form)
}

fn bad_multipart(err: MultipartError) -> DomainError {
    DomainError::Validation(format!("invalid multipart body: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_remove_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let upload = TempUpload::write(dir.path(), Some("clip.wav".to_string()), b"RIFF")
            .await
            .unwrap();
        let path = upload.path().to_owned();
        assert!(path.exists());
        assert_eq!(upload.original_name(), Some("clip.wav"));

        upload.remove().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_drop_deletes_file_when_remove_was_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let upload = TempUpload::write(dir.path(), None, b"data").await.unwrap();
            upload.path().to_owned()
        };
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_concurrent_uploads_get_distinct_paths() {
        let dir = tempfile::tempdir().unwrap();
        let a = TempUpload::write(dir.path(), None, b"a").await.unwrap();
        let b = TempUpload::write(dir.path(), None, b"b").await.unwrap();
        assert_ne!(a.path(), b.path());
        a.remove().await;
        assert!(b.path().exists());
        b.remove().await;
    }
}
