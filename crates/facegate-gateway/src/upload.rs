//! Transient staging of uploaded images

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::{pin_mut, Stream, StreamExt};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Content types the gateway accepts for face search
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Failures while staging an upload
#[derive(Error, Debug)]
pub enum UploadError {
    /// The multipart body carried no file field
    #[error("no file uploaded")]
    NoFile,

    /// The file's content type is not an accepted image type
    #[error("unsupported content type: {0}")]
    UnsupportedType(String),

    /// The file ran past the configured ceiling
    #[error("file exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    /// Reading the upload stream failed mid-flight
    #[error("upload stream failed: {0}")]
    Stream(String),

    /// Filesystem trouble under the staging directory
    #[error("staging failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A staged upload on disk, removed again when no longer needed.
///
/// Call [`remove`](Self::remove) once the file has been forwarded; the
/// `Drop` impl is a synchronous fallback for error paths that never get
/// there.
#[derive(Debug)]
pub struct StagedUpload {
    owner: String,
    path: PathBuf,
    file_name: String,
    content_type: String,
    size: u64,
    created_at: DateTime<Utc>,
    removed: bool,
}

impl StagedUpload {
    /// Identity subject the upload belongs to
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Location of the staged file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sanitized client file name
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Declared content type
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Bytes written to disk
    pub fn size(&self) -> u64 {
        self.size
    }

    /// When the upload was staged
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Delete the staged file, and the owner directory once its last
    /// file is gone
    pub async fn remove(mut self) -> std::io::Result<()> {
        self.removed = true;
        fs::remove_file(&self.path).await?;
        if let Some(parent) = self.path.parent() {
            // Fails while the owner still has other files staged
            let _ = fs::remove_dir(parent).await;
        }
        Ok(())
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    "Failed to clean staged upload {}: {}",
                    self.path.display(),
                    e
                );
            }
            return;
        }
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::remove_dir(parent);
        }
    }
}

/// Writes uploads into per-owner staging directories
pub struct UploadStager {
    dir: PathBuf,
    max_bytes: u64,
}

impl UploadStager {
    /// Create a stager rooted at `dir` with a per-file byte ceiling
    pub fn new(dir: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    /// Staging directory root
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Per-file byte ceiling
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Create the staging root if it does not exist yet
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    /// Stream an upload to disk, validating type and size on the way.
    ///
    /// Files land under `{root}/{owner}/{millis}-{name}` so concurrent
    /// uploads from different identities never collide and staged files
    /// stay attributable. On any failure the partially written file is
    /// already gone when the error returns.
    pub async fn stage<S, E>(
        &self,
        owner: &str,
        file_name: Option<&str>,
        content_type: Option<&str>,
        stream: S,
    ) -> Result<StagedUpload, UploadError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: std::fmt::Display,
    {
        let content_type = match content_type {
            Some(raw) => {
                // Parse so parameters like "; charset=binary" cannot
                // sneak a type past the allow list
                let parsed: mime::Mime = raw
                    .parse()
                    .map_err(|_| UploadError::UnsupportedType(raw.to_string()))?;
                let essence = parsed.essence_str().to_string();
                if !ALLOWED_IMAGE_TYPES.contains(&essence.as_str()) {
                    return Err(UploadError::UnsupportedType(essence));
                }
                essence
            }
            None => return Err(UploadError::UnsupportedType("unknown".to_string())),
        };

        let owner_dir = self.dir.join(sanitize_component(owner, "anonymous"));
        fs::create_dir_all(&owner_dir).await?;

        let created_at = Utc::now();
        let original = sanitize_filename(file_name.unwrap_or("upload.bin"));
        let path = owner_dir.join(format!("{}-{}", created_at.timestamp_millis(), original));

        // create_new so a same-millisecond name clash errors instead of
        // silently overwriting
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        let mut staged = StagedUpload {
            owner: owner.to_string(),
            path,
            file_name: original,
            content_type,
            size: 0,
            created_at,
            removed: false,
        };

        match write_stream(&mut file, stream, self.max_bytes).await {
            Ok(size) => {
                staged.size = size;
                Ok(staged)
            }
            Err(err) => {
                drop(file);
                remove_quietly(staged).await;
                Err(err)
            }
        }
    }
}

async fn write_stream<S, E>(file: &mut fs::File, stream: S, max_bytes: u64) -> Result<u64, UploadError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    pin_mut!(stream);
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| UploadError::Stream(e.to_string()))?;
        written += chunk.len() as u64;
        if written > max_bytes {
            return Err(UploadError::TooLarge { limit: max_bytes });
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    Ok(written)
}

async fn remove_quietly(staged: StagedUpload) {
    let path = staged.path().to_path_buf();
    if let Err(e) = staged.remove().await {
        tracing::warn!("Failed to clean staged upload {}: {}", path.display(), e);
    }
}

/// Strip path components and control characters from a client file name
pub fn sanitize_filename(name: &str) -> String {
    sanitize_component(name, "upload.bin")
}

fn sanitize_component(name: &str, fallback: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
