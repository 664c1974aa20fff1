//! Local filesystem implementation of `MediaStorage`.
//!
//! Uploads are sniffed with `image`, never trusted by their declared content
//! type, and written flat under the upload directory as
//! `<field>-<uuid>.<ext>`.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use image::ImageFormat;
use tokio::fs;
use uuid::Uuid;

use domains::{DomainError, MediaStorage, Result, StoredMedia, Upload};

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageKind {
    pub const ALL: [ImageKind; 4] = [Self::Jpeg, Self::Png, Self::Gif, Self::Webp];

    /// Parses a configured type name (`jpeg`, `jpg`, `png`, `gif`, `webp`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    fn sniff(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes).ok()? {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Gif => Some(Self::Gif),
            ImageFormat::WebP => Some(Self::Webp),
            _ => None,
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }
}

pub struct LocalMediaStorage {
    /// Directory files are written to (e.g. `./uploads`).
    root: PathBuf,
    /// Public prefix files are served under (e.g. `/uploads`).
    url_prefix: String,
    max_file_size: usize,
    allowed: Vec<ImageKind>,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>, max_file_size: usize) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_owned(),
            max_file_size,
            allowed: ImageKind::ALL.to_vec(),
        }
    }

    pub fn with_allowed(mut self, allowed: Vec<ImageKind>) -> Self {
        self.allowed = allowed;
        self
    }

    /// Maps a public path back to a file under `root`. Paths outside the
    /// prefix or containing separators are rejected.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let name = path.strip_prefix(&self.url_prefix)?.strip_prefix('/')?;
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return None;
        }
        Some(self.root.join(name))
    }
}

fn io_error(err: std::io::Error) -> DomainError {
    tracing::error!(error = %err, "media storage failed");
    DomainError::server("failed to store file")
}

/// Keeps field names usable as a file name prefix.
fn file_prefix(field: &str) -> String {
    let prefix: String = field
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if prefix.is_empty() {
        "file".to_owned()
    } else {
        prefix
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn store(&self, upload: Upload) -> Result<StoredMedia> {
        if upload.bytes.is_empty() {
            return Err(DomainError::validation("uploaded file is empty"));
        }
        if upload.bytes.len() > self.max_file_size {
            return Err(DomainError::validation(format!(
                "file exceeds the maximum size of {} bytes",
                self.max_file_size
            )));
        }
        let kind = ImageKind::sniff(&upload.bytes)
            .filter(|kind| self.allowed.contains(kind))
            .ok_or_else(|| DomainError::validation("only image files are allowed"))?;

        fs::create_dir_all(&self.root).await.map_err(io_error)?;
        let name = format!(
            "{}-{}.{}",
            file_prefix(&upload.field_name),
            Uuid::now_v7(),
            kind.extension()
        );
        fs::write(self.root.join(&name), &upload.bytes)
            .await
            .map_err(io_error)?;

        tracing::debug!(
            file = %name,
            original = upload.file_name.as_deref().unwrap_or_default(),
            size = upload.bytes.len(),
            "stored upload"
        );
        Ok(StoredMedia {
            path: format!("{}/{}", self.url_prefix, name),
            content_type: kind.content_type().to_owned(),
            size: upload.bytes.len() as u64,
        })
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let Some(file) = self.resolve(path) else {
            return Ok(());
        };
        match fs::remove_file(&file).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    fn upload(field: &str, bytes: &'static [u8]) -> Upload {
        Upload {
            field_name: field.into(),
            file_name: Some("photo.bin".into()),
            content_type: Some("application/octet-stream".into()),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[tokio::test]
    async fn stores_sniffed_images_under_the_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalMediaStorage::new(dir.path(), "/uploads/", 1024);

        let stored = storage.store(upload("images", PNG)).await.unwrap();

        assert!(stored.path.starts_with("/uploads/images-"));
        assert!(stored.path.ends_with(".png"));
        assert_eq!(stored.content_type, "image/png");
        assert_eq!(stored.size, PNG.len() as u64);
        let file = dir.path().join(stored.path.trim_start_matches("/uploads/"));
        assert_eq!(std::fs::read(file).unwrap(), PNG);
    }

    #[tokio::test]
    async fn rejects_non_images_and_oversized_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalMediaStorage::new(dir.path(), "/uploads", 8);

        let text = storage.store(upload("image", b"hello")).await.unwrap_err();
        assert!(matches!(text, DomainError::Validation(_)));

        let large = storage.store(upload("image", JPEG)).await.unwrap_err();
        assert!(matches!(large, DomainError::Validation(m) if m.contains("maximum size")));
    }

    #[tokio::test]
    async fn respects_the_allowed_list() {
        let dir = tempfile::tempdir().unwrap();
        let storage =
            LocalMediaStorage::new(dir.path(), "/uploads", 1024).with_allowed(vec![ImageKind::Png]);

        assert!(storage.store(upload("images", JPEG)).await.is_err());
        assert!(storage.store(upload("images", PNG)).await.is_ok());
    }

    #[tokio::test]
    async fn remove_deletes_and_ignores_unknown_paths() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalMediaStorage::new(dir.path(), "/uploads", 1024);
        let stored = storage.store(upload("image", JPEG)).await.unwrap();

        storage.remove(&stored.path).await.unwrap();
        storage.remove(&stored.path).await.unwrap();
        storage.remove("/elsewhere/file.png").await.unwrap();
        storage.remove("/uploads/../secret").await.unwrap();

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn type_names_parse() {
        assert_eq!(ImageKind::from_name(" JPG "), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_name("webp"), Some(ImageKind::Webp));
        assert_eq!(ImageKind::from_name("bmp"), None);
    }
}
