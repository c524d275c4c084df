//! On-disk layout for uploaded PDFs and their extracted text mirrors.
//!
//! ```text
//! UPLOAD_DIR/<directory>/<filename>
//! EXTRACTED_TEXT_DIR/<directory>/<stem>.txt
//! ```
//!
//! `directory` is caller-supplied and may be empty or nested (`course/week1`).
//! Path components are validated so nothing escapes the two roots.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_UPLOAD_DIR: &str = "uploaded_files";
pub const DEFAULT_EXTRACTED_TEXT_DIR: &str = "extracted_texts";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("invalid directory: {0:?}")]
    InvalidDirectory(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Roots of the two trees.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub extracted_text_dir: PathBuf,
}

impl StorageConfig {
    /// Reads `UPLOAD_DIR` and `EXTRACTED_TEXT_DIR`, falling back to the defaults.
    pub fn from_env() -> Self {
        let read = |name: &str, default: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            upload_dir: PathBuf::from(read("UPLOAD_DIR", DEFAULT_UPLOAD_DIR)),
            extracted_text_dir: PathBuf::from(read(
                "EXTRACTED_TEXT_DIR",
                DEFAULT_EXTRACTED_TEXT_DIR,
            )),
        }
    }
}

/// Where an upload landed, with the normalised names actually used on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub path: PathBuf,
    /// Last path segment of the client file name.
    pub filename: String,
    /// Relative directory joined with `/`; empty for the root.
    pub directory: String,
}

/// Persists uploads and text mirrors under a [`StorageConfig`].
#[derive(Debug, Clone)]
pub struct DocumentStorage {
    cfg: StorageConfig,
}

impl DocumentStorage {
    pub fn new(cfg: StorageConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.cfg
    }

    /// Writes the raw upload to `UPLOAD_DIR/<directory>/<filename>`.
    ///
    /// An existing file with the same name is overwritten.
    pub async fn save_upload(
        &self,
        directory: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<StoredUpload, StorageError> {
        let name = sanitize_file_name(filename)?;
        let rel = sanitize_directory(directory)?;
        let dir = self.cfg.upload_dir.join(&rel);
        let path = dir.join(name);

        create_dir(&dir).await?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;

        info!(path = %path.display(), bytes = bytes.len(), "upload stored");
        Ok(StoredUpload {
            path,
            filename: name.to_string(),
            directory: rel
                .iter()
                .map(|seg| seg.to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
        })
    }

    /// Writes `pages` joined by a blank line to
    /// `EXTRACTED_TEXT_DIR/<directory>/<stem>.txt`.
    pub async fn save_text_mirror(
        &self,
        directory: &str,
        filename: &str,
        pages: &[String],
    ) -> Result<PathBuf, StorageError> {
        let name = sanitize_file_name(filename)?;
        let stem = Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| StorageError::InvalidFileName(filename.to_string()))?;

        let dir = self
            .cfg
            .extracted_text_dir
            .join(sanitize_directory(directory)?);
        let path = dir.join(format!("{stem}.txt"));

        create_dir(&dir).await?;
        tokio::fs::write(&path, pages.join("\n\n"))
            .await
            .map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), pages = pages.len(), "text mirror stored");
        Ok(path)
    }
}

async fn create_dir(dir: &Path) -> Result<(), StorageError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })
}

/// Keeps only the last path segment of a client-provided name.
fn sanitize_file_name(filename: &str) -> Result<&str, StorageError> {
    let last = filename
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .unwrap_or_default();
    if last.is_empty() || last == "." || last == ".." {
        return Err(StorageError::InvalidFileName(filename.to_string()));
    }
    Ok(last)
}

/// Accepts only plain relative segments (no `..`, no root, no prefix).
fn sanitize_directory(directory: &str) -> Result<PathBuf, StorageError> {
    let trimmed = directory.trim();
    let mut out = PathBuf::new();
    for comp in Path::new(trimmed).components() {
        match comp {
            Component::Normal(seg) => out.push(seg),
            Component::CurDir => {}
            _ => return Err(StorageError::InvalidDirectory(directory.to_string())),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(root: &Path) -> DocumentStorage {
        DocumentStorage::new(StorageConfig {
            upload_dir: root.join("uploads"),
            extracted_text_dir: root.join("texts"),
        })
    }

    #[tokio::test]
    async fn writes_upload_and_mirror_under_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let st = storage(tmp.path());

        let pdf = st
            .save_upload("course/week1", "notes.pdf", b"%PDF-1.4")
            .await
            .unwrap();
        assert_eq!(pdf.path, tmp.path().join("uploads/course/week1/notes.pdf"));
        assert_eq!(std::fs::read(&pdf.path).unwrap(), b"%PDF-1.4");

        let txt = st
            .save_text_mirror(
                "course/week1",
                "notes.pdf",
                &["page one".to_string(), "page two".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(txt, tmp.path().join("texts/course/week1/notes.txt"));
        assert_eq!(
            std::fs::read_to_string(&txt).unwrap(),
            "page one\n\npage two"
        );
    }

    #[tokio::test]
    async fn empty_directory_uses_root() {
        let tmp = tempfile::tempdir().unwrap();
        let st = storage(tmp.path());
        let pdf = st.save_upload("", "a.pdf", b"x").await.unwrap();
        assert_eq!(pdf.path, tmp.path().join("uploads/a.pdf"));
        assert_eq!(pdf.directory, "");
    }

    #[tokio::test]
    async fn stored_names_are_normalised() {
        let tmp = tempfile::tempdir().unwrap();
        let st = storage(tmp.path());
        let pdf = st
            .save_upload(" ./course//week1 ", "C:\\tmp\\x.pdf", b"x")
            .await
            .unwrap();
        assert_eq!(pdf.filename, "x.pdf");
        assert_eq!(pdf.directory, "course/week1");
        assert_eq!(pdf.path, tmp.path().join("uploads/course/week1/x.pdf"));
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let st = storage(tmp.path());
        assert!(matches!(
            st.save_upload("../outside", "a.pdf", b"x").await,
            Err(StorageError::InvalidDirectory(_))
        ));
        assert!(matches!(
            st.save_upload("", "..", b"x").await,
            Err(StorageError::InvalidFileName(_))
        ));
    }

    #[test]
    fn file_name_keeps_last_segment() {
        assert_eq!(sanitize_file_name("C:\\tmp\\x.pdf").unwrap(), "x.pdf");
        assert_eq!(sanitize_file_name("a/b/c.pdf").unwrap(), "c.pdf");
    }
}
