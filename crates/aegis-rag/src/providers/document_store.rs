//! Document store for raw uploaded files

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Metadata about a stored document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocumentInfo {
    /// File name within the store
    pub filename: String,
    /// Location on disk
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
}

/// Trait for document storage
///
/// Implementations:
/// - `LocalDocumentStore`: local filesystem
#[async_trait]
pub trait DocumentStoreProvider: Send + Sync {
    /// Store a document under its file name, replacing any previous copy
    ///
    /// Returns the storage path
    async fn store_document(&self, filename: &str, data: &[u8]) -> Result<PathBuf>;

    /// List all stored documents
    async fn list_documents(&self) -> Result<Vec<StoredDocumentInfo>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Reduce an uploaded file name to a single safe path component
pub fn sanitize_filename(raw: &str) -> Result<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_control() { '_' } else { c })
        .collect();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return Err(Error::InvalidRequest(format!("invalid file name: {:?}", raw)));
    }

    Ok(cleaned)
}

/// Local document store using the filesystem
pub struct LocalDocumentStore {
    /// Directory to store documents
    storage_dir: PathBuf,
}

impl LocalDocumentStore {
    /// Create a new local document store
    pub fn new(storage_dir: impl Into<PathBuf>) -> Result<Self> {
        let storage_dir = storage_dir.into();
        std::fs::create_dir_all(&storage_dir)?;
        Ok(Self { storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn doc_path(&self, filename: &str) -> Result<PathBuf> {
        Ok(self.storage_dir.join(sanitize_filename(filename)?))
    }
}

#[async_trait]
impl DocumentStoreProvider for LocalDocumentStore {
    async fn store_document(&self, filename: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.doc_path(filename)?;
        tokio::fs::write(&path, data).await?;
        tracing::debug!("Stored {} ({} bytes) at {}", filename, data.len(), path.display());
        Ok(path)
    }

    async fn list_documents(&self) -> Result<Vec<StoredDocumentInfo>> {
        let mut docs = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.storage_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            docs.push(StoredDocumentInfo {
                filename: entry.file_name().to_string_lossy().to_string(),
                path: entry.path(),
                size: metadata.len(),
            });
        }

        docs.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(docs)
    }

    fn name(&self) -> &str {
        "local-filesystem"
    }
}
