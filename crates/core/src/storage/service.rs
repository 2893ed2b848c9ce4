//! Storage service implementation using Apache OpenDAL.

use std::future::Future;

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};
use tracing::debug;
use uuid::Uuid;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// A file to be written under a storage prefix.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Directory-like prefix, e.g. `attachments/{post_id}`.
    pub prefix: String,
    /// Original client filename. Only its extension reaches the key.
    pub filename: String,
    /// Content type (MIME type).
    pub content_type: String,
    /// File content.
    pub bytes: Bytes,
}

impl UploadRequest {
    /// File size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Path-addressed blob store used by the post workflow.
///
/// Implemented by [`StorageService`]; tests substitute in-memory fakes.
pub trait BlobStore: Send + Sync + 'static {
    /// Write a file under the request prefix and return its stored path.
    fn store(
        &self,
        request: &UploadRequest,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;

    /// Read the full content of a stored file.
    fn read(&self, path: &str) -> impl Future<Output = Result<Bytes, StorageError>> + Send;

    /// Delete a stored file. Deleting a missing file succeeds.
    fn delete(&self, path: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Delete every file under a prefix, returning how many were removed.
    fn delete_prefix(
        &self,
        prefix: &str,
    ) -> impl Future<Output = Result<usize, StorageError>> + Send;
}

/// Storage service for attachment files.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::Memory => Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish(),
        };

        Ok(operator)
    }

    /// Validate an upload against config constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if file size or MIME type is invalid.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_file_size {
            return Err(StorageError::file_too_large(
                size,
                self.config.max_file_size,
            ));
        }

        if !self.config.is_mime_type_allowed(content_type) {
            return Err(StorageError::invalid_mime_type(content_type));
        }

        Ok(())
    }

    /// Generate a fresh storage key for an upload.
    ///
    /// Format: `{prefix}/{random}.{ext}`. The extension comes from the
    /// sanitized client filename and is dropped when there is none.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` for empty, absolute or parent-relative prefixes.
    pub fn generate_storage_key(req: &UploadRequest) -> Result<String, StorageError> {
        let prefix = req.prefix.trim_end_matches('/');
        if prefix.is_empty()
            || prefix.starts_with('/')
            || prefix.split('/').any(|segment| segment == ".." || segment.is_empty())
        {
            return Err(StorageError::InvalidKey(req.prefix.clone()));
        }

        let name = Uuid::new_v4().simple();
        let key = match file_extension(&req.filename) {
            Some(ext) => format!("{prefix}/{name}.{ext}"),
            None => format!("{prefix}/{name}"),
        };

        Ok(key)
    }

    /// Whether a file is stored under `key`. Backend failures are returned, not read as "missing".
    pub async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        self.operator.exists(key).await.map_err(StorageError::from)
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

impl BlobStore for StorageService {
    async fn store(&self, request: &UploadRequest) -> Result<String, StorageError> {
        self.validate_upload(&request.content_type, request.size())?;

        let key = Self::generate_storage_key(request)?;
        self.operator
            .write(&key, request.bytes.clone())
            .await
            .map_err(StorageError::from)?;

        debug!(key = %key, size = request.size(), "Stored file");
        Ok(key)
    }

    async fn read(&self, path: &str) -> Result<Bytes, StorageError> {
        let buffer = self.operator.read(path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StorageError::not_found(path)
            } else {
                StorageError::from(e)
            }
        })?;

        Ok(buffer.to_bytes())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.operator.delete(path).await.map_err(StorageError::from)
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, StorageError> {
        let dir = format!("{}/", prefix.trim_end_matches('/'));

        let entries = match self.operator.list_with(&dir).recursive(true).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        for entry in entries {
            if entry.metadata().is_file() {
                self.operator
                    .delete(entry.path())
                    .await
                    .map_err(StorageError::from)?;
                removed += 1;
            }
        }

        debug!(prefix = %dir, removed, "Deleted files under prefix");
        Ok(removed)
    }
}

/// Sanitize filename for storage key.
///
/// Removes or replaces characters that could cause issues in storage paths.
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Lowercased extension of the sanitized filename, if it has a usable one.
fn file_extension(filename: &str) -> Option<String> {
    let sanitized = sanitize_filename(filename);
    let (stem, ext) = sanitized.rsplit_once('.')?;

    let usable = !stem.is_empty()
        && !ext.is_empty()
        && ext.len() <= 10
        && ext.chars().all(|c| c.is_ascii_alphanumeric());

    usable.then(|| ext.to_ascii_lowercase())
}
