//! Compensation for blob writes made inside a failed transaction.

use std::sync::Arc;

use tracing::warn;

use crate::storage::BlobStore;

/// Tracks files written during a transaction and deletes them unless disarmed.
///
/// The happy path calls [`FileRollback::disarm`] after commit. Error paths
/// call [`FileRollback::unwind`] so cleanup finishes before the error is
/// returned. If the guard is dropped while still armed (the request future
/// was cancelled), deletion is spawned on the current runtime.
pub(crate) struct FileRollback<B: BlobStore> {
    blobs: Arc<B>,
    paths: Vec<String>,
}

impl<B: BlobStore> FileRollback<B> {
    pub(crate) fn new(blobs: Arc<B>) -> Self {
        Self {
            blobs,
            paths: Vec::new(),
        }
    }

    pub(crate) fn track(&mut self, path: String) {
        self.paths.push(path);
    }

    /// Keep every tracked file.
    pub(crate) fn disarm(mut self) {
        self.paths.clear();
    }

    /// Delete every tracked file. Failures are logged and skipped.
    pub(crate) async fn unwind(mut self) {
        let paths = std::mem::take(&mut self.paths);
        remove_all(self.blobs.as_ref(), paths).await;
    }
}

impl<B: BlobStore> Drop for FileRollback<B> {
    fn drop(&mut self) {
        if self.paths.is_empty() {
            return;
        }

        let paths = std::mem::take(&mut self.paths);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let blobs = Arc::clone(&self.blobs);
                handle.spawn(async move { remove_all(blobs.as_ref(), paths).await });
            }
            Err(_) => warn!(
                count = paths.len(),
                "Upload rollback dropped outside a runtime, files left in storage"
            ),
        }
    }
}

async fn remove_all<B: BlobStore>(blobs: &B, paths: Vec<String>) {
    for path in paths {
        if let Err(e) = blobs.delete(&path).await {
            warn!(path = %path, error = %e, "Failed to remove file during rollback");
        }
    }
}
