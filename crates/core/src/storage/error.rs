//! Errors raised by the attachment blob store.

use thiserror::Error;

/// Failure of a blob store operation.
///
/// The first three variants reject a specific upload and are the caller's
/// fault; the rest come from the backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Attachment is over the per-file limit.
    #[error("attachment is {size} bytes, limit is {max} bytes")]
    FileTooLarge {
        /// Uploaded size.
        size: u64,
        /// Configured limit.
        max: u64,
    },

    /// Attachment type is not on the allow list.
    #[error("attachments of type '{mime_type}' are not accepted")]
    InvalidMimeType {
        /// Declared content type of the upload.
        mime_type: String,
    },

    /// Key prefix is empty or escapes the storage root.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// No blob stored under the key.
    #[error("no stored file at {key}")]
    NotFound {
        /// Key or backend message.
        key: String,
    },

    /// Backend refused access.
    #[error("storage backend denied access: {0}")]
    PermissionDenied(String),

    /// Backend could not be built from settings.
    #[error("storage backend misconfigured: {0}")]
    Configuration(String),

    /// Any other backend failure.
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    /// Size limit exceeded.
    #[must_use]
    pub fn file_too_large(size: u64, max: u64) -> Self {
        Self::FileTooLarge { size, max }
    }

    /// Content type refused.
    #[must_use]
    pub fn invalid_mime_type(mime_type: impl Into<String>) -> Self {
        Self::InvalidMimeType {
            mime_type: mime_type.into(),
        }
    }

    /// Missing blob.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Bad backend settings.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Generic backend failure.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    /// True when the upload itself was refused, as opposed to a backend fault.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::FileTooLarge { .. } | Self::InvalidMimeType { .. } | Self::InvalidKey(_)
        )
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        let message = err.to_string();
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound { key: message },
            opendal::ErrorKind::PermissionDenied => Self::PermissionDenied(message),
            opendal::ErrorKind::ConfigInvalid => Self::Configuration(message),
            _ => Self::Operation(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_are_client_errors() {
        assert!(StorageError::file_too_large(11, 10).is_rejection());
        assert!(StorageError::invalid_mime_type("text/html").is_rejection());
        assert!(StorageError::InvalidKey("../etc".into()).is_rejection());
        assert!(!StorageError::operation("timeout").is_rejection());
        assert!(!StorageError::not_found("attachments/x").is_rejection());
    }

    #[test]
    fn test_opendal_kinds_are_mapped() {
        let missing = opendal::Error::new(opendal::ErrorKind::NotFound, "gone");
        assert!(matches!(
            StorageError::from(missing),
            StorageError::NotFound { .. }
        ));

        let denied = opendal::Error::new(opendal::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(
            StorageError::from(denied),
            StorageError::PermissionDenied(_)
        ));

        let other = opendal::Error::new(opendal::ErrorKind::Unexpected, "boom");
        assert!(matches!(StorageError::from(other), StorageError::Operation(_)));
    }

    #[test]
    fn test_limit_message_names_both_sizes() {
        let err = StorageError::file_too_large(2048, 1024);
        assert_eq!(err.to_string(), "attachment is 2048 bytes, limit is 1024 bytes");
    }
}
