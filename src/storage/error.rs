use thiserror::Error;

/// An asset rejected before any bytes reach storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("file is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
    #[error("content type {content_type:?} is not an image")]
    NotAnImage { content_type: String },
}

/// A failure reported by the object store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("object already exists: {0}")]
    AlreadyExists(String),
    #[error("storage failure: {0}")]
    Other(String),
}

impl StorageError {
    /// Classify a backend error message.
    ///
    /// Hosted stores report policy rejections as "row level security"
    /// violations and name collisions as "already exists".
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("row level security")
            || lower.contains("permission")
            || lower.contains("unauthorized")
        {
            Self::PermissionDenied(message)
        } else if lower.contains("already exists") {
            Self::AlreadyExists(message)
        } else {
            Self::Other(message)
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(err.to_string()),
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists(err.to_string()),
            _ => Self::from_message(err.to_string()),
        }
    }
}

/// Why an upload did not produce a URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("an upload is already in progress")]
    Busy,
}

impl UploadError {
    /// Message suitable for showing to the person who picked the file.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(ValidationError::TooLarge { limit, .. }) => {
                format!("Images must be {} or smaller.", format_size(*limit))
            }
            Self::Validation(ValidationError::NotAnImage { .. }) => {
                "Please choose an image file.".to_string()
            }
            Self::Storage(StorageError::PermissionDenied(_)) => {
                "Upload failed: not authorized to store images. Sign in as an admin and try again."
                    .to_string()
            }
            Self::Storage(StorageError::AlreadyExists(_)) => {
                "An image with the same file name already exists.".to_string()
            }
            Self::Storage(StorageError::Other(message)) => format!("Upload failed: {message}"),
            Self::Busy => "An image is already uploading. Wait for it to finish.".to_string(),
        }
    }
}

fn format_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else if bytes >= 1024 && bytes % 1024 == 0 {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{bytes} bytes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_message_classifies_policy_rejection() {
        let err = StorageError::from_message("new row violates row level security policy");
        assert!(matches!(err, StorageError::PermissionDenied(_)));
    }

    #[test]
    fn test_from_message_classifies_collision() {
        let err = StorageError::from_message("The resource already exists");
        assert!(matches!(err, StorageError::AlreadyExists(_)));
    }

    #[test]
    fn test_from_io_error_uses_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(StorageError::from(io), StorageError::PermissionDenied(_)));
    }

    #[test]
    fn test_user_messages_distinguish_storage_failures() {
        let permission = UploadError::from(StorageError::PermissionDenied(String::new()));
        let collision = UploadError::from(StorageError::AlreadyExists(String::new()));
        let other = UploadError::from(StorageError::Other("disk full".to_string()));
        assert_ne!(permission.user_message(), collision.user_message());
        assert!(other.user_message().contains("disk full"));
    }

    #[test]
    fn test_too_large_message_names_the_limit() {
        let err = UploadError::from(ValidationError::TooLarge {
            size: 6 * 1024 * 1024,
            limit: 5 * 1024 * 1024,
        });
        assert_eq!(err.user_message(), "Images must be 5 MB or smaller.");
    }
}
