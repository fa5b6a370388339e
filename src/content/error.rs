use std::io;

use thiserror::Error;

/// Failures of content queries and writes.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("slug `{0}` is already in use")]
    DuplicateSlug(String),
    #[error("admin access required")]
    Forbidden,
    #[error("{0}")]
    Invalid(String),
    #[error("content store I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("content store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ContentError {
    /// Message suitable for showing next to a form.
    pub fn user_message(&self) -> String {
        match self {
            Self::DuplicateSlug(_) => "This slug is already in use.".to_string(),
            Self::Forbidden => "You do not have permission to change content.".to_string(),
            Self::Invalid(message) => message.clone(),
            Self::NotFound(what) => format!("The {what} no longer exists."),
            Self::Io(_) | Self::Json(_) => "Saving failed. Please try again.".to_string(),
        }
    }
}
