use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// Largest accepted upload, inclusive.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

static UNSAFE_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9.\-]").expect("file name pattern is valid"));

/// A file picked for upload, held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl AssetFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its content type from the extension.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self::new(name, guess_content_type(path), bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Check size and type against `limit`.
    ///
    /// # Errors
    /// Returns [`ValidationError`] when the file is over the limit or is not
    /// an image.
    pub fn validate(&self, limit: u64) -> Result<(), ValidationError> {
        if self.size() > limit {
            return Err(ValidationError::TooLarge {
                size: self.size(),
                limit,
            });
        }
        if !self.content_type.starts_with("image/") {
            return Err(ValidationError::NotAnImage {
                content_type: self.content_type.clone(),
            });
        }
        Ok(())
    }
}

/// Content type for a file path, from the image format table.
pub fn guess_content_type(path: &Path) -> String {
    if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
    {
        return "image/svg+xml".to_string();
    }
    image::ImageFormat::from_path(path)
        .map_or("application/octet-stream", |format| format.to_mime_type())
        .to_string()
}

/// Storage path for an upload: `<unix-millis>-<sanitized name>`.
///
/// Characters outside `[A-Za-z0-9.-]` become `-`, one per char.
pub fn asset_path(name: &str, timestamp_ms: i64) -> String {
    let sanitized = UNSAFE_NAME_CHARS.replace_all(name, "-");
    format!("{timestamp_ms}-{sanitized}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(size: usize) -> AssetFile {
        AssetFile::new("a.png", "image/png", vec![0; size])
    }

    #[test]
    fn test_validate_accepts_exact_limit() {
        assert!(png(1024).validate(1024).is_ok());
    }

    #[test]
    fn test_validate_rejects_one_byte_over() {
        let err = png(1025).validate(1024).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLarge {
                size: 1025,
                limit: 1024
            }
        );
    }

    #[test]
    fn test_validate_rejects_non_image_regardless_of_size() {
        let asset = AssetFile::new("notes.txt", "text/plain", vec![1, 2, 3]);
        assert!(matches!(
            asset.validate(MAX_UPLOAD_BYTES),
            Err(ValidationError::NotAnImage { .. })
        ));
    }

    #[test]
    fn test_asset_path_sanitizes_name() {
        assert_eq!(
            asset_path("my photo (1).JPG", 1_700_000_000_000),
            "1700000000000-my-photo--1-.JPG"
        );
    }

    #[test]
    fn test_asset_path_replaces_each_non_ascii_char() {
        assert_eq!(asset_path("写真.png", 5), "5---.png");
    }

    #[test]
    fn test_guess_content_type_from_extension() {
        assert_eq!(guess_content_type(Path::new("x.png")), "image/png");
        assert_eq!(guess_content_type(Path::new("x.JPEG")), "image/jpeg");
        assert_eq!(guess_content_type(Path::new("x.svg")), "image/svg+xml");
        assert_eq!(
            guess_content_type(Path::new("x.txt")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_from_path_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.gif");
        std::fs::write(&path, b"GIF89a").unwrap();
        let asset = AssetFile::from_path(&path).unwrap();
        assert_eq!(asset.name(), "pic.gif");
        assert_eq!(asset.content_type(), "image/gif");
        assert_eq!(asset.size(), 6);
    }
}
