//! Image uploads for article bodies and thumbnails.
//!
//! Files are validated before any write, stored under a collision-resistant
//! name and referenced afterwards only by their public URL.

mod asset;
mod error;
mod store;
mod upload;

pub use asset::{AssetFile, MAX_UPLOAD_BYTES, asset_path, guess_content_type};
pub use error::{StorageError, UploadError, ValidationError};
pub use store::{
    CONTENT_BUCKET, LocalObjectStore, MemoryObjectStore, ObjectStore, StoredObject,
    THUMBNAIL_BUCKET,
};
pub use upload::{UploadedAsset, Uploader, unix_millis, upload_asset};
