use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::StorageError;

/// Bucket for images embedded in article bodies.
pub const CONTENT_BUCKET: &str = "news-content";
/// Bucket for article thumbnails.
pub const THUMBNAIL_BUCKET: &str = "news-thumbnails";

/// Object storage for uploaded assets, scoped to one bucket.
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `path`. Must not overwrite an existing object and must
    /// leave nothing behind on failure.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the object cannot be stored.
    fn upload(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError>;

    /// Publicly reachable URL for `path`.
    fn public_url(&self, path: &str) -> String;
}

fn check_object_path(path: &str) -> Result<(), StorageError> {
    if path.is_empty() || path.contains(['/', '\\']) || path == "." || path == ".." {
        return Err(StorageError::Other(format!("invalid object path {path:?}")));
    }
    Ok(())
}

fn join_url(base: &str, bucket: &str, path: &str) -> String {
    format!("{}/{bucket}/{path}", base.trim_end_matches('/'))
}

/// Object store backed by a directory per bucket.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    dir: PathBuf,
    bucket: String,
    public_base: String,
}

impl LocalObjectStore {
    /// Store objects under `root/<bucket>`, served from `public_base/<bucket>`.
    pub fn new(root: impl Into<PathBuf>, bucket: impl Into<String>, public_base: impl Into<String>) -> Self {
        let bucket = bucket.into();
        Self {
            dir: root.into().join(&bucket),
            bucket,
            public_base: public_base.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_object(&self, target: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        let temp = self
            .dir
            .join(format!(".{}.part", uuid::Uuid::new_v4().simple()));
        let result = (|| {
            let mut file = OpenOptions::new().write(true).create_new(true).open(&temp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            fs::rename(&temp, target)
        })();
        if let Err(err) = result {
            let _ = fs::remove_file(&temp);
            let _ = fs::remove_file(target);
            return Err(StorageError::from(err));
        }
        Ok(())
    }
}

impl ObjectStore for LocalObjectStore {
    fn upload(&self, path: &str, bytes: &[u8], _content_type: &str) -> Result<(), StorageError> {
        check_object_path(path)?;
        fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(path);
        // Claim the name first so a concurrent upload of the same path fails
        // instead of replacing it.
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .map_err(|err| {
                if err.kind() == std::io::ErrorKind::AlreadyExists {
                    StorageError::AlreadyExists(format!("{}/{path} already exists", self.bucket))
                } else {
                    StorageError::from(err)
                }
            })?;
        self.write_object(&target, bytes)
    }

    fn public_url(&self, path: &str) -> String {
        join_url(&self.public_base, &self.bucket, path)
    }
}

/// In-memory object store with failure injection.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    bucket: String,
    public_base: String,
    objects: Mutex<HashMap<String, StoredObject>>,
    next_failure: Mutex<Option<StorageError>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl MemoryObjectStore {
    pub fn new(bucket: impl Into<String>, public_base: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            public_base: public_base.into(),
            ..Self::default()
        }
    }

    /// Make the next upload fail with `err`.
    pub fn fail_next(&self, err: StorageError) {
        *self
            .next_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(err);
    }

    pub fn get(&self, path: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for MemoryObjectStore {
    fn upload(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError> {
        check_object_path(path)?;
        if let Some(err) = self
            .next_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            return Err(err);
        }
        let mut objects = self.objects.lock().unwrap_or_else(PoisonError::into_inner);
        if objects.contains_key(path) {
            return Err(StorageError::AlreadyExists(format!(
                "{}/{path} already exists",
                self.bucket
            )));
        }
        objects.insert(
            path.to_string(),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        join_url(&self.public_base, &self.bucket, path)
    }
}
