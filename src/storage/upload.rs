use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use tracing::{info, warn};

use super::{AssetFile, ObjectStore, StorageError, UploadError, asset_path};

/// A stored asset and where to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    /// Original file name, used as alt text.
    pub name: String,
    /// Object path inside the bucket.
    pub path: String,
    pub url: String,
}

/// Validate and store `asset`, returning its public URL.
///
/// Nothing is written when validation fails.
///
/// # Errors
/// Returns [`UploadError::Validation`] for oversized or non-image files and
/// [`UploadError::Storage`] when the store rejects the write.
pub fn upload_asset(
    store: &dyn ObjectStore,
    asset: &AssetFile,
    limit: u64,
    timestamp_ms: i64,
) -> Result<UploadedAsset, UploadError> {
    let _scope = crate::perf::scope("storage.upload");
    asset.validate(limit)?;
    let path = asset_path(asset.name(), timestamp_ms);
    store.upload(&path, asset.bytes(), asset.content_type())?;
    let url = store.public_url(&path);
    info!(path = %path, size = asset.size(), "stored upload");
    Ok(UploadedAsset {
        name: asset.name().to_string(),
        path,
        url,
    })
}

/// Current time in unix milliseconds.
pub fn unix_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Runs one upload at a time on a background thread.
///
/// Validation happens on the caller's thread so size and type errors are
/// reported immediately. Completion is collected with [`Uploader::poll`].
pub struct Uploader {
    store: Arc<dyn ObjectStore>,
    limit: u64,
    in_flight: Option<InFlight>,
}

struct InFlight {
    name: String,
    rx: Receiver<Result<UploadedAsset, UploadError>>,
}

impl Uploader {
    pub fn new(store: Arc<dyn ObjectStore>, limit: u64) -> Self {
        Self {
            store,
            limit,
            in_flight: None,
        }
    }

    pub const fn limit(&self) -> u64 {
        self.limit
    }

    pub const fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Name of the file currently uploading.
    pub fn current(&self) -> Option<&str> {
        self.in_flight.as_ref().map(|job| job.name.as_str())
    }

    /// Start uploading `asset`.
    ///
    /// # Errors
    /// Returns [`UploadError::Busy`] while another upload is in flight and
    /// [`UploadError::Validation`] for files that would be rejected anyway.
    pub fn start(&mut self, asset: AssetFile) -> Result<(), UploadError> {
        if self.is_busy() {
            return Err(UploadError::Busy);
        }
        asset.validate(self.limit)?;

        let (tx, rx) = mpsc::channel();
        let store = Arc::clone(&self.store);
        let limit = self.limit;
        let name = asset.name().to_string();
        std::thread::spawn(move || {
            let result = upload_asset(store.as_ref(), &asset, limit, unix_millis());
            let _ = tx.send(result);
        });
        crate::perf::log_event("upload.start", &name);
        self.in_flight = Some(InFlight { name, rx });
        Ok(())
    }

    /// Collect the finished upload, if any. Never blocks.
    pub fn poll(&mut self) -> Option<Result<UploadedAsset, UploadError>> {
        let job = self.in_flight.as_ref()?;
        let result = match job.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(worker_stopped()),
        };
        self.finish(result)
    }

    /// Block until the in-flight upload finishes.
    pub fn wait(&mut self) -> Option<Result<UploadedAsset, UploadError>> {
        let job = self.in_flight.as_ref()?;
        let result = job.rx.recv().unwrap_or_else(|_| Err(worker_stopped()));
        self.finish(result)
    }

    fn finish(
        &mut self,
        result: Result<UploadedAsset, UploadError>,
    ) -> Option<Result<UploadedAsset, UploadError>> {
        self.in_flight = None;
        if let Err(err) = &result {
            warn!(error = %err, "upload failed");
            crate::perf::log_event("upload.failed", err.to_string());
        }
        Some(result)
    }
}

fn worker_stopped() -> UploadError {
    UploadError::Storage(StorageError::Other("upload worker stopped".to_string()))
}

impl std::fmt::Debug for Uploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Uploader")
            .field("limit", &self.limit)
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}
