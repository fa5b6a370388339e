use tracing::{debug, warn};

use super::action::{self, BlockCursor, EditAction, EditError};
use crate::document::{BlockDocument, BlockId, BlockKind, serialize};
use crate::storage::{AssetFile, UploadError, Uploader};

/// What the host should show about uploads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading { name: String },
    Failed { message: String },
}

/// Outcome of a finished upload, reported by [`EditorSession::poll_uploads`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    /// The image block that now holds the uploaded URL.
    Inserted { block: BlockId, url: String },
    /// Display-ready failure message. The document is unchanged.
    Failed { message: String },
}

/// One visual editing session over an article body.
///
/// The markdown string is regenerated after every successful edit; the host
/// form stores that string, never the block document.
#[derive(Debug)]
pub struct EditorSession {
    document: BlockDocument,
    cursor: BlockCursor,
    markdown: String,
    uploader: Option<Uploader>,
    status: UploadStatus,
}

impl EditorSession {
    /// Open a session over existing markdown (or an empty string).
    pub fn open(markdown: &str) -> Self {
        let mut document = BlockDocument::from_markdown(markdown);
        let first = match document.first_id() {
            Some(id) => id,
            None => document.push(BlockKind::empty_paragraph()),
        };
        let markdown = serialize(&document);
        Self {
            document,
            cursor: BlockCursor::new(first, 0),
            markdown,
            uploader: None,
            status: UploadStatus::Idle,
        }
    }

    /// Attach the uploader used for images dropped into the editor.
    #[must_use]
    pub fn with_uploader(mut self, uploader: Uploader) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub const fn document(&self) -> &BlockDocument {
        &self.document
    }

    pub const fn cursor(&self) -> BlockCursor {
        self.cursor
    }

    /// Markdown for the current document.
    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    pub const fn status(&self) -> &UploadStatus {
        &self.status
    }

    pub fn is_uploading(&self) -> bool {
        self.uploader.as_ref().is_some_and(Uploader::is_busy)
    }

    /// Apply one edit and return the regenerated markdown.
    ///
    /// # Errors
    /// Returns [`EditError`] and leaves the document untouched when the
    /// action does not apply.
    pub fn apply(&mut self, action: EditAction) -> Result<&str, EditError> {
        let _scope = crate::perf::scope("editor.apply");
        let mut document = self.document.clone();
        let mut cursor = self.cursor;
        if let Err(err) = action::apply(&mut document, &mut cursor, action) {
            debug!(error = %err, "edit rejected");
            return Err(err);
        }
        self.document = document;
        self.cursor = cursor;
        self.markdown = serialize(&self.document);
        Ok(&self.markdown)
    }

    /// Start uploading an image. Editing continues while it runs.
    ///
    /// # Errors
    /// Returns [`UploadError`] when no uploader is attached, another upload
    /// is running, or the file fails validation. Failures are also reflected
    /// in [`EditorSession::status`].
    pub fn begin_upload(&mut self, asset: AssetFile) -> Result<(), UploadError> {
        let name = asset.name().to_string();
        let result = match self.uploader.as_mut() {
            Some(uploader) => uploader.start(asset),
            None => Err(UploadError::Storage(crate::storage::StorageError::Other(
                "no object store configured".to_string(),
            ))),
        };
        match &result {
            Ok(()) => self.status = UploadStatus::Uploading { name },
            // A rejected second upload must not hide the running one.
            Err(UploadError::Busy) => {}
            Err(err) => {
                self.status = UploadStatus::Failed {
                    message: err.user_message(),
                }
            }
        }
        result
    }

    /// Collect a finished upload without blocking.
    ///
    /// A successful upload is inserted after the block holding the cursor at
    /// the time of completion, or at the end of the document when that block
    /// is gone.
    pub fn poll_uploads(&mut self) -> Option<UploadEvent> {
        let finished = self.uploader.as_mut()?.poll()?;
        Some(self.complete_upload(finished))
    }

    /// Block until the running upload finishes and apply its outcome.
    pub fn wait_for_upload(&mut self) -> Option<UploadEvent> {
        let finished = self.uploader.as_mut()?.wait()?;
        Some(self.complete_upload(finished))
    }

    fn complete_upload(
        &mut self,
        finished: Result<crate::storage::UploadedAsset, UploadError>,
    ) -> UploadEvent {
        match finished {
            Ok(asset) => {
                self.status = UploadStatus::Idle;
                let block = action::insert_image(
                    &mut self.document,
                    &mut self.cursor,
                    asset.url.clone(),
                    asset.name,
                );
                self.markdown = serialize(&self.document);
                UploadEvent::Inserted {
                    block,
                    url: asset.url,
                }
            }
            Err(err) => {
                warn!(error = %err, "image upload failed");
                let message = err.user_message();
                self.status = UploadStatus::Failed {
                    message: message.clone(),
                };
                UploadEvent::Failed { message }
            }
        }
    }
}
