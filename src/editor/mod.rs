//! Article body editing.
//!
//! Two editors share markdown as their only exchange format:
//! - [`EditorSession`]: the visual block editor. Every edit regenerates the
//!   markdown the host form stores, and image uploads run in the background.
//! - [`SourceBuffer`]: a rope-backed markdown textarea with toolbar helpers.

mod action;
mod buffer;
mod session;
mod toolbar;

pub use action::{BlockCursor, EditAction, EditError, apply};
pub use buffer::{Direction, Selection, SourceBuffer};
pub use session::{EditorSession, UploadEvent, UploadStatus};
pub use toolbar::{DEFAULT_CODE_LANGUAGE, ToolbarAction};
