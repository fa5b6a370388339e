// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. storage::StorageError)
    clippy::module_name_repetitions
)]

//! # Newsdesk
//!
//! The editing and rendering core of a small news site.
//!
//! Article bodies are markdown. Newsdesk provides:
//! - A block editor model that loads markdown, applies edits and writes
//!   canonical markdown back after every change
//! - A renderer producing a styled node tree with highlighted code blocks
//! - Image uploads with validation and collision-resistant naming
//! - News and category records with paginated queries and admin-gated writes
//!
//! ## Modules
//!
//! - [`document`]: Block model, markdown parsing and serialization
//! - [`editor`]: Editing sessions, upload state and the source-mode buffer
//! - [`render`]: Markdown to node tree and HTML
//! - [`highlight`]: Syntax highlighting
//! - [`storage`]: Asset validation and object stores
//! - [`content`]: News, categories, forms and admin capability
//! - [`config`]: Flag-file configuration
//! - [`perf`]: Timing scopes and debug event log

pub mod config;
pub mod content;
pub mod document;
pub mod editor;
pub mod highlight;
pub mod perf;
pub mod render;
pub mod storage;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::content::{ContentStore, News};
    pub use crate::document::{BlockDocument, BlockKind};
    pub use crate::editor::{EditAction, EditorSession};
    pub use crate::render::{Node, render};
    pub use crate::storage::{AssetFile, ObjectStore};
}
