//! News articles and categories.
//!
//! Public queries see published articles only. Every write goes through an
//! [`AdminCapability`] obtained from [`authorize`].

mod admin;
mod error;
mod form;
mod model;
mod slug;
mod store;

pub use admin::{AdminCapability, AdminDirectory, StaticAdminDirectory, authorize};
pub use error::ContentError;
pub use form::{CategoryForm, NewsForm};
pub use model::{AdminUser, Category, DEFAULT_LATEST_LIMIT, DEFAULT_PER_PAGE, News, NewsPage};
pub use slug::generate_slug;
pub use store::{ContentData, ContentStore, JsonContentStore};
