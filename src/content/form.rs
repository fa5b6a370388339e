//! Admin forms for articles and categories.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use super::admin::AdminCapability;
use super::error::ContentError;
use super::model::{Category, News};
use super::slug::generate_slug;
use super::store::ContentStore;
use crate::storage::{AssetFile, ObjectStore, UploadError, upload_asset};

/// Editable state of a news article.
///
/// New articles keep their slug in step with the title; editing an existing
/// article never changes its slug implicitly.
#[derive(Debug, Clone, Default)]
pub struct NewsForm {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub category_id: Option<Uuid>,
    pub thumbnail_url: Option<String>,
    pub published: bool,
    existing: Option<News>,
}

impl NewsForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// A form pre-filled from a stored article.
    pub fn edit(news: &News) -> Self {
        Self {
            title: news.title.clone(),
            slug: news.slug.clone(),
            content: news.content.clone(),
            excerpt: news.excerpt.clone().unwrap_or_default(),
            category_id: news.category_id,
            thumbnail_url: news.thumbnail_url.clone(),
            published: news.published,
            existing: Some(news.clone()),
        }
    }

    pub const fn is_new(&self) -> bool {
        self.existing.is_none()
    }

    pub fn set_title(&mut self, title: &str) {
        title.clone_into(&mut self.title);
        if self.is_new() {
            self.slug = generate_slug(title);
        }
    }

    /// Replace the body with the editor's latest markdown.
    pub fn set_content(&mut self, markdown: &str) {
        markdown.clone_into(&mut self.content);
    }

    /// Store `asset` as the thumbnail.
    ///
    /// # Errors
    /// Returns the upload failure; the previous thumbnail is kept.
    pub fn upload_thumbnail(
        &mut self,
        store: &dyn ObjectStore,
        asset: &AssetFile,
        limit: u64,
        timestamp_ms: i64,
    ) -> Result<(), UploadError> {
        match upload_asset(store, asset, limit, timestamp_ms) {
            Ok(uploaded) => {
                self.thumbnail_url = Some(uploaded.url);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "thumbnail upload failed, keeping previous thumbnail");
                Err(err)
            }
        }
    }

    /// # Errors
    /// Returns [`ContentError::Invalid`] when title, slug or content is blank.
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.title.trim().is_empty() || self.slug.trim().is_empty() || self.content.trim().is_empty()
        {
            return Err(ContentError::Invalid(
                "Title, slug and content are required.".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the record to store.
    ///
    /// Publishing keeps an existing publication time or stamps `now`;
    /// unpublishing clears it.
    ///
    /// # Errors
    /// Returns [`ContentError::Invalid`] when validation fails.
    pub fn to_news(&self, now: DateTime<Utc>) -> Result<News, ContentError> {
        self.validate()?;
        let existing = self.existing.as_ref();
        let published_at = if self.published {
            Some(existing.and_then(|n| n.published_at).unwrap_or(now))
        } else {
            None
        };
        Ok(News {
            id: existing.map_or_else(Uuid::new_v4, |n| n.id),
            title: self.title.trim().to_string(),
            slug: self.slug.trim().to_string(),
            content: self.content.trim().to_string(),
            excerpt: non_empty(&self.excerpt),
            thumbnail_url: self.thumbnail_url.as_deref().and_then(non_empty),
            category_id: self.category_id,
            published: self.published,
            published_at,
            created_at: existing.map_or(now, |n| n.created_at),
            updated_at: now,
        })
    }

    /// Validate and save. Returns the stored record.
    ///
    /// # Errors
    /// Returns validation failures and store errors such as
    /// [`ContentError::DuplicateSlug`].
    pub fn submit(
        &mut self,
        store: &mut dyn ContentStore,
        cap: &AdminCapability,
        now: DateTime<Utc>,
    ) -> Result<News, ContentError> {
        let news = self.to_news(now)?;
        store.save_news(cap, news.clone())?;
        self.existing = Some(news.clone());
        Ok(news)
    }
}

/// Editable state of a category.
#[derive(Debug, Clone, Default)]
pub struct CategoryForm {
    pub name: String,
    pub slug: String,
    existing: Option<Category>,
}

impl CategoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edit(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
            existing: Some(category.clone()),
        }
    }

    pub const fn is_new(&self) -> bool {
        self.existing.is_none()
    }

    pub fn set_name(&mut self, name: &str) {
        name.clone_into(&mut self.name);
        if self.is_new() {
            self.slug = generate_slug(name);
        }
    }

    /// # Errors
    /// Returns [`ContentError::Invalid`] when name or slug is blank.
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.name.trim().is_empty() || self.slug.trim().is_empty() {
            return Err(ContentError::Invalid(
                "Category name and slug are required.".to_string(),
            ));
        }
        Ok(())
    }

    /// # Errors
    /// Returns [`ContentError::Invalid`] when validation fails.
    pub fn to_category(&self, now: DateTime<Utc>) -> Result<Category, ContentError> {
        self.validate()?;
        let existing = self.existing.as_ref();
        Ok(Category {
            id: existing.map_or_else(Uuid::new_v4, |c| c.id),
            name: self.name.trim().to_string(),
            slug: self.slug.trim().to_string(),
            created_at: existing.map_or(now, |c| c.created_at),
            updated_at: now,
        })
    }

    /// # Errors
    /// Returns validation failures and store errors.
    pub fn submit(
        &mut self,
        store: &mut dyn ContentStore,
        cap: &AdminCapability,
        now: DateTime<Utc>,
    ) -> Result<Category, ContentError> {
        let category = self.to_category(now)?;
        store.save_category(cap, category.clone())?;
        self.existing = Some(category.clone());
        Ok(category)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
