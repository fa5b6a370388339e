use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::admin::{AdminCapability, AdminDirectory};
use super::error::ContentError;
use super::model::{AdminUser, Category, News, NewsPage};

/// Queries and writes over news and categories.
///
/// Public queries only ever see published articles. Writes take an
/// [`AdminCapability`].
pub trait ContentStore {
    /// Most recently published articles, newest first.
    fn latest_news(&self, limit: usize) -> Result<Vec<News>, ContentError>;

    /// Page `page` (starting at 1) of published articles, newest first.
    fn news_page(&self, page: usize, per_page: usize) -> Result<NewsPage, ContentError>;

    /// Like [`ContentStore::news_page`], restricted to one category.
    /// An unknown slug yields an empty page.
    fn news_by_category(
        &self,
        category_slug: &str,
        page: usize,
        per_page: usize,
    ) -> Result<NewsPage, ContentError>;

    /// A published article by slug.
    fn news_by_slug(&self, slug: &str) -> Result<Option<News>, ContentError>;

    /// All categories ordered by name.
    fn categories(&self) -> Result<Vec<Category>, ContentError>;

    fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, ContentError>;

    /// Every article, drafts included, newest first.
    fn admin_news(&self, cap: &AdminCapability) -> Result<Vec<News>, ContentError>;

    fn news_by_id(&self, cap: &AdminCapability, id: Uuid) -> Result<News, ContentError>;

    /// Insert or update an article, keyed by id.
    fn save_news(&mut self, cap: &AdminCapability, news: News) -> Result<(), ContentError>;

    fn delete_news(&mut self, cap: &AdminCapability, id: Uuid) -> Result<(), ContentError>;

    /// Insert or update a category, keyed by id.
    fn save_category(&mut self, cap: &AdminCapability, category: Category)
    -> Result<(), ContentError>;

    /// Remove a category. Its articles become uncategorized.
    fn delete_category(&mut self, cap: &AdminCapability, id: Uuid) -> Result<(), ContentError>;
}

/// Everything the store persists.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentData {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub news: Vec<News>,
    #[serde(default)]
    pub admin_users: Vec<AdminUser>,
}

/// Content held in memory, optionally backed by a JSON file that is
/// rewritten after every successful write.
#[derive(Debug, Default)]
pub struct JsonContentStore {
    path: Option<PathBuf>,
    data: ContentData,
}

impl JsonContentStore {
    pub fn in_memory(data: ContentData) -> Self {
        Self { path: None, data }
    }

    /// Open the store at `path`, starting empty when the file is missing.
    ///
    /// # Errors
    /// Returns [`ContentError::Io`] or [`ContentError::Json`] when the file
    /// exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ContentError> {
        let path = path.into();
        let data = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            debug!(path = %path.display(), "content file missing, starting empty");
            ContentData::default()
        };
        Ok(Self {
            path: Some(path),
            data,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub const fn data(&self) -> &ContentData {
        &self.data
    }

    /// Grant or revoke admin rights. This is the bootstrap path for the first
    /// administrator, so it takes no capability.
    pub fn set_admin(&mut self, user_id: &str, is_admin: bool) -> Result<(), ContentError> {
        let mut data = self.data.clone();
        match data.admin_users.iter_mut().find(|u| u.user_id == user_id) {
            Some(user) => user.is_admin = is_admin,
            None => data.admin_users.push(AdminUser {
                user_id: user_id.to_string(),
                is_admin,
            }),
        }
        self.commit(data)
    }

    /// Write `data` to disk, then make it the store's state. A failed write
    /// leaves the in-memory state untouched.
    fn commit(&mut self, data: ContentData) -> Result<(), ContentError> {
        Self::persist(self.path.as_deref(), &data)?;
        self.data = data;
        Ok(())
    }

    fn persist(path: Option<&Path>, data: &ContentData) -> Result<(), ContentError> {
        let Some(path) = path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(data)?;
        let tmp = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path).inspect_err(|_| {
            let _ = fs::remove_file(&tmp);
        })?;
        Ok(())
    }

    fn published(&self) -> impl Iterator<Item = &News> {
        self.data.news.iter().filter(|n| n.published)
    }

    fn paginate(mut items: Vec<&News>, page: usize, per_page: usize) -> NewsPage {
        sort_newest_first(&mut items);
        let total = items.len();
        let page = page.max(1);
        let offset = (page - 1).saturating_mul(per_page);
        NewsPage {
            news: items.into_iter().skip(offset).take(per_page).cloned().collect(),
            total,
            page,
            per_page,
        }
    }

    fn check_slug<T>(
        items: &[T],
        id: Uuid,
        slug: &str,
        key: impl Fn(&T) -> (Uuid, &str),
    ) -> Result<(), ContentError> {
        if items.iter().map(key).any(|(other, s)| other != id && s == slug) {
            return Err(ContentError::DuplicateSlug(slug.to_string()));
        }
        Ok(())
    }
}

fn sort_newest_first(items: &mut [&News]) {
    items.sort_by_key(|n| Reverse((n.published_at, n.created_at)));
}

impl AdminDirectory for JsonContentStore {
    fn is_admin(&self, user_id: &str) -> bool {
        self.data
            .admin_users
            .iter()
            .any(|u| u.user_id == user_id && u.is_admin)
    }
}

impl ContentStore for JsonContentStore {
    fn latest_news(&self, limit: usize) -> Result<Vec<News>, ContentError> {
        let mut items: Vec<&News> = self.published().collect();
        sort_newest_first(&mut items);
        Ok(items.into_iter().take(limit).cloned().collect())
    }

    fn news_page(&self, page: usize, per_page: usize) -> Result<NewsPage, ContentError> {
        Ok(Self::paginate(self.published().collect(), page, per_page))
    }

    fn news_by_category(
        &self,
        category_slug: &str,
        page: usize,
        per_page: usize,
    ) -> Result<NewsPage, ContentError> {
        let Some(category) = self.data.categories.iter().find(|c| c.slug == category_slug) else {
            debug!(category_slug, "unknown category");
            return Ok(NewsPage::empty(page.max(1), per_page));
        };
        let items = self
            .published()
            .filter(|n| n.category_id == Some(category.id))
            .collect();
        Ok(Self::paginate(items, page, per_page))
    }

    fn news_by_slug(&self, slug: &str) -> Result<Option<News>, ContentError> {
        Ok(self.published().find(|n| n.slug == slug).cloned())
    }

    fn categories(&self) -> Result<Vec<Category>, ContentError> {
        let mut categories = self.data.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, ContentError> {
        Ok(self.data.categories.iter().find(|c| c.slug == slug).cloned())
    }

    fn admin_news(&self, _cap: &AdminCapability) -> Result<Vec<News>, ContentError> {
        let mut items: Vec<News> = self.data.news.clone();
        items.sort_by_key(|n| Reverse(n.created_at));
        Ok(items)
    }

    fn news_by_id(&self, _cap: &AdminCapability, id: Uuid) -> Result<News, ContentError> {
        self.data
            .news
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or_else(|| ContentError::NotFound("article".to_string()))
    }

    fn save_news(&mut self, cap: &AdminCapability, news: News) -> Result<(), ContentError> {
        Self::check_slug(&self.data.news, news.id, &news.slug, |n| (n.id, n.slug.as_str()))?;
        info!(user = cap.user_id(), slug = %news.slug, "saving article");
        let mut data = self.data.clone();
        match data.news.iter_mut().find(|n| n.id == news.id) {
            Some(existing) => *existing = news,
            None => data.news.push(news),
        }
        self.commit(data)
    }

    fn delete_news(&mut self, cap: &AdminCapability, id: Uuid) -> Result<(), ContentError> {
        if !self.data.news.iter().any(|n| n.id == id) {
            return Err(ContentError::NotFound("article".to_string()));
        }
        let mut data = self.data.clone();
        data.news.retain(|n| n.id != id);
        self.commit(data)?;
        info!(user = cap.user_id(), %id, "deleted article");
        Ok(())
    }

    fn save_category(
        &mut self,
        cap: &AdminCapability,
        category: Category,
    ) -> Result<(), ContentError> {
        Self::check_slug(&self.data.categories, category.id, &category.slug, |c| {
            (c.id, c.slug.as_str())
        })?;
        info!(user = cap.user_id(), slug = %category.slug, "saving category");
        let mut data = self.data.clone();
        match data.categories.iter_mut().find(|c| c.id == category.id) {
            Some(existing) => *existing = category,
            None => data.categories.push(category),
        }
        self.commit(data)
    }

    fn delete_category(&mut self, cap: &AdminCapability, id: Uuid) -> Result<(), ContentError> {
        if !self.data.categories.iter().any(|c| c.id == id) {
            return Err(ContentError::NotFound("category".to_string()));
        }
        let mut data = self.data.clone();
        data.categories.retain(|c| c.id != id);
        for news in data.news.iter_mut().filter(|n| n.category_id == Some(id)) {
            news.category_id = None;
        }
        self.commit(data)?;
        info!(user = cap.user_id(), %id, "deleted category");
        Ok(())
    }
}
