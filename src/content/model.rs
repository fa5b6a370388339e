use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of articles on the home page.
pub const DEFAULT_LATEST_LIMIT: usize = 6;
/// Articles per listing page.
pub const DEFAULT_PER_PAGE: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A news article. `content` is markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct News {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub thumbnail_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl News {
    /// The article body as an HTML fragment.
    pub fn body_html(&self) -> String {
        crate::render::render_html(&self.content)
    }
}

/// A stored admin flag for a user, keyed by the auth provider's user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub user_id: String,
    pub is_admin: bool,
}

/// One page of a published-news listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsPage {
    pub news: Vec<News>,
    /// Matching articles across all pages.
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

impl NewsPage {
    pub const fn empty(page: usize, per_page: usize) -> Self {
        Self {
            news: Vec::new(),
            total: 0,
            page,
            per_page,
        }
    }

    pub const fn total_pages(&self) -> usize {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(self.per_page)
    }

    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }
}
