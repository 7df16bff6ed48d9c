//! News collection store: category filter, search text, and the in-memory
//! saved-article list.
//!
//! Nothing here persists beyond the process; favorites are hydrated from the
//! backend after login and replaced wholesale at session boundaries. The
//! session store is the only other component allowed to mutate this store,
//! and only through [`NewsStore::set_favorites`].
use crate::api::Article;

pub struct NewsStore {
    selected_category: String,
    search_query: String,
    favorites: Vec<Article>,
}

impl Default for NewsStore {
    fn default() -> Self {
        Self::new("general")
    }
}

impl NewsStore {
    pub fn new(default_category: &str) -> Self {
        Self {
            selected_category: default_category.to_string(),
            search_query: String::new(),
            favorites: Vec::new(),
        }
    }

    pub fn selected_category(&self) -> &str {
        &self.selected_category
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn favorites(&self) -> &[Article] {
        &self.favorites
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.selected_category = category.into();
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Wholesale replace of the saved-article list. Used by the session
    /// store on login hydration and logout; also the recovery path when a
    /// hydration fetch fails (replace with empty, never leave stale data).
    pub fn set_favorites(&mut self, favorites: Vec<Article>) {
        self.favorites = favorites;
    }

    /// Append a saved article. Ids are unique at the business level, so an
    /// id that is already present is ignored rather than duplicated.
    pub fn add_favorite(&mut self, article: Article) {
        if self
            .favorites
            .iter()
            .any(|existing| existing.article_id == article.article_id)
        {
            tracing::debug!(article_id = %article.article_id, "Favorite already saved, ignoring");
            return;
        }
        self.favorites.push(article);
    }

    /// Remove every entry with the given id.
    pub fn remove_favorite(&mut self, article_id: &str) {
        self.favorites
            .retain(|article| article.article_id != article_id);
    }
}

// ============================================================================
// Tests
// ============================================================================
