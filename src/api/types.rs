//! Wire types shared by the API endpoint groups.
//!
//! The backend wraps every body in a `{ success, message, data }` envelope
//! and uses camelCase field names; everything here mirrors that shape.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Response Envelope
// ============================================================================

/// Standard backend envelope. `data` is absent on failures and on
/// side-effect-only endpoints.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Error body the backend sends with non-2xx statuses. Parsed best-effort so
/// callers get the server's message instead of a bare status code.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// Identity
// ============================================================================

/// Profile fields are backend-owned and open-ended, so the profile is an
/// opaque JSON object rather than a fixed struct. Partial updates
/// shallow-merge into it (see [`UserProfile::merge`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(pub Map<String, Value>);

impl UserProfile {
    /// Shallow-merge `partial` into this profile: top-level keys from
    /// `partial` overwrite, everything else is untouched.
    pub fn merge(&mut self, partial: Map<String, Value>) {
        for (key, value) in partial {
            self.0.insert(key, value);
        }
    }

    /// Convenience accessor for string-valued profile fields (id, name,
    /// email, ...).
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordUpdate {
    pub current_password: String,
    pub new_password: String,
}

// ============================================================================
// Articles
// ============================================================================

/// A saved or fetched article, owned by value. `article_id` is the backend's
/// stable identifier; the rest is display metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Article {
    pub article_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub source: Option<String>,
    pub category: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct FavoritesPayload {
    #[serde(default)]
    pub favorites: Vec<Article>,
}

#[derive(Debug, Deserialize)]
pub struct NewsPayload {
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Query parameters for headline listing endpoints.
#[derive(Debug, Clone, Default)]
pub struct NewsQuery {
    pub category: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl NewsQuery {
    pub(crate) fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            pairs.push(("pageSize", page_size.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct SummaryPayload {
    pub summary: String,
}

// ============================================================================
// Tests
// ============================================================================
