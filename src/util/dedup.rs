//! Near-duplicate removal for article lists.
//!
//! News aggregators syndicate the same story under lightly reworded titles
//! ("Hello, World!" vs "hello world"). We normalize titles and keep the
//! first article per normalized form, preserving the original order.
use crate::api::Article;
use std::collections::HashSet;

/// Normalize a title for comparison: lowercase, strip everything but ASCII
/// alphanumerics and spaces, collapse runs of whitespace, trim.
fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove near-duplicate articles by normalized title, keeping the first
/// occurrence of each. A missing title normalizes to the empty string, so
/// all title-less articles collapse into a single kept entry.
///
/// Pure and deterministic; relative order of kept articles is unchanged.
pub fn deduplicate(articles: &[Article]) -> Vec<Article> {
    let mut seen = HashSet::new();
    articles
        .iter()
        .filter(|article| seen.insert(normalize_title(article.title.as_deref().unwrap_or(""))))
        .cloned()
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
