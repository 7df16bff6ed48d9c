//! Pure helpers with no store or network dependencies.
//!
//! # Examples
//!
//! ```
//! use byline::api::Article;
//! use byline::util::deduplicate;
//!
//! let articles = vec![
//!     Article { title: Some("Hello, World!".into()), ..Article::default() },
//!     Article { title: Some("hello   world".into()), ..Article::default() },
//! ];
//! assert_eq!(deduplicate(&articles).len(), 1);
//! ```

mod dedup;

pub use dedup::deduplicate;
