mod auth;
mod client;
mod news;
mod types;
mod user;

pub use client::{ApiClient, ApiError, SessionEvent};
pub use types::{Article, AuthPayload, NewsQuery, UserProfile};
