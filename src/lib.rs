//! byline — client-side session, preference, and collection core for a
//! news-reading application.
//!
//! Three cooperating stores keep authentication state, the theme
//! preference, and the saved-article collection consistent across restarts
//! and backend round-trips:
//!
//! - [`store::SessionStore`] owns identity + credential and the
//!   login/logout transitions, including post-login favorites hydration.
//! - [`store::ThemeStore`] owns the light/dark preference and keeps the
//!   persisted value and the presentation sink in lockstep.
//! - [`store::NewsStore`] owns the category filter, search text, and the
//!   in-memory favorites list.
//!
//! [`api::ApiClient`] carries the bearer credential (re-read from storage
//! on every call) and converts a 401 from any endpoint into a purge of the
//! stored session plus an [`api::SessionEvent::Invalidated`] the host
//! subscribes to. [`storage::KeyValueStore`] is the persistence port; the
//! stores degrade gracefully when it is unavailable.

pub mod api;
pub mod config;
pub mod storage;
pub mod store;
pub mod util;
