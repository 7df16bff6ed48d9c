//! Session store: identity, credential, and the login/logout transitions.
//!
//! Two states — Anonymous and Authenticated — with the invariant that the
//! store is authenticated exactly when both the user profile and the bearer
//! token are present. Login persists the session durably and then hydrates
//! the favorites collection from the backend; a hydration failure empties
//! the collection but never rolls the login back.
//!
//! Hydration results carry a generation ticket. `login` and `logout` both
//! advance the generation, so a fetch that resolves after the session it
//! belonged to has ended is discarded instead of resurrecting stale
//! favorites.
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::{ApiClient, ApiError, Article, UserProfile};
use crate::storage::{KeyValueStore, SESSION_KEY};
use crate::store::news::NewsStore;

/// Durable shape under the `auth-session` key.
#[derive(Serialize, Deserialize)]
struct PersistedSession {
    user: UserProfile,
    token: String,
}

/// Marks which session a favorites fetch belongs to. Stale tickets are
/// rejected by [`SessionStore::apply_hydration`].
#[derive(Debug, Clone, Copy)]
pub struct HydrationTicket {
    generation: u64,
}

// ============================================================================
// SessionStore
// ============================================================================

pub struct SessionStore {
    user: Option<UserProfile>,
    token: Option<SecretString>,
    generation: u64,
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            user: None,
            token: None,
            generation: 0,
            storage,
        }
    }

    /// True exactly when both profile and credential are present.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Anonymous → Authenticated. Persists the session, then hydrates the
    /// favorites collection best-effort: a failed fetch leaves an empty
    /// collection, not stale data, and never fails the login itself.
    pub async fn login(
        &mut self,
        user: UserProfile,
        token: String,
        api: &ApiClient,
        news: &mut NewsStore,
    ) {
        self.apply_login(user, token);
        self.hydrate_favorites(api, news).await;
    }

    /// The synchronous half of login: state transition plus durable write.
    /// Split out so hosts that drive hydration themselves (or tests) can
    /// sequence the steps explicitly.
    pub fn apply_login(&mut self, user: UserProfile, token: String) {
        self.user = Some(user);
        self.token = Some(SecretString::from(token));
        self.generation += 1;
        self.persist();
        tracing::info!(generation = self.generation, "Session authenticated");
    }

    /// Authenticated → Anonymous; idempotent from Anonymous. Clears the
    /// persisted entry and empties the favorites collection so no per-user
    /// data survives the session boundary.
    pub fn logout(&mut self, news: &mut NewsStore) {
        self.user = None;
        self.token = None;
        self.generation += 1;
        if let Err(e) = self.storage.remove(SESSION_KEY) {
            tracing::warn!(error = %e, "Failed to clear persisted session");
        }
        news.set_favorites(Vec::new());
        tracing::info!("Session cleared");
    }

    /// Shallow-merge profile fields and re-persist. No-op while Anonymous.
    pub fn update_user(&mut self, partial: Map<String, Value>) {
        let Some(user) = self.user.as_mut() else {
            tracing::debug!("update_user while anonymous, ignoring");
            return;
        };
        user.merge(partial);
        self.persist();
    }

    /// Startup rehydration from the `auth-session` key. Absent or malformed
    /// payloads leave the store Anonymous; nothing here is fatal.
    pub fn restore(&mut self) {
        let Some(raw) = self.storage.get(SESSION_KEY) else {
            tracing::debug!("No persisted session");
            return;
        };
        match serde_json::from_str::<PersistedSession>(&raw) {
            Ok(persisted) => {
                self.user = Some(persisted.user);
                self.token = Some(SecretString::from(persisted.token));
                self.generation += 1;
                tracing::info!("Session restored from storage");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Persisted session is malformed, staying anonymous");
            }
        }
    }

    /// Fetch favorites for the current session and apply them, respecting
    /// the generation ticket.
    pub async fn hydrate_favorites(&mut self, api: &ApiClient, news: &mut NewsStore) {
        let ticket = self.begin_hydration();
        let result = api.get_favorites().await;
        self.apply_hydration(ticket, result, news);
    }

    /// Capture a ticket tied to the current session generation.
    pub fn begin_hydration(&self) -> HydrationTicket {
        HydrationTicket {
            generation: self.generation,
        }
    }

    /// Apply a hydration result. Three outcomes:
    /// - stale ticket → discarded, collection untouched
    /// - fetch succeeded → wholesale replace with the fetched list
    /// - fetch failed → wholesale replace with empty (never stale data)
    pub fn apply_hydration(
        &mut self,
        ticket: HydrationTicket,
        result: Result<Vec<Article>, ApiError>,
        news: &mut NewsStore,
    ) {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Discarding favorites from a previous session"
            );
            return;
        }
        match result {
            Ok(favorites) => {
                tracing::debug!(count = favorites.len(), "Favorites hydrated");
                news.set_favorites(favorites);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Favorites hydration failed, starting empty");
                news.set_favorites(Vec::new());
            }
        }
    }

    fn persist(&self) {
        let (Some(user), Some(token)) = (&self.user, &self.token) else {
            return;
        };
        let persisted = PersistedSession {
            user: user.clone(),
            token: token.expose_secret().to_string(),
        };
        match serde_json::to_string(&persisted) {
            Ok(json) => {
                if let Err(e) = self.storage.set(SESSION_KEY, &json) {
                    tracing::warn!(error = %e, "Failed to persist session, continuing in-memory");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialize session"),
        }
    }
}

/// Mask the credential in debug output.
impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .field("generation", &self.generation)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::MemoryStore;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn profile(name: &str) -> UserProfile {
        UserProfile(
            json!({"id": "u1", "name": name, "email": "u@example.com"})
                .as_object()
                .unwrap()
                .clone(),
        )
    }

    fn api_for(base_url: &str, storage: Arc<MemoryStore>) -> ApiClient {
        let config = Config {
            api_base_url: base_url.to_string(),
            ..Config::default()
        };
        ApiClient::new(&config, storage).0
    }

    #[tokio::test]
    async fn test_login_authenticates_and_persists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/favorites"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"success":true,"data":{"favorites":[{"articleId":"f1"}]}}"#,
            ))
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStore::new());
        let api = api_for(&server.uri(), Arc::clone(&storage));
        let mut session = SessionStore::new(Arc::clone(&storage) as Arc<dyn KeyValueStore>);
        let mut news = NewsStore::default();

        session
            .login(profile("Ada"), "tok-1".to_string(), &api, &mut news)
            .await;

        assert!(session.is_authenticated());
        assert_eq!(news.favorites().len(), 1);

        // Persisted copy matches what was set
        let raw = storage.get(SESSION_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["token"], "tok-1");
        assert_eq!(value["user"]["name"], "Ada");
    }

    #[tokio::test]
    async fn test_login_survives_hydration_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/favorites"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStore::new());
        let api = api_for(&server.uri(), Arc::clone(&storage));
        let mut session = SessionStore::new(Arc::clone(&storage) as Arc<dyn KeyValueStore>);
        let mut news = NewsStore::default();
        news.set_favorites(vec![Article {
            article_id: "stale".to_string(),
            ..Article::default()
        }]);

        session
            .login(profile("Ada"), "tok-1".to_string(), &api, &mut news)
            .await;

        // Login stands, stale favorites are gone
        assert!(session.is_authenticated());
        assert!(news.favorites().is_empty());
    }

    #[test]
    fn test_logout_clears_everything() {
        let storage = Arc::new(MemoryStore::new());
        let mut session = SessionStore::new(Arc::clone(&storage) as Arc<dyn KeyValueStore>);
        let mut news = NewsStore::default();

        session.apply_login(profile("Ada"), "tok-1".to_string());
        news.set_favorites(vec![Article::default()]);

        session.logout(&mut news);

        assert!(!session.is_authenticated());
        assert_eq!(storage.get(SESSION_KEY), None);
        assert!(news.favorites().is_empty());
    }

    #[test]
    fn test_logout_idempotent_from_anonymous() {
        let storage = Arc::new(MemoryStore::new());
        let mut session = SessionStore::new(storage);
        let mut news = NewsStore::default();

        session.logout(&mut news);
        session.logout(&mut news);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_update_user_shallow_merges_and_repersists() {
        let storage = Arc::new(MemoryStore::new());
        let mut session = SessionStore::new(Arc::clone(&storage) as Arc<dyn KeyValueStore>);
        session.apply_login(profile("Ada"), "tok-1".to_string());

        session.update_user(json!({"name": "Ada Lovelace"}).as_object().unwrap().clone());

        let user = session.user().unwrap();
        assert_eq!(user.get_str("name"), Some("Ada Lovelace"));
        assert_eq!(user.get_str("email"), Some("u@example.com"));

        let raw = storage.get(SESSION_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["user"]["name"], "Ada Lovelace");
    }

    #[test]
    fn test_update_user_while_anonymous_is_noop() {
        let storage = Arc::new(MemoryStore::new());
        let mut session = SessionStore::new(Arc::clone(&storage) as Arc<dyn KeyValueStore>);

        session.update_user(json!({"name": "Ghost"}).as_object().unwrap().clone());
        assert!(session.user().is_none());
        assert_eq!(storage.get(SESSION_KEY), None);
    }

    #[test]
    fn test_restore_from_persisted_session() {
        let storage = Arc::new(MemoryStore::new());
        storage
            .set(
                SESSION_KEY,
                r#"{"user":{"id":"u1","name":"Ada"},"token":"tok-1"}"#,
            )
            .unwrap();

        let mut session = SessionStore::new(storage);
        session.restore();

        assert!(session.is_authenticated());
        assert_eq!(session.user().unwrap().get_str("name"), Some("Ada"));
    }

    #[test]
    fn test_restore_malformed_stays_anonymous() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(SESSION_KEY, "half a session {{").unwrap();

        let mut session = SessionStore::new(storage);
        session.restore();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_restore_absent_stays_anonymous() {
        let mut session = SessionStore::new(Arc::new(MemoryStore::new()));
        session.restore();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_stale_hydration_is_discarded_after_logout() {
        let storage = Arc::new(MemoryStore::new());
        let mut session = SessionStore::new(storage);
        let mut news = NewsStore::default();

        session.apply_login(profile("Ada"), "tok-1".to_string());
        let ticket = session.begin_hydration();

        // User logs out before the fetch resolves
        session.logout(&mut news);

        // The late-arriving favorites must not be applied
        let late = vec![Article {
            article_id: "late".to_string(),
            ..Article::default()
        }];
        session.apply_hydration(ticket, Ok(late), &mut news);
        assert!(news.favorites().is_empty());
    }

    #[test]
    fn test_stale_hydration_discarded_after_relogin() {
        let storage = Arc::new(MemoryStore::new());
        let mut session = SessionStore::new(storage);
        let mut news = NewsStore::default();

        session.apply_login(profile("Ada"), "tok-1".to_string());
        let old_ticket = session.begin_hydration();

        // A second login (new session) supersedes the pending fetch
        session.apply_login(profile("Grace"), "tok-2".to_string());
        let new_ticket = session.begin_hydration();

        session.apply_hydration(
            old_ticket,
            Ok(vec![Article {
                article_id: "old".to_string(),
                ..Article::default()
            }]),
            &mut news,
        );
        assert!(news.favorites().is_empty());

        session.apply_hydration(
            new_ticket,
            Ok(vec![Article {
                article_id: "new".to_string(),
                ..Article::default()
            }]),
            &mut news,
        );
        assert_eq!(news.favorites().len(), 1);
        assert_eq!(news.favorites()[0].article_id, "new");
    }

    #[test]
    fn test_debug_masks_token() {
        let mut session = SessionStore::new(Arc::new(MemoryStore::new()));
        session.apply_login(profile("Ada"), "super-secret-token".to_string());

        let debug_output = format!("{:?}", session);
        assert!(!debug_output.contains("super-secret-token"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
