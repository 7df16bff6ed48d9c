//! Per-user endpoints: favorites CRUD, preferences, profile.
use serde_json::{Map, Value};

use crate::api::client::{ApiClient, ApiError};
use crate::api::types::{Article, Envelope, FavoritesPayload, UserProfile};

impl ApiClient {
    /// `GET /user/favorites` — the saved-article collection. An envelope
    /// without data decodes as an empty list, matching a user with no saves.
    pub async fn get_favorites(&self) -> Result<Vec<Article>, ApiError> {
        let envelope: Envelope<FavoritesPayload> =
            self.execute(self.get("/user/favorites")).await?;
        Ok(envelope.data.map(|p| p.favorites).unwrap_or_default())
    }

    /// `POST /user/favorites`.
    pub async fn add_favorite(&self, article: &Article) -> Result<(), ApiError> {
        let _: Envelope<Value> = self
            .execute(self.post("/user/favorites").json(article))
            .await?;
        Ok(())
    }

    /// `DELETE /user/favorites/{id}`.
    pub async fn remove_favorite(&self, article_id: &str) -> Result<(), ApiError> {
        let path = format!("/user/favorites/{}", article_id);
        let _: Envelope<Value> = self.execute(self.delete(&path)).await?;
        Ok(())
    }

    /// `PUT /user/preferences` — server-side copy of UI preferences.
    pub async fn update_preferences(&self, preferences: &Map<String, Value>) -> Result<(), ApiError> {
        let _: Envelope<Value> = self
            .execute(self.put("/user/preferences").json(preferences))
            .await?;
        Ok(())
    }

    /// `GET /user/profile`.
    pub async fn get_profile(&self) -> Result<UserProfile, ApiError> {
        let envelope: Envelope<UserProfile> = self.execute(self.get("/user/profile")).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// `PUT /user/profile` — partial update; the backend returns the merged
    /// profile so callers can feed it to `SessionStore::update_user`.
    pub async fn update_profile(
        &self,
        partial: &Map<String, Value>,
    ) -> Result<UserProfile, ApiError> {
        let envelope: Envelope<UserProfile> = self
            .execute(self.put("/user/profile").json(partial))
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }
}
