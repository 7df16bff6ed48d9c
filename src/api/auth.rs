//! Identity endpoints: register, login, current user, password update.
use crate::api::client::{ApiClient, ApiError};
use crate::api::types::{
    AuthPayload, Envelope, LoginRequest, PasswordUpdate, RegisterRequest, UserProfile,
};

impl ApiClient {
    /// `POST /auth/login`. Returns the bearer token and profile; feeding
    /// them into `SessionStore::login` is the caller's job.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let envelope: Envelope<AuthPayload> =
            self.execute(self.post("/auth/login").json(&body)).await?;
        envelope.data.ok_or_else(|| ApiError::Status {
            status: 200,
            message: "login response missing data".to_string(),
        })
    }

    /// `POST /auth/register`. The backend logs the new user straight in, so
    /// the payload matches login.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthPayload, ApiError> {
        let body = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let envelope: Envelope<AuthPayload> =
            self.execute(self.post("/auth/register").json(&body)).await?;
        envelope.data.ok_or_else(|| ApiError::Status {
            status: 200,
            message: "register response missing data".to_string(),
        })
    }

    /// `GET /auth/me` — profile of the authenticated user.
    pub async fn get_me(&self) -> Result<UserProfile, ApiError> {
        let envelope: Envelope<UserProfile> = self.execute(self.get("/auth/me")).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// `PUT /auth/password`.
    pub async fn update_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let body = PasswordUpdate {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        let _: Envelope<serde_json::Value> =
            self.execute(self.put("/auth/password").json(&body)).await?;
        Ok(())
    }
}
