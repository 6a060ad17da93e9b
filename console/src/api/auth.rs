use reqwest::Method;
use serde_json::{Value, json};
use shared::types::{
    LoginData, LoginGrant, RegistrationData, ResetPasswordData, User, normalize_login_response,
    unwrap_data,
};

use super::{ApiClient, Auth};
use crate::error::ApiError;
use crate::session::AuthBackend;

/// `/auth` endpoints. Only `/auth/me` carries a credential.
#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn anonymous_post(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.client
            .send(Method::POST, path, Auth::Anonymous, &[], Some(body))
            .await
    }
}

impl AuthBackend for AuthApi {
    async fn login(&self, credentials: &LoginData) -> Result<LoginGrant, ApiError> {
        let body = serde_json::to_value(credentials)?;
        let payload = self.anonymous_post("/auth/login", body).await?;
        Ok(normalize_login_response(&payload)?)
    }

    async fn register(&self, data: &RegistrationData) -> Result<Value, ApiError> {
        let body = serde_json::to_value(data)?;
        self.anonymous_post("/auth/register", body).await
    }

    async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        let payload = self
            .client
            .send(Method::GET, "/auth/me", Auth::Bearer(token), &[], None)
            .await?;
        serde_json::from_value(unwrap_data(payload)).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn forgot_password(&self, email: &str) -> Result<Value, ApiError> {
        self.anonymous_post("/auth/forgot-password", json!({ "email": email }))
            .await
    }

    async fn reset_password(&self, data: &ResetPasswordData) -> Result<Value, ApiError> {
        let body = serde_json::to_value(data)?;
        self.anonymous_post("/auth/reset-password", body).await
    }
}

/// Pull `access_token` out of a password-reset link.
///
/// The identity provider puts it in the fragment (`#access_token=..`); some
/// mail templates use the query string instead. The fragment wins.
pub fn extract_reset_token(link: &str) -> Option<String> {
    let (before_fragment, fragment) = match link.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (link, None),
    };
    let query = before_fragment.split_once('?').map(|(_, q)| q);

    [fragment, query]
        .into_iter()
        .flatten()
        .find_map(|params| {
            form_urlencoded::parse(params.as_bytes())
                .find(|(key, value)| key == "access_token" && !value.is_empty())
                .map(|(_, value)| value.into_owned())
        })
}
