//! HTTP access to the parking backend.
//!
//! [`ApiClient`] owns the transport and the bearer-header rule; the resource
//! clients in the submodules only know paths and payload shapes.

mod auth;
mod parking;
mod payment;
mod reservation;
mod space;
mod statistics;
mod tariff;
mod user;

pub use auth::{AuthApi, extract_reset_token};
pub use parking::ParkingApi;
pub use payment::PaymentApi;
pub use reservation::ReservationApi;
pub use space::SpaceApi;
pub use statistics::StatisticsApi;
pub use tariff::TariffApi;
pub use user::UserApi;

use std::sync::Arc;

use reqwest::{Method, Url};
use serde::Serialize;
use serde_json::Value;
use shared::types::backend_message;
use tracing::debug;

use crate::error::ApiError;
use crate::token_store::TokenStore;

/// Which credential a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth<'a> {
    /// Whatever the token store holds at send time, if anything.
    Stored,
    /// No `Authorization` header.
    Anonymous,
    /// This exact token, bypassing the store.
    Bearer(&'a str),
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url,
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.send(Method::GET, path, Auth::Stored, &[], None).await
    }

    pub async fn get_with_query(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ApiError> {
        self.send(Method::GET, path, Auth::Stored, query, None).await
    }

    pub async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Value, ApiError> {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, path, Auth::Stored, &[], Some(body)).await
    }

    pub async fn put<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Value, ApiError> {
        let body = serde_json::to_value(body)?;
        self.send(Method::PUT, path, Auth::Stored, &[], Some(body)).await
    }

    pub async fn patch<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Value, ApiError> {
        let body = serde_json::to_value(body)?;
        self.send(Method::PATCH, path, Auth::Stored, &[], Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.send(Method::DELETE, path, Auth::Stored, &[], None).await
    }

    /// `DELETE` carrying a JSON body, as soft-deletes with a reason require.
    pub async fn delete_with_body<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Value, ApiError> {
        let body = serde_json::to_value(body)?;
        self.send(Method::DELETE, path, Auth::Stored, &[], Some(body)).await
    }

    /// Issue one request and decode the JSON answer.
    ///
    /// The stored credential is read here, per request. An empty success
    /// body decodes to `Value::Null`. Any non-2xx status becomes
    /// [`ApiError::Status`] carrying the backend's `message`, if it sent one.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        auth: Auth<'_>,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = self.url(path, query)?;
        debug!("{} {}", method, url.path());

        let mut request = self.http.request(method, url);
        let token = match auth {
            Auth::Stored => self.store.load()?,
            Auth::Anonymous => None,
            Auth::Bearer(token) => Some(token.to_string()),
        };
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        let payload = if bytes.is_empty() {
            Value::Null
        } else {
            match serde_json::from_slice::<Value>(&bytes) {
                Ok(value) => value,
                Err(e) if status.is_success() => return Err(ApiError::Decode(e.to_string())),
                // Proxies answer errors in HTML; the status alone is enough.
                Err(_) => Value::Null,
            }
        };

        if !status.is_success() {
            debug!("{} answered {}", path, status);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: backend_message(&payload),
            });
        }

        Ok(payload)
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        if !query.is_empty() {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())))
                .finish();
            raw.push('?');
            raw.push_str(&encoded);
        }
        Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))
    }
}
