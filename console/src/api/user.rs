use serde_json::{Value, json};
use shared::types::{normalize_list, unwrap_data};
use tracing::debug;

use super::ApiClient;
use crate::error::ApiError;

/// `/usuarios`: account administration.
///
/// These endpoints wrap payloads as `{success, data}`; `list` and `get`
/// unwrap them so callers see the bare list or record.
#[derive(Clone)]
pub struct UserApi {
    client: ApiClient,
}

impl UserApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Value>, ApiError> {
        let users = normalize_list(self.client.get("/usuarios").await?);
        debug!("Fetched {} users", users.len());
        Ok(users)
    }

    pub async fn get(&self, id: i64) -> Result<Value, ApiError> {
        let payload = self.client.get(&format!("/usuarios/{}", id)).await?;
        Ok(unwrap_data(payload))
    }

    pub async fn update(&self, id: i64, user: &Value) -> Result<Value, ApiError> {
        self.client.put(&format!("/usuarios/{}", id), user).await
    }

    pub async fn set_blocked(&self, id: i64, bloqueado: bool) -> Result<Value, ApiError> {
        self.client
            .patch(&format!("/usuarios/{}/bloqueo", id), &json!({ "bloqueado": bloqueado }))
            .await
    }

    /// Employees not yet assigned to a lot.
    pub async fn available_employees(&self) -> Result<Value, ApiError> {
        self.client.get("/usuarios/empleados-disponibles").await
    }

    /// Soft delete; the reason is kept with the account.
    pub async fn delete(&self, id: i64, motivo_baja: &str) -> Result<Value, ApiError> {
        self.client
            .delete_with_body(&format!("/usuarios/{}", id), &json!({ "motivo_baja": motivo_baja }))
            .await
    }
}
