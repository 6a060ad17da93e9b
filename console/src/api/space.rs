use serde_json::{Value, json};

use super::ApiClient;
use crate::error::ApiError;

/// `/espacio`: individual parking spaces.
#[derive(Clone)]
pub struct SpaceApi {
    client: ApiClient,
}

impl SpaceApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Value, ApiError> {
        self.client.get("/espacio").await
    }

    pub async fn by_parking(&self, parking_id: i64) -> Result<Value, ApiError> {
        self.client.get(&format!("/espacio/parking/{}", parking_id)).await
    }

    pub async fn available_by_parking(&self, parking_id: i64) -> Result<Value, ApiError> {
        self.client
            .get(&format!("/espacio/parking/{}/disponibles", parking_id))
            .await
    }

    pub async fn create(&self, space: &Value) -> Result<Value, ApiError> {
        self.client.post("/espacio", space).await
    }

    pub async fn update(&self, id: i64, space: &Value) -> Result<Value, ApiError> {
        self.client.put(&format!("/espacio/{}", id), space).await
    }

    /// Set the occupancy state (`libre`, `ocupado`, `reservado`, ...).
    pub async fn set_state(&self, id: i64, estado: &str) -> Result<Value, ApiError> {
        self.client
            .patch(&format!("/espacio/{}/estado", id), &json!({ "estado": estado }))
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<Value, ApiError> {
        self.client.delete(&format!("/espacio/{}", id)).await
    }
}
