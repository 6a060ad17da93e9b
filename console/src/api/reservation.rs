use serde_json::{Value, json};
use shared::types::ReservationStatus;

use super::ApiClient;
use crate::error::ApiError;

/// `/reserva`
#[derive(Clone)]
pub struct ReservationApi {
    client: ApiClient,
}

impl ReservationApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Value, ApiError> {
        self.client.get("/reserva").await
    }

    pub async fn by_parking(&self, parking_id: i64) -> Result<Value, ApiError> {
        self.client.get(&format!("/reserva/parking/{}", parking_id)).await
    }

    pub async fn get(&self, id: i64) -> Result<Value, ApiError> {
        self.client.get(&format!("/reserva/{}", id)).await
    }

    /// Mark the customer as arrived.
    pub async fn confirm_arrival(&self, id: i64) -> Result<Value, ApiError> {
        self.client
            .patch(&format!("/reserva/{}/confirmar-llegada", id), &json!({}))
            .await
    }

    pub async fn set_status(&self, id: i64, status: ReservationStatus) -> Result<Value, ApiError> {
        self.client
            .patch(&format!("/reserva/{}/estado", id), &json!({ "estado": status }))
            .await
    }

    pub async fn history(&self) -> Result<Value, ApiError> {
        self.client.get("/reserva/historial").await
    }
}
