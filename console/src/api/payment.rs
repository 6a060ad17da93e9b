use serde_json::Value;
use shared::types::DateRange;

use super::ApiClient;
use crate::error::ApiError;

/// `/pagos`
#[derive(Clone)]
pub struct PaymentApi {
    client: ApiClient,
}

impl PaymentApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, payment: &Value) -> Result<Value, ApiError> {
        self.client.post("/pagos", payment).await
    }

    pub async fn list(&self) -> Result<Value, ApiError> {
        self.client.get("/pagos").await
    }

    pub async fn by_parking(&self, parking_id: i64) -> Result<Value, ApiError> {
        self.client.get(&format!("/pagos/parking/{}", parking_id)).await
    }

    pub async fn by_user(&self, user_id: i64) -> Result<Value, ApiError> {
        self.client.get(&format!("/pagos/usuario/{}", user_id)).await
    }

    pub async fn get(&self, id: i64) -> Result<Value, ApiError> {
        self.client.get(&format!("/pagos/{}", id)).await
    }

    pub async fn stats_by_parking(&self, parking_id: i64, range: &DateRange) -> Result<Value, ApiError> {
        self.client
            .get_with_query(&format!("/pagos/stats/parking/{}", parking_id), &range.query_pairs())
            .await
    }

    pub async fn stats(&self, range: &DateRange) -> Result<Value, ApiError> {
        self.client
            .get_with_query("/pagos/stats", &range.query_pairs())
            .await
    }
}
