use serde_json::Value;

use super::ApiClient;
use crate::error::ApiError;

/// `/tarifas`: pricing per lot and vehicle type.
#[derive(Clone)]
pub struct TariffApi {
    client: ApiClient,
}

impl TariffApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Value, ApiError> {
        self.client.get("/tarifas").await
    }

    pub async fn by_parking(&self, parking_id: i64) -> Result<Value, ApiError> {
        self.client.get(&format!("/tarifas/parking/{}", parking_id)).await
    }

    pub async fn get(&self, id: i64) -> Result<Value, ApiError> {
        self.client.get(&format!("/tarifas/{}", id)).await
    }

    pub async fn create(&self, tariff: &Value) -> Result<Value, ApiError> {
        self.client.post("/tarifas", tariff).await
    }

    pub async fn update(&self, id: i64, tariff: &Value) -> Result<Value, ApiError> {
        self.client.put(&format!("/tarifas/{}", id), tariff).await
    }

    pub async fn delete(&self, id: i64) -> Result<Value, ApiError> {
        self.client.delete(&format!("/tarifas/{}", id)).await
    }

    pub async fn by_vehicle_type(&self, vehicle_type: &str) -> Result<Value, ApiError> {
        let segment: String = form_urlencoded::byte_serialize(vehicle_type.as_bytes()).collect();
        self.client.get(&format!("/tarifas/tipo/{}", segment)).await
    }
}
