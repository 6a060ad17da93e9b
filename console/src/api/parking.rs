use serde_json::{Value, json};

use super::ApiClient;
use crate::error::ApiError;

/// `/parking`: lots and their staff.
#[derive(Clone)]
pub struct ParkingApi {
    client: ApiClient,
}

impl ParkingApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Value, ApiError> {
        self.client.get("/parking").await
    }

    pub async fn get(&self, id: i64) -> Result<Value, ApiError> {
        self.client.get(&format!("/parking/{}", id)).await
    }

    pub async fn create(&self, parking: &Value) -> Result<Value, ApiError> {
        self.client.post("/parking", parking).await
    }

    pub async fn update(&self, id: i64, parking: &Value) -> Result<Value, ApiError> {
        self.client.put(&format!("/parking/{}", id), parking).await
    }

    pub async fn delete(&self, id: i64) -> Result<Value, ApiError> {
        self.client.delete(&format!("/parking/{}", id)).await
    }

    pub async fn stats(&self, id: i64) -> Result<Value, ApiError> {
        self.client.get(&format!("/parking/{}/stats", id)).await
    }

    pub async fn assign_employee(&self, parking_id: i64, employee_id: i64) -> Result<Value, ApiError> {
        self.client
            .post(
                &format!("/parking/{}/assign-employee", parking_id),
                &json!({ "employeeId": employee_id }),
            )
            .await
    }
}
