use serde_json::Value;
use shared::types::DateRange;

use super::ApiClient;
use crate::error::ApiError;

/// `/estadisticas`: dashboards and reports.
///
/// The breakdowns (`ocupacion`, `reservas`, `ingresos`) cover every lot
/// unless scoped to one with `parking_id`.
#[derive(Clone)]
pub struct StatisticsApi {
    client: ApiClient,
}

impl StatisticsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn general(&self, range: &DateRange) -> Result<Value, ApiError> {
        self.client
            .get_with_query("/estadisticas/general", &range.query_pairs())
            .await
    }

    pub async fn by_parking(&self, parking_id: i64, range: &DateRange) -> Result<Value, ApiError> {
        self.client
            .get_with_query(&format!("/estadisticas/parking/{}", parking_id), &range.query_pairs())
            .await
    }

    pub async fn occupancy(&self, parking_id: Option<i64>, range: &DateRange) -> Result<Value, ApiError> {
        self.breakdown("ocupacion", parking_id, range).await
    }

    pub async fn reservations(&self, parking_id: Option<i64>, range: &DateRange) -> Result<Value, ApiError> {
        self.breakdown("reservas", parking_id, range).await
    }

    pub async fn revenue(&self, parking_id: Option<i64>, range: &DateRange) -> Result<Value, ApiError> {
        self.breakdown("ingresos", parking_id, range).await
    }

    /// Custom report; `filters` is passed through untouched.
    pub async fn report(&self, filters: &Value) -> Result<Value, ApiError> {
        self.client.post("/estadisticas/reporte", filters).await
    }

    async fn breakdown(
        &self,
        kind: &str,
        parking_id: Option<i64>,
        range: &DateRange,
    ) -> Result<Value, ApiError> {
        let path = match parking_id {
            Some(id) => format!("/estadisticas/{}/parking/{}", kind, id),
            None => format!("/estadisticas/{}", kind),
        };
        self.client.get_with_query(&path, &range.query_pairs()).await
    }
}
