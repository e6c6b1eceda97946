//! Sale history and direct sale entry.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use super::{non_blank, ApiJson, ApiQuery, Created};
use crate::auth::AuthSession;
use crate::error::ApiResult;
use crate::state::AppState;
use medicare_core::validation::parse_date;
use medicare_core::{DateRange, Sale, SaleInput, ValidationError};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DateRangeQuery {
    /// Inclusive range; a missing or blank side is open.
    pub fn resolve(self) -> Result<DateRange, ValidationError> {
        let start = non_blank(self.start_date)
            .map(|s| parse_date("startDate", &s))
            .transpose()?;
        let end = non_blank(self.end_date)
            .map(|s| parse_date("endDate", &s))
            .transpose()?;
        DateRange::new(start, end)
    }
}

/// `GET /api/sales?startDate&endDate`
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthSession,
    ApiQuery(query): ApiQuery<DateRangeQuery>,
) -> ApiResult<Json<Vec<Sale>>> {
    let range = query.resolve()?;
    Ok(Json(state.db.sales().list(range).await?))
}

/// `POST /api/sales`
///
/// Records a sale row as submitted. Stock is not touched; counter sales go
/// through the cart.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthSession,
    ApiJson(input): ApiJson<SaleInput>,
) -> ApiResult<Json<Created>> {
    let id = state.db.sales().insert(&input).await?;

    info!(
        sale_id = id,
        medicine_id = input.medicine_id,
        quantity = input.quantity,
        employee_id = auth.employee.id,
        "Sale recorded"
    );
    Ok(Json(Created { id }))
}
