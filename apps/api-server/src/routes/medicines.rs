//! Medicine catalog (inventory screen).

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use super::{non_blank, ApiJson, ApiPath, ApiQuery, Created, Success};
use crate::auth::AuthSession;
use crate::error::ApiResult;
use crate::state::AppState;
use medicare_core::validation::parse_date;
use medicare_core::{Medicine, MedicineInput};
use medicare_db::repository::report::today;

#[derive(Debug, Deserialize)]
pub struct ExpiringQuery {
    /// `YYYY-MM-DD`, defaults to today
    pub before: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i64,
}

/// `GET /api/medicines`
pub async fn list(State(state): State<AppState>, _auth: AuthSession) -> ApiResult<Json<Vec<Medicine>>> {
    Ok(Json(state.db.medicines().list().await?))
}

/// `GET /api/medicines/expiring?before=YYYY-MM-DD`
pub async fn expiring(
    State(state): State<AppState>,
    _auth: AuthSession,
    ApiQuery(query): ApiQuery<ExpiringQuery>,
) -> ApiResult<Json<Vec<Medicine>>> {
    let before = match non_blank(query.before) {
        Some(raw) => parse_date("before", &raw)?,
        None => today(),
    };
    Ok(Json(state.db.medicines().expiring_before(before).await?))
}

/// `POST /api/medicines`
pub async fn create(
    State(state): State<AppState>,
    auth: AuthSession,
    ApiJson(input): ApiJson<MedicineInput>,
) -> ApiResult<Json<Created>> {
    let medicine = state.db.medicines().insert(&input).await?;

    info!(
        medicine_id = medicine.id,
        name = %medicine.name,
        employee_id = auth.employee.id,
        "Medicine added"
    );
    Ok(Json(Created { id: medicine.id }))
}

/// `PUT /api/medicines/{id}`
pub async fn update(
    State(state): State<AppState>,
    auth: AuthSession,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<MedicineInput>,
) -> ApiResult<Json<Medicine>> {
    let medicine = state.db.medicines().update(id, &input).await?;

    info!(medicine_id = id, version = medicine.version, employee_id = auth.employee.id, "Medicine updated");
    Ok(Json(medicine))
}

/// `PATCH /api/medicines/{id}/quantity`
pub async fn set_quantity(
    State(state): State<AppState>,
    auth: AuthSession,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<QuantityRequest>,
) -> ApiResult<Json<Success>> {
    state.db.medicines().set_quantity(id, request.quantity).await?;

    info!(medicine_id = id, quantity = request.quantity, employee_id = auth.employee.id, "Stock set");
    Ok(Success::ok())
}

/// `DELETE /api/medicines/{id}`
///
/// Refused with 409 while sales reference the medicine.
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthSession,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Success>> {
    state.db.medicines().delete(id).await?;

    info!(medicine_id = id, employee_id = auth.employee.id, "Medicine deleted");
    Ok(Success::ok())
}
