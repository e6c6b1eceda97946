//! Employee roster. Reading is open to any session, changes need an admin.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use tracing::info;

use super::{ApiJson, ApiPath, Created, Success};
use crate::auth::{AdminSession, AuthSession};
use crate::error::ApiResult;
use crate::state::AppState;
use medicare_core::{Employee, EmployeeInput};

/// `GET /api/employees`
pub async fn list(State(state): State<AppState>, _auth: AuthSession) -> ApiResult<Json<Vec<Employee>>> {
    Ok(Json(state.db.employees().list().await?))
}

/// `POST /api/employees`
pub async fn create(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    ApiJson(input): ApiJson<EmployeeInput>,
) -> ApiResult<Json<Created>> {
    let employee = state.db.employees().insert(&input).await?;

    info!(
        employee_id = employee.id,
        role = %employee.role,
        created_by = admin.employee.id,
        "Employee created"
    );
    Ok(Json(Created { id: employee.id }))
}

/// `DELETE /api/employees/{id}`
///
/// The employee's sessions and carts go with them; their past sales stay,
/// unattributed. The last administrator cannot be deleted (409).
pub async fn remove(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Success>> {
    state.db.employees().delete(id).await?;
    state.sweep_carts(Utc::now()).await?;

    info!(employee_id = id, deleted_by = admin.employee.id, "Employee deleted");
    Ok(Success::ok())
}
