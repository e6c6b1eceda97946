//! Login, logout and the current employee.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiJson, Success};
use crate::auth::AuthSession;
use crate::error::ApiResult;
use crate::state::AppState;
use medicare_core::Employee;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub user: Employee,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LoginFailure {
    pub success: bool,
    pub message: &'static str,
}

/// `POST /api/login`
///
/// Unknown usernames and wrong passwords get the same 401 body.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Response> {
    let Some(employee) = state
        .db
        .employees()
        .authenticate(&request.username, &request.password)
        .await?
    else {
        info!(username = %request.username, "Login rejected");
        let body = LoginFailure {
            success: false,
            message: "Invalid credentials",
        };
        return Ok((StatusCode::UNAUTHORIZED, Json(body)).into_response());
    };

    let ttl = Duration::seconds(state.config.session_ttl_secs);
    let session = state.db.sessions().create(employee.id, ttl).await?;
    let token = state.jwt.issue(&employee, &session)?;

    info!(
        employee_id = employee.id,
        role = %employee.role,
        session_id = %session.id,
        "Login succeeded"
    );

    Ok(Json(LoginResponse {
        success: true,
        user: employee,
        token,
        expires_at: session.expires_at,
    })
    .into_response())
}

/// `POST /api/logout`
///
/// Revokes the session and throws its cart away.
pub async fn logout(State(state): State<AppState>, auth: AuthSession) -> ApiResult<Json<Success>> {
    state.db.sessions().revoke(&auth.session_id).await?;
    state.carts.discard(&auth.session_id);

    info!(employee_id = auth.employee.id, session_id = %auth.session_id, "Logged out");
    Ok(Success::ok())
}

/// `GET /api/me`
pub async fn me(auth: AuthSession) -> Json<Employee> {
    Json(auth.employee)
}
