//! # Routes
//!
//! The `/api` surface, one module per screen of the front end.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────────┐
//! │  /api                                                                  │
//! │  ├── auth       POST /login  POST /logout  GET /me                    │
//! │  ├── employees  GET|POST /employees  DELETE /employees/{id}   (admin) │
//! │  ├── medicines  GET|POST /medicines  GET /medicines/expiring          │
//! │  │              PUT|DELETE /medicines/{id}  PATCH .../quantity        │
//! │  ├── sales      GET|POST /sales                                       │
//! │  ├── cart       GET|DELETE /cart  POST /cart/items                    │
//! │  │              DELETE /cart/items/{index}  GET /cart/receipt         │
//! │  │              POST /cart/checkout                                   │
//! │  ├── reports    GET /reports                                          │
//! │  └── health     GET /health                                           │
//! └────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::{FromRequest, FromRequestParts};
use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod employees;
pub mod health;
pub mod medicines;
pub mod reports;
pub mod sales;

/// JSON body whose rejection renders as an [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string whose rejection renders as an [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path parameters whose rejection renders as an [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// `{ "success": true }`
#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub fn ok() -> axum::Json<Success> {
        axum::Json(Success { success: true })
    }
}

/// `{ "id": 42 }`
#[derive(Debug, Serialize)]
pub struct Created {
    pub id: i64,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/employees", get(employees::list).post(employees::create))
        .route("/employees/{id}", delete(employees::remove))
        .route("/medicines", get(medicines::list).post(medicines::create))
        .route("/medicines/expiring", get(medicines::expiring))
        .route("/medicines/{id}", put(medicines::update).delete(medicines::remove))
        .route("/medicines/{id}/quantity", patch(medicines::set_quantity))
        .route("/sales", get(sales::list).post(sales::create))
        .route("/cart", get(cart::show).delete(cart::abandon))
        .route("/cart/items", post(cart::add_item))
        .route("/cart/items/{index}", delete(cart::remove_item))
        .route("/cart/receipt", get(cart::receipt))
        .route("/cart/checkout", post(cart::checkout))
        .route("/reports", get(reports::generate))
        .route("/health", get(health::check));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Treats an absent or blank query value as unset.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
