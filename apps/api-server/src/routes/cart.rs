//! # Cart and Checkout
//!
//! ```text
//! ┌──────────┐  POST /cart/items   ┌──────────┐  POST /cart/checkout  ┌─────────┐
//! │  Empty   │────────────────────►│ Building │──────────────────────►│ Settled │
//! └──────────┘                     └──────────┘   commit succeeded    └─────────┘
//!      ▲                             │   │  ▲                              │
//!      │        DELETE /cart, logout │   │  │ DELETE /cart/items/{index}   │
//!      │        (Abandoned)          │   └──┘ CheckoutAborted keeps cart   │
//!      └─────────────────────────────┴─────────────────────────────────────┘
//! ```
//!
//! The stock check at add time is advisory. The authoritative check runs
//! inside the commit transaction.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{non_blank, ApiJson, ApiPath, ApiQuery, Success};
use crate::auth::AuthSession;
use crate::error::ApiResult;
use crate::state::AppState;
use medicare_core::{Cart, CartTotals, CheckoutPlan, CoreError, PaymentMethod, Receipt};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub medicine_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptQuery {
    pub payment_method: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// `GET /api/cart`
pub async fn show(State(state): State<AppState>, auth: AuthSession) -> Json<CartTotals> {
    match state.carts.existing(&auth.session_id) {
        Some(cart) => {
            let cart = cart.lock().await;
            Json(CartTotals::from(&*cart))
        }
        None => Json(CartTotals::from(&Cart::new())),
    }
}

/// `POST /api/cart/items`
pub async fn add_item(
    State(state): State<AppState>,
    auth: AuthSession,
    ApiJson(request): ApiJson<AddItemRequest>,
) -> ApiResult<Json<CartTotals>> {
    let medicine = state
        .db
        .medicines()
        .get_by_id(request.medicine_id)
        .await?
        .ok_or(CoreError::MedicineNotFound(request.medicine_id))?;

    let cart = state.carts.cart(&auth.session_id);
    let mut cart = cart.lock().await;
    cart.add(&medicine, request.quantity)?;

    debug!(
        session_id = %auth.session_id,
        medicine_id = medicine.id,
        quantity = request.quantity,
        lines = cart.line_count(),
        "Cart line added"
    );
    Ok(Json(CartTotals::from(&*cart)))
}

/// `DELETE /api/cart/items/{index}`
pub async fn remove_item(
    State(state): State<AppState>,
    auth: AuthSession,
    ApiPath(index): ApiPath<usize>,
) -> ApiResult<Json<CartTotals>> {
    let cart = state
        .carts
        .existing(&auth.session_id)
        .ok_or(CoreError::CartLineNotFound { index })?;
    let mut cart = cart.lock().await;
    let removed = cart.remove(index)?;

    debug!(session_id = %auth.session_id, index, medicine_id = removed.medicine_id, "Cart line removed");
    Ok(Json(CartTotals::from(&*cart)))
}

/// `DELETE /api/cart`
pub async fn abandon(State(state): State<AppState>, auth: AuthSession) -> Json<Success> {
    if state.carts.discard(&auth.session_id) {
        debug!(session_id = %auth.session_id, "Cart abandoned");
    }
    Success::ok()
}

/// `GET /api/cart/receipt?paymentMethod=cash`
///
/// Preview only; nothing is written.
pub async fn receipt(
    State(state): State<AppState>,
    auth: AuthSession,
    ApiQuery(query): ApiQuery<ReceiptQuery>,
) -> ApiResult<Json<Receipt>> {
    let payment_method = match non_blank(query.payment_method) {
        Some(raw) => raw.parse::<PaymentMethod>()?,
        None => PaymentMethod::default(),
    };

    let now = Utc::now();
    let prefix = &state.config.currency_prefix;
    let receipt = match state.carts.existing(&auth.session_id) {
        Some(cart) => {
            let cart = cart.lock().await;
            Receipt::preview(&cart, payment_method, now, prefix)
        }
        None => Receipt::preview(&Cart::new(), payment_method, now, prefix),
    };
    Ok(Json(receipt))
}

/// `POST /api/cart/checkout`
///
/// Commits every line or none. The cart is cleared only after the
/// transaction commits; an aborted checkout leaves it for the user to fix.
pub async fn checkout(
    State(state): State<AppState>,
    auth: AuthSession,
    ApiJson(request): ApiJson<CheckoutRequest>,
) -> ApiResult<Json<Receipt>> {
    let cart = state
        .carts
        .existing(&auth.session_id)
        .ok_or(CoreError::EmptyCart)?;
    let mut cart = cart.lock().await;

    let plan = CheckoutPlan::from_cart(&cart, request.payment_method)?;
    let committed = match state
        .db
        .sales()
        .commit_checkout(&plan, Some(auth.employee.id))
        .await
    {
        Ok(committed) => committed,
        Err(e) => {
            warn!(session_id = %auth.session_id, error = %e, "Checkout failed, cart kept");
            return Err(e.into());
        }
    };
    cart.clear();

    info!(
        receipt_number = %committed.receipt_number,
        employee_id = auth.employee.id,
        lines = plan.lines.len(),
        total = %plan.total,
        payment_method = %plan.payment_method,
        "Checkout settled"
    );

    Ok(Json(Receipt::settled(
        &plan,
        committed.receipt_number,
        committed.committed_at,
        &state.config.currency_prefix,
    )))
}
