//! Checkout and order administration endpoints.

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::OrderId;
use domain::Cart;
use serde::{Deserialize, Serialize};
use storage::{Order, OrderItem, OrderStatus, Storage};

use super::AppState;
use crate::error::ApiError;
use crate::identity::{Identity, MaybeIdentity};

// -- Request types --

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub order_id: String,
    pub total_cents: i64,
}

#[derive(Serialize)]
pub struct OrderSummaryResponse {
    pub id: String,
    pub user_id: String,
    pub total_cents: i64,
    pub status: String,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

#[derive(Serialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub summary: OrderSummaryResponse,
    pub items: Vec<OrderItemResponse>,
}

fn summary_response(order: &Order) -> OrderSummaryResponse {
    OrderSummaryResponse {
        id: order.id.to_string(),
        user_id: order.user_id.to_string(),
        total_cents: order.total.cents(),
        status: order.status.to_string(),
        created_at: order.created_at.to_rfc3339(),
    }
}

fn item_response(item: &OrderItem) -> OrderItemResponse {
    OrderItemResponse {
        product_id: item.product_id.to_string(),
        quantity: item.quantity,
        unit_price_cents: item.unit_price.cents(),
        subtotal_cents: item.subtotal().cents(),
    }
}

// -- Handlers --

/// POST /checkout — place an order from the caller's persisted cart.
#[tracing::instrument(skip(state, identity))]
pub async fn checkout<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    identity: MaybeIdentity,
) -> Result<(axum::http::StatusCode, Json<CheckoutResponse>), ApiError> {
    let mut cart = match &identity.0 {
        Some(user) => state.carts.load_for_user(user.id).await?,
        None => Cart::new(),
    };

    let receipt = state.checkout.place(identity.0.as_ref(), &mut cart).await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(CheckoutResponse {
            order_id: receipt.order_id.to_string(),
            total_cents: receipt.total.cents(),
        }),
    ))
}

/// GET /orders — list orders: all of them for admins, own otherwise.
#[tracing::instrument(skip(state, identity))]
pub async fn list<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
) -> Result<Json<Vec<OrderSummaryResponse>>, ApiError> {
    let orders = state.orders.list_orders(&identity.0).await?;
    Ok(Json(orders.iter().map(summary_response).collect()))
}

/// GET /orders/history — the caller's own order history, newest first.
#[tracing::instrument(skip(state, identity))]
pub async fn history<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
) -> Result<Json<Vec<OrderSummaryResponse>>, ApiError> {
    let orders = state.orders.history_for(identity.0.id).await?;
    Ok(Json(orders.iter().map(summary_response).collect()))
}

/// GET /orders/:id — fetch one order with its items.
#[tracing::instrument(skip(state, identity))]
pub async fn get<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let (order, items) = state.orders.get_order(&identity.0, order_id).await?;

    Ok(Json(OrderResponse {
        summary: summary_response(&order),
        items: items.iter().map(item_response).collect(),
    }))
}

/// PUT /orders/:id/status — set an order's status. Admin only.
///
/// Unknown status strings are rejected before touching storage.
#[tracing::instrument(skip(state, identity, req))]
pub async fn update_status<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderSummaryResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let status =
        OrderStatus::from_str(&req.status).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    state
        .orders
        .update_status(&identity.0, order_id, status)
        .await?;

    let (order, _) = state.orders.get_order(&identity.0, order_id).await?;
    Ok(Json(summary_response(&order)))
}

/// DELETE /orders/:id — delete an order, restoring stock. Admin only.
#[tracing::instrument(skip(state, identity))]
pub async fn delete<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, ApiError> {
    let order_id = parse_order_id(&id)?;
    state.orders.delete_order(&identity.0, order_id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(OrderId::from(uuid))
}
