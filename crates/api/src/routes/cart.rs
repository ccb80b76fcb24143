//! Shopping cart endpoints.
//!
//! Every request loads the caller's persisted cart, applies the change,
//! and writes the cart back, so carts survive across sessions.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use domain::{Cart, Fulfillment};
use serde::{Deserialize, Serialize};
use storage::Storage;

use super::AppState;
use super::products::parse_product_id;
use crate::error::ApiError;
use crate::identity::Identity;

// -- Request types --

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: u32,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartLineResponse {
    pub product_id: String,
    pub product_name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub subtotal_cents: i64,
    pub image: Option<String>,
}

#[derive(Serialize)]
pub struct CartResponse {
    pub lines: Vec<CartLineResponse>,
    pub total_cents: i64,
}

#[derive(Serialize)]
pub struct CartMutationResponse {
    pub fulfillment: Fulfillment,
    pub cart: CartResponse,
}

fn cart_response(cart: &Cart) -> CartResponse {
    CartResponse {
        lines: cart
            .lines()
            .map(|line| CartLineResponse {
                product_id: line.product_id.to_string(),
                product_name: line.product_name.clone(),
                unit_price_cents: line.unit_price.cents(),
                quantity: line.quantity,
                subtotal_cents: line.subtotal().cents(),
                image: line.image.clone(),
            })
            .collect(),
        total_cents: cart.total().cents(),
    }
}

// -- Handlers --

/// GET /cart — the caller's cart with line subtotals and total.
#[tracing::instrument(skip(state, identity))]
pub async fn get<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.carts.load_for_user(identity.0.id).await?;
    Ok(Json(cart_response(&cart)))
}

/// POST /cart/items — add a product to the cart.
///
/// Responds with the applied fulfillment so clients can tell the
/// shopper when stock limited the quantity.
#[tracing::instrument(skip(state, identity, req))]
pub async fn add_item<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartMutationResponse>, ApiError> {
    let product_id = parse_product_id(&req.product_id)?;

    let mut cart = state.carts.load_for_user(identity.0.id).await?;
    let fulfillment = state.carts.add(&mut cart, product_id, req.quantity).await?;
    state.carts.persist_for_user(identity.0.id, &cart).await?;

    Ok(Json(CartMutationResponse {
        fulfillment,
        cart: cart_response(&cart),
    }))
}

/// PUT /cart/items/:id — set a line's quantity. Zero removes the line.
#[tracing::instrument(skip(state, identity, req))]
pub async fn set_quantity<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<String>,
    Json(req): Json<SetQuantityRequest>,
) -> Result<Json<CartMutationResponse>, ApiError> {
    let product_id = parse_product_id(&id)?;

    let mut cart = state.carts.load_for_user(identity.0.id).await?;
    let fulfillment = state
        .carts
        .update_quantity(&mut cart, product_id, req.quantity)
        .await?;
    state.carts.persist_for_user(identity.0.id, &cart).await?;

    Ok(Json(CartMutationResponse {
        fulfillment,
        cart: cart_response(&cart),
    }))
}

/// DELETE /cart/items/:id — remove a line from the cart.
#[tracing::instrument(skip(state, identity))]
pub async fn remove_item<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let product_id = parse_product_id(&id)?;

    let mut cart = state.carts.load_for_user(identity.0.id).await?;
    cart.remove(product_id)?;
    state.carts.persist_for_user(identity.0.id, &cart).await?;

    Ok(Json(cart_response(&cart)))
}

/// DELETE /cart — empty the caller's cart.
#[tracing::instrument(skip(state, identity))]
pub async fn clear<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = Cart::new();
    state.carts.persist_for_user(identity.0.id, &cart).await?;
    Ok(Json(cart_response(&cart)))
}
