//! Product catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};
use storage::{Product, Storage};

use super::AppState;
use crate::error::ApiError;
use crate::identity::Identity;

// -- Request types --

#[derive(Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub price_cents: i64,
    pub quantity: u32,
    pub image: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub quantity: u32,
    pub image: Option<String>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name,
            price_cents: product.price.cents(),
            quantity: product.quantity,
            image: product.image,
        }
    }
}

// -- Handlers --

/// GET /products — list the catalog.
#[tracing::instrument(skip(state))]
pub async fn list<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.store.list_products().await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// GET /products/:id — fetch one product.
#[tracing::instrument(skip(state))]
pub async fn get<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id = parse_product_id(&id)?;
    let product = state
        .store
        .get_product(product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {id} not found")))?;

    Ok(Json(product.into()))
}

/// POST /products — add a product to the catalog. Admin only.
#[tracing::instrument(skip(state, identity, req))]
pub async fn create<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Json(req): Json<ProductRequest>,
) -> Result<(axum::http::StatusCode, Json<ProductResponse>), ApiError> {
    require_admin(&identity)?;

    let mut product = Product::new(req.name, Money::from_cents(req.price_cents), req.quantity);
    product.image = req.image;
    state.store.insert_product(&product).await?;

    Ok((axum::http::StatusCode::CREATED, Json(product.into())))
}

/// PUT /products/:id — replace a product's fields. Admin only.
#[tracing::instrument(skip(state, identity, req))]
pub async fn update<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<String>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    require_admin(&identity)?;

    let product = Product {
        id: parse_product_id(&id)?,
        name: req.name,
        price: Money::from_cents(req.price_cents),
        quantity: req.quantity,
        image: req.image,
    };

    let affected = state.store.update_product(&product).await?;
    if affected == 0 {
        return Err(ApiError::NotFound(format!("Product {id} not found")));
    }

    Ok(Json(product.into()))
}

/// DELETE /products/:id — remove a product. Admin only.
#[tracing::instrument(skip(state, identity))]
pub async fn delete<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, ApiError> {
    require_admin(&identity)?;

    let affected = state.store.delete_product(parse_product_id(&id)?).await?;
    if affected == 0 {
        return Err(ApiError::NotFound(format!("Product {id} not found")));
    }

    Ok(axum::http::StatusCode::NO_CONTENT)
}

fn require_admin(identity: &Identity) -> Result<(), ApiError> {
    if identity.0.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "administrator role required".to_string(),
        ))
    }
}

pub(crate) fn parse_product_id(id: &str) -> Result<ProductId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(ProductId::from(uuid))
}
