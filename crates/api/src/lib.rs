//! HTTP API server with observability for the storefront.
//!
//! Provides REST endpoints for the catalog, shopping carts, checkout,
//! and order administration, with structured logging (tracing) and
//! Prometheus metrics. Caller identity arrives in `x-user-id` and
//! `x-user-role` headers.

pub mod config;
pub mod error;
pub mod identity;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use storage::Storage;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Storage + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/products", get(routes::products::list::<S>))
        .route("/products", post(routes::products::create::<S>))
        .route("/products/{id}", get(routes::products::get::<S>))
        .route("/products/{id}", put(routes::products::update::<S>))
        .route("/products/{id}", delete(routes::products::delete::<S>))
        .route("/cart", get(routes::cart::get::<S>))
        .route("/cart", delete(routes::cart::clear::<S>))
        .route("/cart/items", post(routes::cart::add_item::<S>))
        .route("/cart/items/{id}", put(routes::cart::set_quantity::<S>))
        .route("/cart/items/{id}", delete(routes::cart::remove_item::<S>))
        .route("/checkout", post(routes::orders::checkout::<S>))
        .route("/orders", get(routes::orders::list::<S>))
        .route("/orders/history", get(routes::orders::history::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/orders/{id}/status", put(routes::orders::update_status::<S>))
        .route("/orders/{id}", delete(routes::orders::delete::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state around a storage backend.
pub fn create_state<S: Storage + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState::new(store))
}
