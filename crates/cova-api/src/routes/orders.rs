//! Food order routes

use axum::{Json, Router, extract::State, routing::get};
use cova_db::{NewOrder, Order, OrderStatus};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::{MaybeAuth, RequireAuth};
use super::types::{CreateOrderRequest, CreatedResponse};

/// POST /orders (anonymous or authenticated)
async fn create_order(
    MaybeAuth(user): MaybeAuth,
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let user_id = user.map(|u| u.id);

    let order = NewOrder {
        user_id: user_id.clone(),
        items: request.items,
        total: request.total,
        status: OrderStatus::Pending,
        address: request.address,
        notes: request.notes,
    };
    let id = state.db.insert_order(order).await?;

    info!(
        "Order {} placed by {}",
        id,
        user_id.as_deref().unwrap_or("anonymous")
    );

    Ok(Json(CreatedResponse {
        id,
        message: Some("Order placed".to_string()),
    }))
}

/// GET /orders (Authenticated)
async fn list_orders(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.db.list_orders_for_user(&user.id).await?))
}

/// Create order routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/orders", get(list_orders).post(create_order))
}
