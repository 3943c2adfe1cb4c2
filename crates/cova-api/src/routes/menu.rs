//! Menu routes

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use cova_db::{MenuItem, MenuQuery, NewMenuItem};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireAdmin;
use super::types::{CreatedResponse, MenuParams};

/// POST /menu (Admin only)
async fn add_menu_item(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(item): Json<NewMenuItem>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let name = item.name.clone();
    let id = state.db.insert_menu_item(item).await?;

    info!("Menu item '{}' added by {}", name, admin.email);

    Ok(Json(CreatedResponse { id, message: None }))
}

/// GET /menu
async fn list_menu(
    State(state): State<AppState>,
    Query(params): Query<MenuParams>,
) -> Result<Json<Vec<MenuItem>>, ApiError> {
    let items = state
        .db
        .list_menu_items(&MenuQuery {
            category: params.category,
            bestseller: params.bestseller,
        })
        .await?;

    Ok(Json(items))
}

/// Create menu routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/menu", get(list_menu).post(add_menu_item))
}
