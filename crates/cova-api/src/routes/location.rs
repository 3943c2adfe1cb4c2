//! Location info route

use axum::{Json, Router, extract::State, routing::get};
use cova_db::Location;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /location
async fn get_location(State(state): State<AppState>) -> Result<Json<Location>, ApiError> {
    Ok(Json(state.db.get_location().await?))
}

/// Create location routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/location", get(get_location))
}
