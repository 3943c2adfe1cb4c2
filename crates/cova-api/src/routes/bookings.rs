//! Table booking routes

use axum::{Json, Router, extract::State, routing::get};
use cova_db::{Booking, NewBooking};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireAdmin;
use super::types::CreatedResponse;

/// POST /bookings
async fn create_booking(
    State(state): State<AppState>,
    Json(booking): Json<NewBooking>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let (date, time, guests) = (booking.date.clone(), booking.time.clone(), booking.guests);
    let id = state.db.insert_booking(booking).await?;

    info!("Booking {} received for {} at {} ({} guests)", id, date, time, guests);

    Ok(Json(CreatedResponse {
        id,
        message: Some("Booking received".to_string()),
    }))
}

/// GET /bookings (Admin only)
async fn list_bookings(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Booking>>, ApiError> {
    Ok(Json(state.db.list_bookings().await?))
}

/// Create booking routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/bookings", get(list_bookings).post(create_booking))
}
