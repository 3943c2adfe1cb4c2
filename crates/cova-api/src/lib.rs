//! COVA REST API
//!
//! This crate provides the Axum-based HTTP surface for COVA: signup and
//! login, menu, bookings, orders, location info and service diagnostics.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
