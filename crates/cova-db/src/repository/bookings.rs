//! Booking operations

use crate::error::DbError;
use crate::models::{BOOKING_COLLECTION, Booking, NewBooking};
use crate::repository::Database;

impl Database {
    // ==================== Booking Operations ====================

    /// Insert a new booking, returning its id
    pub async fn insert_booking(&self, booking: NewBooking) -> Result<String, DbError> {
        self.insert_record(BOOKING_COLLECTION, &booking).await
    }

    /// List all bookings
    pub async fn list_bookings(&self) -> Result<Vec<Booking>, DbError> {
        self.find_as(BOOKING_COLLECTION, None).await
    }
}
