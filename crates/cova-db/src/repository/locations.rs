//! Location operations

use crate::error::DbError;
use crate::models::{LOCATION_COLLECTION, Location};
use crate::repository::Database;

impl Database {
    // ==================== Location Operations ====================

    /// First stored location, or the built-in fallback
    pub async fn get_location(&self) -> Result<Location, DbError> {
        let locations: Vec<Location> = self.find_as(LOCATION_COLLECTION, None).await?;
        Ok(locations.into_iter().next().unwrap_or_else(Location::fallback))
    }
}
