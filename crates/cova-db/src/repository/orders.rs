//! Order operations

use crate::document::Filter;
use crate::error::DbError;
use crate::models::{NewOrder, ORDER_COLLECTION, Order};
use crate::repository::Database;

impl Database {
    // ==================== Order Operations ====================

    /// Insert a new order, returning its id
    pub async fn insert_order(&self, order: NewOrder) -> Result<String, DbError> {
        self.insert_record(ORDER_COLLECTION, &order).await
    }

    /// List the orders placed by a user
    pub async fn list_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, DbError> {
        let filter = Filter::new().eq("user_id", user_id);
        self.find_as(ORDER_COLLECTION, Some(&filter)).await
    }
}
