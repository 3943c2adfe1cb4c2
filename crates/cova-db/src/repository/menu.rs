//! Menu operations

use crate::document::Filter;
use crate::error::DbError;
use crate::models::{MENU_COLLECTION, MenuItem, NewMenuItem};
use crate::repository::Database;

/// Optional filters for listing the menu
#[derive(Debug, Clone, Default)]
pub struct MenuQuery {
    pub category: Option<String>,
    pub bestseller: Option<bool>,
}

impl MenuQuery {
    fn to_filter(&self) -> Filter {
        let mut filter = Filter::new();
        // An empty category means no category filter
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            filter = filter.eq("category", category);
        }
        if let Some(bestseller) = self.bestseller {
            filter = filter.eq("is_bestseller", bestseller);
        }
        filter
    }
}

impl Database {
    // ==================== Menu Operations ====================

    /// Insert a new menu item, returning its id
    pub async fn insert_menu_item(&self, item: NewMenuItem) -> Result<String, DbError> {
        self.insert_record(MENU_COLLECTION, &item).await
    }

    /// List menu items matching the query
    pub async fn list_menu_items(&self, query: &MenuQuery) -> Result<Vec<MenuItem>, DbError> {
        let filter = query.to_filter();
        self.find_as(MENU_COLLECTION, Some(&filter)).await
    }
}
