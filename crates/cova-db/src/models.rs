//! Database models
//!
//! Every entity has a stored form (carrying the id assigned by the store)
//! and a `New*` form used for insertion. Both are validated: the `New*`
//! form before it is written, the stored form after it is read back.

use crate::utils::{check_booking_date, check_booking_time, check_non_negative, is_valid_email};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Collection names
pub const USER_COLLECTION: &str = "user";
pub const MENU_COLLECTION: &str = "menuitem";
pub const ORDER_COLLECTION: &str = "order";
pub const BOOKING_COLLECTION: &str = "booking";
pub const LOCATION_COLLECTION: &str = "location";

/// All collections known to the service, in display order
pub const COLLECTIONS: [&str; 5] = [
    USER_COLLECTION,
    MENU_COLLECTION,
    ORDER_COLLECTION,
    BOOKING_COLLECTION,
    LOCATION_COLLECTION,
];

/// Maximum party size for a table booking
pub const MAX_GUESTS: u32 = 20;

/// Constraint check applied at the store boundary
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

// ==================== Users ====================

/// User role
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Customer,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_true() -> bool {
    true
}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Unique; doubles as the token subject
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub role: UserRole,
}

/// New user (for insertion)
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub role: UserRole,
}

fn validate_user_fields(name: &str, email: &str, password_hash: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name cannot be empty".to_string());
    }
    if !is_valid_email(email) {
        return Err(format!("invalid email address: {}", email));
    }
    if password_hash.is_empty() {
        return Err("password hash cannot be empty".to_string());
    }
    Ok(())
}

impl Validate for User {
    fn validate(&self) -> Result<(), String> {
        validate_user_fields(&self.name, &self.email, &self.password_hash)
    }
}

impl Validate for NewUser {
    fn validate(&self) -> Result<(), String> {
        validate_user_fields(&self.name, &self.email, &self.password_hash)
    }
}

// ==================== Menu ====================

/// Menu item model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    /// Category like Starters, Mains, Desserts
    pub category: String,
    /// Image URL
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_bestseller: bool,
}

/// New menu item (for insertion)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMenuItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_bestseller: bool,
}

fn validate_menu_fields(name: &str, price: f64, category: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name cannot be empty".to_string());
    }
    if category.trim().is_empty() {
        return Err("category cannot be empty".to_string());
    }
    check_non_negative("price", price)
}

impl Validate for MenuItem {
    fn validate(&self) -> Result<(), String> {
        validate_menu_fields(&self.name, self.price, &self.category)
    }
}

impl Validate for NewMenuItem {
    fn validate(&self) -> Result<(), String> {
        validate_menu_fields(&self.name, self.price, &self.category)
    }
}

// ==================== Orders ====================

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    OutForDelivery,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::OutForDelivery => "out-for-delivery",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_quantity() -> u32 {
    1
}

/// A line of an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Menu item ID
    pub item_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// Order model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    /// Owner, absent for anonymous orders
    #[serde(default)]
    pub user_id: Option<String>,
    pub items: Vec<OrderItem>,
    pub total: f64,
    #[serde(default)]
    pub status: OrderStatus,
    /// Delivery address
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// New order (for insertion)
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub user_id: Option<String>,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub status: OrderStatus,
    pub address: Option<String>,
    pub notes: Option<String>,
}

fn validate_order_fields(items: &[OrderItem], total: f64) -> Result<(), String> {
    for item in items {
        if item.item_id.is_empty() {
            return Err("item_id cannot be empty".to_string());
        }
        if item.quantity < 1 {
            return Err(format!("quantity for {} must be at least 1", item.item_id));
        }
    }
    check_non_negative("total", total)
}

impl Validate for Order {
    fn validate(&self) -> Result<(), String> {
        validate_order_fields(&self.items, self.total)
    }
}

impl Validate for NewOrder {
    fn validate(&self) -> Result<(), String> {
        validate_order_fields(&self.items, self.total)
    }
}

// ==================== Bookings ====================

/// Table booking model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    /// YYYY-MM-DD
    pub date: String,
    /// HH:MM
    pub time: String,
    pub guests: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

/// New booking (for insertion)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub date: String,
    pub time: String,
    pub guests: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

fn validate_booking_fields(
    email: Option<&str>,
    date: &str,
    time: &str,
    guests: u32,
) -> Result<(), String> {
    if let Some(email) = email
        && !is_valid_email(email)
    {
        return Err(format!("invalid email address: {}", email));
    }
    check_booking_date(date)?;
    check_booking_time(time)?;
    if !(1..=MAX_GUESTS).contains(&guests) {
        return Err(format!("guests must be between 1 and {}", MAX_GUESTS));
    }
    Ok(())
}

impl Validate for Booking {
    fn validate(&self) -> Result<(), String> {
        validate_booking_fields(self.email.as_deref(), &self.date, &self.time, self.guests)
    }
}

impl Validate for NewBooking {
    fn validate(&self) -> Result<(), String> {
        validate_booking_fields(self.email.as_deref(), &self.date, &self.time, self.guests)
    }
}

// ==================== Location ====================

/// Restaurant location and contact info (single document collection)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub phone: String,
    pub opening_hours: String,
}

impl Location {
    /// Location served when none has been stored
    pub fn fallback() -> Self {
        Self {
            id: None,
            address: "123 COVA Street, Food City".to_string(),
            lat: 40.7128,
            lng: -74.0060,
            phone: "+1 (555) 123-4567".to_string(),
            opening_hours: "Mon-Sun: 10:00 - 22:00".to_string(),
        }
    }
}

impl Validate for Location {
    fn validate(&self) -> Result<(), String> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(format!("latitude out of range: {}", self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(format!("longitude out of range: {}", self.lng));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_booking() -> NewBooking {
        NewBooking {
            name: "Ada".to_string(),
            phone: "555-0100".to_string(),
            email: None,
            date: "2025-03-14".to_string(),
            time: "19:30".to_string(),
            guests: 4,
            notes: None,
        }
    }

    #[test]
    fn test_user_role_serde() {
        let role: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, UserRole::Admin);
        assert_eq!(UserRole::default(), UserRole::Customer);
        assert_eq!(UserRole::Customer.to_string(), "customer");
        assert!(serde_json::from_str::<UserRole>("\"root\"").is_err());
    }

    #[test]
    fn test_order_status_serde() {
        let status: OrderStatus = serde_json::from_str("\"out-for-delivery\"").unwrap();
        assert_eq!(status, OrderStatus::OutForDelivery);
        assert_eq!(status.to_string(), "out-for-delivery");
        assert!(serde_json::from_str::<OrderStatus>("\"lost\"").is_err());
    }

    #[test]
    fn test_user_defaults_on_decode() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "name": "Ada",
            "email": "ada@example.com",
            "password_hash": "$argon2id$..."
        }))
        .unwrap();

        assert!(user.is_active);
        assert_eq!(user.role, UserRole::Customer);
        assert_eq!(user.phone, None);
    }

    #[test]
    fn test_booking_validation() {
        assert!(new_booking().validate().is_ok());

        let mut too_many = new_booking();
        too_many.guests = MAX_GUESTS + 1;
        assert!(too_many.validate().is_err());

        let mut nobody = new_booking();
        nobody.guests = 0;
        assert!(nobody.validate().is_err());

        let mut bad_date = new_booking();
        bad_date.date = "14/03/2025".to_string();
        assert!(bad_date.validate().is_err());

        let mut bad_time = new_booking();
        bad_time.time = "7pm".to_string();
        assert!(bad_time.validate().is_err());

        let mut bad_email = new_booking();
        bad_email.email = Some("not-an-email".to_string());
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_menu_and_order_validation() {
        let item = NewMenuItem {
            name: "Soup".to_string(),
            description: None,
            price: -1.0,
            category: "Starters".to_string(),
            image: None,
            is_bestseller: false,
        };
        assert!(item.validate().is_err());

        let order = NewOrder {
            user_id: None,
            items: vec![OrderItem {
                item_id: "m1".to_string(),
                quantity: 0,
            }],
            total: 10.0,
            status: OrderStatus::Pending,
            address: None,
            notes: None,
        };
        assert!(order.validate().is_err());
    }

    #[test]
    fn test_fallback_location_is_valid() {
        let location = Location::fallback();
        assert!(location.validate().is_ok());
        assert_eq!(location.address, "123 COVA Street, Food City");
    }
}
