//! Request/Response DTOs

use cova_db::{OrderItem, User};
use serde::{Deserialize, Serialize};

// ==================== Auth Types ====================

/// Signup request
#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Signup response
#[derive(Serialize, Deserialize)]
pub struct SignupResponse {
    pub user_id: String,
    pub access_token: String,
    pub token_type: String,
}

/// OAuth2 password-grant style login form; `username` carries the email
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Token response
#[derive(Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// User response (without password hash)
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            is_active: user.is_active,
            role: user.role.as_str().to_string(),
        }
    }
}

// ==================== Menu Types ====================

/// Menu listing filters
#[derive(Deserialize, Default)]
pub struct MenuParams {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub bestseller: Option<bool>,
}

// ==================== Order Types ====================

/// Create order request
///
/// Ownership is taken from the bearer token, never from the body.
#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItem>,
    pub total: f64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// ==================== Shared ====================

/// Id of a newly created document
#[derive(Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
