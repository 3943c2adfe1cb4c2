//! User operations

use tracing::debug;

use crate::document::Filter;
use crate::error::DbError;
use crate::models::{NewUser, USER_COLLECTION, User};
use crate::repository::Database;
use crate::utils::normalize_email;

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    ///
    /// The email is stored with its domain lowercased.
    pub async fn insert_user(&self, mut user: NewUser) -> Result<User, DbError> {
        user.email = normalize_email(&user.email);

        // Check if user already exists
        if self.get_user_by_email(&user.email).await?.is_some() {
            return Err(DbError::Duplicate(format!("User '{}' already exists", user.email)));
        }

        let id = self.insert_record(USER_COLLECTION, &user).await?;
        debug!("Inserted user {} ({})", user.email, id);

        Ok(User {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            phone: user.phone,
            is_active: user.is_active,
            role: user.role,
        })
    }

    /// Get a user by email, ignoring the case of its domain
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let email = normalize_email(email);
        self.find_one_as(USER_COLLECTION, &Filter::new().eq("email", email))
            .await
    }
}
