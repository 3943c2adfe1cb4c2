//! Token to user resolution

use cova_db::{Database, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::jwt::TokenService;

/// What to do with users whose `is_active` flag is false
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InactiveUserPolicy {
    /// Treat inactive users as unknown
    #[default]
    Reject,
    /// Let inactive users through
    Admit,
}

impl InactiveUserPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            InactiveUserPolicy::Reject => "reject",
            InactiveUserPolicy::Admit => "admit",
        }
    }

    /// Whether this user may act under the policy
    pub fn admits(&self, user: &User) -> bool {
        user.is_active || *self == InactiveUserPolicy::Admit
    }
}

/// Maps a presented token to the persisted user it names
#[derive(Clone)]
pub struct IdentityResolver {
    tokens: Arc<TokenService>,
    db: Database,
    inactive_users: InactiveUserPolicy,
}

impl IdentityResolver {
    pub fn new(tokens: Arc<TokenService>, db: Database, inactive_users: InactiveUserPolicy) -> Self {
        Self {
            tokens,
            db,
            inactive_users,
        }
    }

    /// Verify the token and load its subject from the store
    ///
    /// The user record is fetched on every call and nothing but the subject
    /// is taken from the token.
    pub async fn resolve(&self, token: &str) -> Result<User, AuthError> {
        let result = self.lookup(token).await;
        if let Err(e) = &result {
            warn!("Token rejected: {}", e.reason());
            e.record();
        }
        result
    }

    async fn lookup(&self, token: &str) -> Result<User, AuthError> {
        let subject = self.tokens.verify(token)?;

        let user = self
            .db
            .get_user_by_email(&subject)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !self.inactive_users.admits(&user) {
            return Err(AuthError::InactiveUser);
        }

        debug!("Resolved user: {} ({})", user.email, user.role);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use cova_db::{NewUser, UserRole};
    use jsonwebtoken::Algorithm;

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new("test-secret-key", Algorithm::HS256, Duration::hours(24)).unwrap())
    }

    async fn db_with_user(email: &str, is_active: bool) -> Database {
        let db = Database::in_memory();
        db.insert_user(NewUser {
            name: "Ada".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            phone: None,
            is_active,
            role: UserRole::Customer,
        })
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn test_resolve_user() {
        let tokens = tokens();
        let db = db_with_user("a@x.com", true).await;
        let resolver = IdentityResolver::new(tokens.clone(), db, InactiveUserPolicy::Reject);

        let token = tokens.issue("a@x.com").unwrap();
        let user = resolver.resolve(&token).await.unwrap();
        assert_eq!(user.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_unknown_subject() {
        let tokens = tokens();
        let db = db_with_user("a@x.com", true).await;
        let resolver = IdentityResolver::new(tokens.clone(), db, InactiveUserPolicy::Reject);

        let token = tokens.issue("ghost@x.com").unwrap();
        assert!(matches!(
            resolver.resolve(&token).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_token_errors_propagate() {
        let tokens = tokens();
        let db = db_with_user("a@x.com", true).await;
        let resolver = IdentityResolver::new(tokens.clone(), db, InactiveUserPolicy::Reject);

        let expired = tokens.issue_with_ttl("a@x.com", Duration::seconds(-1)).unwrap();
        assert!(matches!(
            resolver.resolve(&expired).await,
            Err(AuthError::ExpiredToken)
        ));
        assert!(matches!(
            resolver.resolve("garbage").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_inactive_user_policy() {
        let tokens = tokens();
        let db = db_with_user("a@x.com", false).await;
        let token = tokens.issue("a@x.com").unwrap();

        let strict = IdentityResolver::new(tokens.clone(), db.clone(), InactiveUserPolicy::Reject);
        assert!(matches!(
            strict.resolve(&token).await,
            Err(AuthError::InactiveUser)
        ));

        let lenient = IdentityResolver::new(tokens.clone(), db, InactiveUserPolicy::Admit);
        let user = lenient.resolve(&token).await.unwrap();
        assert!(!user.is_active);
    }

    #[tokio::test]
    async fn test_no_store_means_unknown_user() {
        let tokens = tokens();
        let resolver =
            IdentityResolver::new(tokens.clone(), Database::unavailable(), InactiveUserPolicy::Reject);

        let token = tokens.issue("a@x.com").unwrap();
        assert!(matches!(
            resolver.resolve(&token).await,
            Err(AuthError::UserNotFound)
        ));
    }
}
