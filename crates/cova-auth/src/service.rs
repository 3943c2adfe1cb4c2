//! Signup and login flows

use cova_db::{Database, DbError, NewUser, User, UserRole};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::jwt::TokenService;
use crate::password::{hash_password, hash_password_blocking, verify_password};
use crate::resolver::{IdentityResolver, InactiveUserPolicy};

/// Hash verified against when the email is unknown, so both paths cost the same
static DUMMY_HASH: LazyLock<Result<String, String>> =
    LazyLock::new(|| hash_password("cova-timing-equalizer").map_err(|e| e.to_string()));

/// Signup input
#[derive(Debug, Clone)]
pub struct Signup {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

/// Result of a successful signup
#[derive(Debug, Clone)]
pub struct SignupOutcome {
    pub user: User,
    pub access_token: String,
}

/// User-facing authentication operations
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    tokens: Arc<TokenService>,
    resolver: IdentityResolver,
    inactive_users: InactiveUserPolicy,
}

impl AuthService {
    pub fn new(db: Database, tokens: Arc<TokenService>, inactive_users: InactiveUserPolicy) -> Self {
        let resolver = IdentityResolver::new(tokens.clone(), db.clone(), inactive_users);
        Self {
            db,
            tokens,
            resolver,
            inactive_users,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    /// Register a new customer and issue a token for them
    pub async fn signup(&self, signup: Signup) -> Result<SignupOutcome, AuthError> {
        let result = self.create_user(signup, UserRole::Customer).await;

        match result {
            Ok(user) => {
                let access_token = self.tokens.issue(&user.email)?;
                metrics::counter!("cova_signups_total").increment(1);
                info!("User {} signed up", user.email);
                Ok(SignupOutcome { user, access_token })
            }
            Err(e) => {
                e.record();
                Err(e)
            }
        }
    }

    /// Exchange email and password for a token
    ///
    /// Unknown emails and wrong passwords fail identically.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        debug!("Login attempt for: {}", email);

        let user = self.db.get_user_by_email(email).await?;

        let stored_hash = match &user {
            Some(u) => u.password_hash.clone(),
            None => (*DUMMY_HASH).clone().map_err(AuthError::PasswordHash)?,
        };
        let password = password.to_string();
        let password_valid =
            tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
                .await
                .map_err(|e| AuthError::PasswordHash(format!("verification task failed: {}", e)))?;

        let user = match (user, password_valid) {
            (Some(u), true) if self.inactive_users.admits(&u) => u,
            (Some(u), true) => {
                warn!("Login refused for inactive user {}", u.email);
                return Err(self.reject(AuthError::InvalidCredentials));
            }
            _ => {
                warn!("Failed login for {}", email);
                return Err(self.reject(AuthError::InvalidCredentials));
            }
        };

        let token = self.tokens.issue(&user.email)?;
        metrics::counter!("cova_logins_total").increment(1);
        info!("User {} logged in successfully", user.email);
        Ok(token)
    }

    /// Verify a token and load its user
    pub async fn resolve(&self, token: &str) -> Result<User, AuthError> {
        self.resolver.resolve(token).await
    }

    /// Create an admin account unless the email is already registered
    ///
    /// Returns whether a user was created.
    pub async fn bootstrap_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<bool, AuthError> {
        let signup = Signup {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone: None,
        };

        match self.create_user(signup, UserRole::Admin).await {
            Ok(user) => {
                info!("Created admin user {}", user.email);
                Ok(true)
            }
            Err(AuthError::DuplicateIdentity) => {
                debug!("Admin user {} already exists", email);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn create_user(&self, signup: Signup, role: UserRole) -> Result<User, AuthError> {
        if self.db.get_user_by_email(&signup.email).await?.is_some() {
            return Err(AuthError::DuplicateIdentity);
        }

        let password_hash = hash_password_blocking(signup.password).await?;

        self.db
            .insert_user(NewUser {
                name: signup.name,
                email: signup.email,
                password_hash,
                phone: signup.phone,
                is_active: true,
                role,
            })
            .await
            .map_err(|e| match e {
                DbError::Duplicate(_) => AuthError::DuplicateIdentity,
                other => AuthError::Store(other),
            })
    }

    fn reject(&self, err: AuthError) -> AuthError {
        err.record();
        err
    }
}
