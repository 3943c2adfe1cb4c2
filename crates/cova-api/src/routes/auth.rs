//! Authentication extractors and routes

use axum::{
    Form, Json, Router,
    extract::{FromRef, FromRequestParts, State},
    http::request::Parts,
    routing::{get, post},
};
use cova_auth::{AuthError, Signup, bearer_from_headers, require_role};
use cova_db::{User, UserRole, utils::is_valid_email};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{LoginForm, SignupRequest, SignupResponse, TokenResponse, UserResponse};

// ==================== Auth Extractors ====================

/// Extractor for authenticated user (required)
pub struct RequireAuth(pub User);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let MaybeAuth(user) = MaybeAuth::from_request_parts(parts, state).await?;

        match user {
            Some(user) => Ok(RequireAuth(user)),
            None => {
                let err = AuthError::MissingAuthHeader;
                err.record();
                Err(err.into())
            }
        }
    }
}

/// Extractor for admin user (required)
pub struct RequireAdmin(pub User);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        require_role(&user, UserRole::Admin)?;
        Ok(RequireAdmin(user))
    }
}

/// Extractor for an optional user
///
/// No authorization header means anonymous; a header that is present must
/// carry a valid token.
pub struct MaybeAuth(pub Option<User>);

impl<S> FromRequestParts<S> for MaybeAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = bearer_from_headers(&parts.headers).inspect_err(AuthError::record)?;
        let Some(token) = token else {
            return Ok(MaybeAuth(None));
        };

        let user = app_state.auth.resolve(token).await?;
        debug!("Authenticated user: {} ({})", user.email, user.role);
        Ok(MaybeAuth(Some(user)))
    }
}

// ==================== Input Validation ====================

/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

fn validate_signup(request: &SignupRequest) -> Result<(), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name cannot be empty".to_string()));
    }
    if !is_valid_email(&request.email) {
        return Err(ApiError::BadRequest(format!(
            "Invalid email address: {}",
            request.email
        )));
    }
    validate_password(&request.password)
}

// ==================== Auth Routes ====================

/// POST /auth/signup
async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<SignupResponse>, ApiError> {
    validate_signup(&request)?;

    let outcome = state
        .auth
        .signup(Signup {
            name: request.name,
            email: request.email,
            password: request.password,
            phone: request.phone,
        })
        .await?;

    Ok(Json(SignupResponse {
        user_id: outcome.user.id,
        access_token: outcome.access_token,
        token_type: "bearer".to_string(),
    }))
}

/// POST /auth/token
async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    validate_password(&form.password)?;

    let access_token = state.auth.login(&form.username, &form.password).await?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: state.auth.tokens().ttl().num_seconds(),
    }))
}

/// GET /auth/me
async fn me(RequireAuth(user): RequireAuth) -> Json<UserResponse> {
    Json(user.into())
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/token", post(login))
        .route("/auth/me", get(me))
}
