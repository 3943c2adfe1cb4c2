//! COVA Authentication and Authorization
//!
//! This crate provides password hashing, JWT issuance and verification,
//! token-to-user resolution, and the role check that gates admin-only
//! operations.

pub mod bearer;
pub mod error;
pub mod jwt;
pub mod password;
pub mod policy;
pub mod resolver;
pub mod service;

pub use bearer::{bearer_from_headers, extract_bearer_token};
pub use error::AuthError;
pub use jwt::{Claims, TokenService};
pub use password::{hash_password, hash_password_blocking, verify_password};
pub use policy::{authorize, require_role};
pub use resolver::{IdentityResolver, InactiveUserPolicy};
pub use service::{AuthService, Signup, SignupOutcome};
