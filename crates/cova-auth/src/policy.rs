//! Role-based access policy

use cova_db::{User, UserRole};
use tracing::warn;

use crate::error::AuthError;

/// True iff the user holds exactly the required role
///
/// Roles are flat: admin does not imply customer.
pub fn authorize(user: &User, required: UserRole) -> bool {
    user.role == required
}

/// [`authorize`] as a gate, failing with [`AuthError::Forbidden`]
pub fn require_role(user: &User, required: UserRole) -> Result<(), AuthError> {
    if authorize(user, required) {
        return Ok(());
    }

    warn!(
        "User {} ({}) denied, requires {}",
        user.email, user.role, required
    );
    let err = AuthError::Forbidden;
    err.record();
    Err(err)
}
