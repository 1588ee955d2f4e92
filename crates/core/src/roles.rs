//! Well-known role and account status constants.
//!
//! These must match the CHECK constraints in `20260301000001_create_users.sql`.

use crate::error::CoreError;

pub const ROLE_LISTENER: &str = "listener";
pub const ROLE_MUSICIAN: &str = "musician";
pub const ROLE_ADMIN: &str = "admin";

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_BLOCKED: &str = "blocked";

/// Roles a user may pick at registration. Admins are provisioned out of band.
pub const SELF_ASSIGNABLE_ROLES: &[&str] = &[ROLE_LISTENER, ROLE_MUSICIAN];

const VALID_STATUSES: &[&str] = &[STATUS_ACTIVE, STATUS_BLOCKED];

/// Validate that `role` may be chosen during self-registration.
pub fn validate_registration_role(role: &str) -> Result<(), CoreError> {
    if SELF_ASSIGNABLE_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid role '{role}'. Must be one of: {SELF_ASSIGNABLE_ROLES:?}"
        )))
    }
}

/// Validate an account status value.
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid status '{status}'. Must be one of: {VALID_STATUSES:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listener_and_musician_are_self_assignable() {
        assert!(validate_registration_role(ROLE_LISTENER).is_ok());
        assert!(validate_registration_role(ROLE_MUSICIAN).is_ok());
    }

    #[test]
    fn admin_cannot_self_register() {
        assert!(validate_registration_role(ROLE_ADMIN).is_err());
        assert!(validate_registration_role("").is_err());
    }

    #[test]
    fn statuses() {
        assert!(validate_status(STATUS_ACTIVE).is_ok());
        assert!(validate_status(STATUS_BLOCKED).is_ok());
        assert!(validate_status("deleted").is_err());
    }
}
