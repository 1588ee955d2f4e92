//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireMusician`] -- Requires the `musician` role.

pub mod auth;
pub mod rbac;
