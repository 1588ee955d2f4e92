use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A listen timestamp was the default value or lies in the future.
    #[error("Invalid listen timestamp: {0}")]
    InvalidTimestamp(String),

    /// A recency entry points at an entity that no longer exists.
    #[error("Stale reference: {entity} with id {id} no longer exists")]
    StaleReference { entity: &'static str, id: DbId },

    /// The user's most recent subscription has lapsed and no free tracks remain.
    #[error("Subscription expired and no free tracks remain")]
    SubscriptionExpired,

    /// The user never subscribed and has used up the free-track allowance.
    #[error("No free tracks remain and no active subscription")]
    NoFreeTracks,

    #[error("Internal error: {0}")]
    Internal(String),
}
