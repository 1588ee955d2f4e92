//! Primitive aliases shared by every Cadence crate.

use chrono::{DateTime, Utc};

/// Row ids: PostgreSQL `BIGSERIAL`.
pub type DbId = i64;

/// Listen, purchase and row times, always UTC.
pub type Timestamp = DateTime<Utc>;

/// What an unset [`Timestamp`] holds. A listen may never carry it.
pub const UNSET_TIMESTAMP: Timestamp = DateTime::<Utc>::UNIX_EPOCH;
