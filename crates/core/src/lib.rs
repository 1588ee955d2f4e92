//! Cadence domain layer.
//!
//! Pure domain logic shared by the database and HTTP crates: entity kinds,
//! the bounded "last listened" tracker, the listen access gate, file storage,
//! audio probing, and input validation. Nothing in here talks to PostgreSQL.

pub mod access;
pub mod audio;
pub mod error;
pub mod file_store;
pub mod locks;
pub mod pagination;
pub mod recency;
pub mod roles;
pub mod types;
pub mod users;
