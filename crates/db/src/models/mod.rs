//! Row structs and DTOs.
//!
//! Each submodule holds a `FromRow` struct matching a table row, the
//! `Deserialize` DTOs used for inserts, and any joined read views.

pub mod album;
pub mod playlist;
pub mod recency;
pub mod subscription;
pub mod track;
pub mod user;
