use std::path::PathBuf;

use cadence_core::file_store::{AVATARS_DIR, TRACKS_DIR};
use cadence_core::recency::StalePolicy;

use crate::auth::jwt::JwtConfig;

/// Upload ceiling when `MAX_UPLOAD_BYTES` is unset.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to wait for background tasks after the server stops (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Root directory for uploaded files (default: `storage`).
    pub storage_root: PathBuf,
    /// Subdirectory of `storage_root` for track audio.
    pub tracks_dir: String,
    /// Subdirectory of `storage_root` for avatars.
    pub avatars_dir: String,
    /// Largest accepted body for track and avatar uploads, in bytes
    /// (default: 50 MiB).
    pub max_upload_bytes: usize,
    /// How "last listened" reads treat entries whose entity is gone.
    pub recency_stale_policy: StalePolicy,
    /// JWT token configuration.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                       |
    /// | `STORAGE_ROOT`          | `storage`                  |
    /// | `TRACKS_DIR`            | `tracks`                   |
    /// | `AVATARS_DIR`           | `avatars`                  |
    /// | `MAX_UPLOAD_BYTES`      | `52428800` (50 MiB)        |
    /// | `RECENCY_STALE_POLICY`  | `skip` (`skip` or `fail`)  |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let storage_root =
            PathBuf::from(std::env::var("STORAGE_ROOT").unwrap_or_else(|_| "storage".into()));
        let tracks_dir = std::env::var("TRACKS_DIR").unwrap_or_else(|_| TRACKS_DIR.into());
        let avatars_dir = std::env::var("AVATARS_DIR").unwrap_or_else(|_| AVATARS_DIR.into());

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .map(|v| v.parse().expect("MAX_UPLOAD_BYTES must be a valid usize"))
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let recency_stale_policy = StalePolicy::from_name(
            &std::env::var("RECENCY_STALE_POLICY").unwrap_or_else(|_| "skip".into()),
        )
        .expect("RECENCY_STALE_POLICY must be 'skip' or 'fail'");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            storage_root,
            tracks_dir,
            avatars_dir,
            max_upload_bytes,
            recency_stale_policy,
            jwt,
        }
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_origins;

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test,"),
            vec!["http://a.test", "http://b.test"]
        );
    }

    #[test]
    fn empty_origin_list() {
        assert!(parse_origins("").is_empty());
    }
}
