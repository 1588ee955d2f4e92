//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. [`PgRecencyStore`] is the exception: it
//! owns a pool so it can back the recency tracker.

pub mod album_repo;
pub mod playlist_repo;
pub mod recency_repo;
pub mod subscription_repo;
pub mod track_repo;
pub mod transaction_repo;
pub mod user_repo;

pub use album_repo::AlbumRepo;
pub use playlist_repo::PlaylistRepo;
pub use recency_repo::{PgRecencyStore, RecencyRepo};
pub use subscription_repo::SubscriptionRepo;
pub use track_repo::TrackRepo;
pub use transaction_repo::TransactionRepo;
pub use user_repo::UserRepo;

/// Build an `ILIKE` pattern matching values that start with `prefix`.
///
/// `%`, `_` and `\` in the input are escaped so they match literally.
pub(crate) fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for ch in prefix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::like_prefix;

    #[test]
    fn prefix_pattern_escapes_wildcards() {
        assert_eq!(like_prefix("ab"), "ab%");
        assert_eq!(like_prefix("50%_off"), "50\\%\\_off%");
        assert_eq!(like_prefix(""), "%");
    }
}
