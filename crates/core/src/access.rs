//! Listen access gate and subscription arithmetic.
//!
//! A track may be streamed when the listener holds an unexpired subscription
//! or still has free tracks left for the day. The balance itself is
//! decremented atomically in the database; this module only decides.

use std::time::Duration;

use chrono::{Days, NaiveTime};
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Free tracks every user gets back at each daily reset.
pub const DAILY_FREE_TRACKS: i32 = 15;

/// Why a listen was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenGrant {
    /// Covered by an active subscription; the free-track balance is untouched.
    Subscription,
    /// Paid for with one free track.
    FreeTrack,
}

/// Expiration instant of a subscription bought at `purchased_at`.
pub fn subscription_expires_at(purchased_at: Timestamp, duration_days: i32) -> Timestamp {
    purchased_at + chrono::Duration::days(i64::from(duration_days))
}

/// A subscription is active while its expiration lies strictly in the future.
pub fn is_active(expires_at: Timestamp, now: Timestamp) -> bool {
    expires_at > now
}

/// Decide whether a listen is allowed.
///
/// `latest_expiry` is the expiration of the user's most recent purchase, if any.
pub fn check_listen_access(
    latest_expiry: Option<Timestamp>,
    free_tracks: i32,
    now: Timestamp,
) -> Result<ListenGrant, CoreError> {
    if latest_expiry.is_some_and(|expiry| is_active(expiry, now)) {
        return Ok(ListenGrant::Subscription);
    }
    if free_tracks > 0 {
        return Ok(ListenGrant::FreeTrack);
    }
    Err(refusal(latest_expiry))
}

/// The error returned when no subscription covers a listen and no free
/// tracks remain.
pub fn refusal(latest_expiry: Option<Timestamp>) -> CoreError {
    match latest_expiry {
        Some(_) => CoreError::SubscriptionExpired,
        None => CoreError::NoFreeTracks,
    }
}

/// Start of a newly bought subscription.
///
/// Purchases stack: buying while a subscription is still active starts the
/// new one when the current one ends.
pub fn next_purchase_start(current_expiry: Option<Timestamp>, now: Timestamp) -> Timestamp {
    match current_expiry {
        Some(expiry) if is_active(expiry, now) => expiry,
        _ => now,
    }
}

/// The next UTC midnight strictly after `now`.
pub fn next_reset_at(now: Timestamp) -> Timestamp {
    let tomorrow = now.date_naive() + Days::new(1);
    tomorrow.and_time(NaiveTime::MIN).and_utc()
}

/// How long to sleep from `now` until the next daily reset.
pub fn duration_until_next_reset(now: Timestamp) -> Duration {
    (next_reset_at(now) - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;

    fn ts(day: u32, hour: u32, minute: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, day, hour, minute, 0).unwrap()
    }

    #[test]
    fn active_subscription_grants_without_free_tracks() {
        let now = ts(10, 12, 0);
        let grant = check_listen_access(Some(ts(11, 0, 0)), 0, now).unwrap();
        assert_eq!(grant, ListenGrant::Subscription);
    }

    #[test]
    fn one_free_track_grants_listen() {
        let grant = check_listen_access(None, 1, ts(10, 12, 0)).unwrap();
        assert_eq!(grant, ListenGrant::FreeTrack);
    }

    #[test]
    fn no_subscription_and_no_free_tracks_is_refused() {
        let result = check_listen_access(None, 0, ts(10, 12, 0));
        assert_matches!(result, Err(CoreError::NoFreeTracks));
    }

    #[test]
    fn lapsed_subscription_and_no_free_tracks_is_refused_as_expired() {
        let result = check_listen_access(Some(ts(9, 0, 0)), 0, ts(10, 12, 0));
        assert_matches!(result, Err(CoreError::SubscriptionExpired));
    }

    #[test]
    fn lapsed_subscription_falls_back_to_free_tracks() {
        let grant = check_listen_access(Some(ts(9, 0, 0)), 3, ts(10, 12, 0)).unwrap();
        assert_eq!(grant, ListenGrant::FreeTrack);
    }

    #[test]
    fn expiry_equal_to_now_is_not_active() {
        let now = ts(10, 12, 0);
        assert!(!is_active(now, now));
        assert_matches!(
            check_listen_access(Some(now), 0, now),
            Err(CoreError::SubscriptionExpired)
        );
    }

    #[test]
    fn expiration_adds_duration_in_days() {
        assert_eq!(subscription_expires_at(ts(1, 8, 30), 30), ts(31, 8, 30));
    }

    #[test]
    fn purchase_stacks_onto_active_subscription() {
        let now = ts(10, 12, 0);
        assert_eq!(next_purchase_start(Some(ts(20, 0, 0)), now), ts(20, 0, 0));
    }

    #[test]
    fn purchase_starts_now_without_active_subscription() {
        let now = ts(10, 12, 0);
        assert_eq!(next_purchase_start(None, now), now);
        assert_eq!(next_purchase_start(Some(ts(1, 0, 0)), now), now);
    }

    #[test]
    fn next_reset_is_following_midnight() {
        assert_eq!(next_reset_at(ts(10, 23, 59)), ts(11, 0, 0));
        assert_eq!(next_reset_at(ts(10, 0, 0)), ts(11, 0, 0));
    }

    #[test]
    fn sleep_until_reset() {
        assert_eq!(
            duration_until_next_reset(ts(10, 22, 30)),
            Duration::from_secs(90 * 60)
        );
    }
}
