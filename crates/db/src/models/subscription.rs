//! Subscription plan and purchase models.

use cadence_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A purchasable plan from the `subscriptions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub name: String,
    /// Price in cents.
    pub cost_cents: i64,
    pub duration_days: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `subscription_transactions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubscriptionTransaction {
    pub id: DbId,
    pub user_id: DbId,
    pub subscription_id: DbId,
    pub purchased_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A user's most recent purchase joined with its plan.
#[derive(Debug, Clone, FromRow)]
pub struct LatestPurchase {
    pub subscription_id: DbId,
    pub name: String,
    pub duration_days: i32,
    pub purchased_at: Timestamp,
}

impl LatestPurchase {
    pub fn expires_at(&self) -> Timestamp {
        cadence_core::access::subscription_expires_at(self.purchased_at, self.duration_days)
    }
}
