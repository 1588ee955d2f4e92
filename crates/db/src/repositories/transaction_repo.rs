//! Repository for the `subscription_transactions` table.

use cadence_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::subscription::{LatestPurchase, SubscriptionTransaction};

const COLUMNS: &str = "id, user_id, subscription_id, purchased_at, created_at, updated_at";

/// Records and looks up subscription purchases.
pub struct TransactionRepo;

impl TransactionRepo {
    /// Record a purchase that takes effect at `purchased_at`.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        subscription_id: DbId,
        purchased_at: Timestamp,
    ) -> Result<SubscriptionTransaction, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscription_transactions (user_id, subscription_id, purchased_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SubscriptionTransaction>(&query)
            .bind(user_id)
            .bind(subscription_id)
            .bind(purchased_at)
            .fetch_one(pool)
            .await
    }

    /// The user's purchase with the latest `purchased_at`, joined with its plan.
    ///
    /// Purchases stack, so this is also the one that expires last.
    pub async fn latest_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<LatestPurchase>, sqlx::Error> {
        sqlx::query_as::<_, LatestPurchase>(
            "SELECT st.subscription_id, s.name, s.duration_days, st.purchased_at
             FROM subscription_transactions st
             JOIN subscriptions s ON s.id = st.subscription_id
             WHERE st.user_id = $1
             ORDER BY st.purchased_at DESC, st.id DESC
             LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Every purchase by a user, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<SubscriptionTransaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subscription_transactions
             WHERE user_id = $1
             ORDER BY purchased_at DESC, id DESC"
        );
        sqlx::query_as::<_, SubscriptionTransaction>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
