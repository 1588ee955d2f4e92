//! Repository for the `subscriptions` table.

use cadence_core::types::DbId;
use sqlx::PgPool;

use crate::models::subscription::Subscription;

const COLUMNS: &str = "id, name, cost_cents, duration_days, created_at, updated_at";

/// Read access to the subscription plans.
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// All plans, cheapest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions ORDER BY cost_cents, id");
        sqlx::query_as::<_, Subscription>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions WHERE id = $1");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
