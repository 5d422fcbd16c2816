//! Order Repository
//!
//! Maps the `Order` aggregate onto a single-table layout:
//!
//! | Key | Value |
//! |-----|-------|
//! | `PK = ORDER#<orderID>`, `SK = METADATA` | full order record |
//! | `GSI1PK = USER#<userID>`, `GSI1SK = ORDER#<createdAt>` | per-user reverse-chronological projection |
//!
//! The record key is the `PK` string; the key fields are also stored as
//! attributes so the table keeps the same shape for every consumer.

use super::{BaseRepository, RepoError, RepoResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Order, OrderItem, OrderStatus};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const SK_METADATA: &str = "METADATA";

fn order_pk(order_id: &str) -> String {
    format!("ORDER#{}", order_id)
}

fn user_gsi1pk(user_id: &str) -> String {
    format!("USER#{}", user_id)
}

fn order_gsi1sk(created_at: &DateTime<Utc>) -> String {
    format!("ORDER#{}", created_at.format("%Y-%m-%dT%H:%M:%SZ"))
}

/// Persisted order record with the single-table key fields
///
/// The stored attribute names (`PK`, `SK`, `GSI1PK`, `GSI1SK`) are the
/// interop surface shared with other consumers of the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(rename = "PK")]
    pub pk: String,
    #[serde(rename = "SK")]
    pub sk: String,
    #[serde(rename = "GSI1PK")]
    pub gsi1pk: String,
    #[serde(rename = "GSI1SK")]
    pub gsi1sk: String,
    pub order_id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub idempotency_key: String,
}

impl From<&Order> for OrderRecord {
    fn from(order: &Order) -> Self {
        Self {
            pk: order_pk(&order.id),
            sk: SK_METADATA.to_string(),
            gsi1pk: user_gsi1pk(&order.user_id),
            gsi1sk: order_gsi1sk(&order.created_at),
            order_id: order.id.clone(),
            user_id: order.user_id.clone(),
            items: order.items.clone(),
            total_amount: order.total_amount,
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
            idempotency_key: order.idempotency_key.clone(),
        }
    }
}

impl From<OrderRecord> for Order {
    fn from(record: OrderRecord) -> Self {
        Self {
            id: record.order_id,
            user_id: record.user_id,
            items: record.items,
            total_amount: record.total_amount,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
            idempotency_key: record.idempotency_key,
        }
    }
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
    table: String,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>, table: &str) -> Self {
        Self {
            base: BaseRepository::new(db),
            table: table.to_string(),
        }
    }

    /// Persist an order
    ///
    /// Unconditional upsert: writing the same order id twice overwrites
    /// the previous record (last write wins).
    pub async fn create_order(&self, order: &Order) -> RepoResult<()> {
        let record = OrderRecord::from(order);
        let pk = record.pk.clone();
        let _: Option<OrderRecord> = self
            .base
            .db()
            .upsert((self.table.as_str(), pk.as_str()))
            .content(record)
            .await?;
        Ok(())
    }

    /// Point read by order id
    pub async fn get_order(&self, order_id: &str) -> RepoResult<Order> {
        let record: Option<OrderRecord> = self
            .base
            .db()
            .select((self.table.as_str(), order_pk(order_id).as_str()))
            .await?;

        record
            .map(Order::from)
            .ok_or_else(|| RepoError::NotFound(format!("Order {}", order_id)))
    }

    /// List a user's orders, newest first
    ///
    /// Reads the secondary projection; an unknown user yields an empty vec,
    /// not an error.
    pub async fn get_orders_by_user(&self, user_id: &str, limit: usize) -> RepoResult<Vec<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM type::table($tb) \
                 WHERE GSI1PK = $gsi1pk \
                 ORDER BY GSI1SK DESC \
                 LIMIT $limit",
            )
            .bind(("tb", self.table.clone()))
            .bind(("gsi1pk", user_gsi1pk(user_id)))
            .bind(("limit", limit as i64))
            .await?;

        let records: Vec<OrderRecord> = result.take(0)?;
        Ok(records.into_iter().map(Order::from).collect())
    }
}
