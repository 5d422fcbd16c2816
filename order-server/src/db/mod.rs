//! Database Module
//!
//! Embedded SurrealDB storage and the order repository.

pub mod repository;

use shared::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "orders";
const DATABASE: &str = "orders";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database at `db_path`
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        tracing::info!("Database connection established ({db_path})");

        Ok(Self { db })
    }

    /// Open an in-memory database
    ///
    /// Used by tests; no state survives the handle.
    pub async fn memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;

        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        Ok(Self { db })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_on_disk_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.db");

        let service = DbService::new(&path.to_string_lossy()).await.unwrap();
        service.db.query("RETURN 1").await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_database_starts_empty() {
        let service = DbService::memory().await.unwrap();
        let mut result = service.db.query("SELECT * FROM orders").await.unwrap();
        let rows: Vec<serde_json::Value> = result.take(0).unwrap();
        assert!(rows.is_empty());
    }
}
