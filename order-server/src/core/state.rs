use std::path::PathBuf;
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::OrderRepository;
use crate::events::{
    CompensationPublisher, EventBusConfig, EventPublisher, NatsCompensationPublisher,
    NatsEventPublisher,
};
use crate::services::OrderService;
use shared::AppResult;

/// Server state holding shared references to all services
///
/// Cloning is cheap: the database handle and publishers are shared
/// behind `Arc`.
///
/// | Field | Description |
/// |-------|-------------|
/// | config | Immutable configuration |
/// | db | Embedded database (SurrealDB) |
/// | order_service | Order write/read orchestration |
/// | publisher | Primary order-event publisher |
/// | compensation | Compensation-event publisher |
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// Embedded database
    pub db: Surreal<Db>,
    /// Order service (business logic)
    pub order_service: OrderService,
    /// Primary event publisher (order-created events)
    pub publisher: Arc<dyn EventPublisher>,
    /// Compensation event publisher (downstream-failure reports)
    pub compensation: Arc<dyn CompensationPublisher>,
}

impl ServerState {
    /// Create server state from already-constructed components
    ///
    /// Tests use this with an in-memory database and fake publishers;
    /// production code goes through [`ServerState::initialize`].
    pub fn new(
        config: Config,
        db: Surreal<Db>,
        publisher: Arc<dyn EventPublisher>,
        compensation: Arc<dyn CompensationPublisher>,
    ) -> Self {
        let repo = OrderRepository::new(db.clone(), &config.order_table);
        let order_service = OrderService::new(repo, publisher.clone());
        Self {
            config,
            db,
            order_service,
            publisher,
            compensation,
        }
    }

    /// Initialize server state
    ///
    /// Order of initialization:
    /// 1. Embedded database under `data_dir/database/orders.db`
    /// 2. Primary event publisher (connects to the broker)
    /// 3. Compensation publisher (separate connection)
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        let db_path = PathBuf::from(&config.data_dir)
            .join("database")
            .join("orders.db");
        let db_service = DbService::new(&db_path.to_string_lossy()).await?;
        let db = db_service.db;

        let bus_config = EventBusConfig::from_config(config);
        let publisher: Arc<dyn EventPublisher> =
            Arc::new(NatsEventPublisher::connect(&bus_config).await?);
        let compensation: Arc<dyn CompensationPublisher> =
            Arc::new(NatsCompensationPublisher::connect(&bus_config).await?);

        Ok(Self::new(config.clone(), db, publisher, compensation))
    }

    /// Release broker resources
    ///
    /// Must be called exactly once, after the HTTP listener has stopped
    /// accepting requests. Flushes outstanding sends with a bounded wait.
    pub async fn shutdown(&self) {
        self.publisher.close().await;
        self.compensation.close().await;
        tracing::info!("Broker connections closed");
    }
}
