//! Order Server - order write path over HTTP
//!
//! Accepts order-creation requests, persists each order durably with a
//! single-table key design, and publishes a creation event to the message
//! broker for downstream consumers (inventory, billing, notifications).
//! The client-visible response is synchronous through persistence; event
//! delivery is asynchronous and tracked by a background drain task.
//!
//! # Module structure
//!
//! ```text
//! order-server/src/
//! ├── core/          # Config, state, server
//! ├── db/            # Embedded SurrealDB + order repository
//! ├── events/        # Event types, publishers, delivery tracking
//! ├── services/      # Order service (business logic)
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # Logger, error re-exports
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod events;
pub mod services;
pub mod utils;

// Re-export common types
pub use crate::core::{Config, Server, ServerState};
pub use events::{CompensationPublisher, EventPublisher};
pub use services::{CreatedOrder, NotificationOutcome, OrderService, RequestContext};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
