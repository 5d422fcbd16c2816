//! Shared types for the order service
//!
//! Common types used across the workspace: the unified error system,
//! response structures, and the order domain model.

pub mod error;
pub mod models;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{
    CreateOrderItem, CreateOrderRequest, CreateOrderResponse, GetOrderResponse, Order, OrderItem,
    OrderStatus,
};
