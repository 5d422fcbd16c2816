//! Order domain model and request/response payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Created and persisted, downstream processing not yet confirmed
    Pending,
    /// Confirmed by downstream processing
    Confirmed,
    /// Cancelled, either by the user or by compensation
    Cancelled,
}

impl OrderStatus {
    /// Get the wire representation of this status
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single line item within an order
///
/// `subtotal` is always computed server side as `price * quantity`,
/// never taken from client input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub price: f64,
    pub subtotal: f64,
}

/// A customer order
///
/// `total_amount` is the sum of all item subtotals and is computed at
/// creation time. The `id` is an opaque UUID string assigned by the
/// service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Client-supplied idempotency key; presence is required, but reuse
    /// is not deduplicated at the store layer
    pub idempotency_key: String,
}

// ==================== Request payloads ====================

/// A line item in an order creation request
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateOrderItem {
    #[validate(length(min = 1, message = "product_id is required"))]
    pub product_id: String,
    #[validate(length(min = 1, message = "product_name is required"))]
    pub product_name: String,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: u32,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
}

/// Request body for creating an order
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "order must contain at least one item"))]
    #[validate(nested)]
    pub items: Vec<CreateOrderItem>,
    /// Required idempotency key; recorded on the order but reuse is not
    /// deduplicated
    #[validate(
        required(message = "idempotency_key is required"),
        length(min = 1, message = "idempotency_key must not be empty")
    )]
    pub idempotency_key: Option<String>,
}

// ==================== Response payloads ====================

/// Response body for a successful order creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub message: String,
}

/// Response body for fetching an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetOrderResponse {
    pub order_id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for GetOrderResponse {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.id,
            user_id: order.user_id,
            items: order.items,
            total_amount: order.total_amount,
            status: order.status,
            created_at: order.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateOrderRequest {
        CreateOrderRequest {
            user_id: "user-1".to_string(),
            items: vec![CreateOrderItem {
                product_id: "prod-1".to_string(),
                product_name: "Widget".to_string(),
                quantity: 2,
                price: 9.99,
            }],
            idempotency_key: Some("key-1".to_string()),
        }
    }

    #[test]
    fn test_status_serialize_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Pending).unwrap(),
            "\"PENDING\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Cancelled).unwrap(),
            "\"CANCELLED\""
        );
    }

    #[test]
    fn test_status_deserialize() {
        let status: OrderStatus = serde_json::from_str("\"CONFIRMED\"").unwrap();
        assert_eq!(status, OrderStatus::Confirmed);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(OrderStatus::Pending.to_string(), "PENDING");
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_empty_items_rejected() {
        let mut req = valid_request();
        req.items.clear();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_empty_user_id_rejected() {
        let mut req = valid_request();
        req.user_id.clear();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut req = valid_request();
        req.items[0].quantity = 0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut req = valid_request();
        req.items[0].price = -1.0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_empty_idempotency_key_rejected() {
        let mut req = valid_request();
        req.idempotency_key = Some(String::new());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_missing_idempotency_key_rejected() {
        let mut req = valid_request();
        req.idempotency_key = None;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_get_order_response_from_order() {
        let now = Utc::now();
        let order = Order {
            id: "o-2".to_string(),
            user_id: "user-9".to_string(),
            items: vec![OrderItem {
                product_id: "p".to_string(),
                product_name: "P".to_string(),
                quantity: 1,
                price: 5.0,
                subtotal: 5.0,
            }],
            total_amount: 5.0,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            idempotency_key: "key-1".to_string(),
        };
        let resp = GetOrderResponse::from(order);
        assert_eq!(resp.order_id, "o-2");
        assert_eq!(resp.user_id, "user-9");
        assert_eq!(resp.total_amount, 5.0);
        assert_eq!(resp.items.len(), 1);
    }
}
