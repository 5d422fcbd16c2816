//! Domain event payloads
//!
//! The JSON field names are the compatibility surface consumed by
//! downstream services; they must not change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Order, OrderItem, OrderStatus};
use uuid::Uuid;

/// Published after an order has been durably persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub event_id: String,
    pub order_id: String,
    pub user_id: String,
    pub total_amount: f64,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
}

impl OrderCreatedEvent {
    pub fn from_order(order: &Order, request_id: &str) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            user_id: order.user_id.clone(),
            total_amount: order.total_amount,
            items: order.items.clone(),
            status: order.status,
            timestamp: Utc::now(),
            request_id: request_id.to_string(),
        }
    }

    /// Ordering key: events for the same order stay in enqueue order
    pub fn ordering_key(&self) -> String {
        format!("ORDER#{}", self.order_id)
    }
}

/// Reports a downstream stock-deduction failure for correlation with
/// the original order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockDeductionFailedEvent {
    pub event_id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: u32,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

impl StockDeductionFailedEvent {
    pub fn new(order_id: &str, product_id: &str, quantity: u32, reason: &str) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            product_id: product_id.to_string(),
            quantity,
            reason: reason.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn ordering_key(&self) -> String {
        format!("ORDER#{}", self.order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> Order {
        Order {
            id: "o-1".to_string(),
            user_id: "user-1".to_string(),
            items: vec![OrderItem {
                product_id: "p-1".to_string(),
                product_name: "Widget".to_string(),
                quantity: 3,
                price: 4.5,
                subtotal: 13.5,
            }],
            total_amount: 13.5,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            idempotency_key: "key-1".to_string(),
        }
    }

    #[test]
    fn test_order_created_event_from_order() {
        let order = sample_order();
        let event = OrderCreatedEvent::from_order(&order, "req-1");

        assert_eq!(event.order_id, "o-1");
        assert_eq!(event.user_id, "user-1");
        assert_eq!(event.total_amount, 13.5);
        assert_eq!(event.items.len(), 1);
        assert_eq!(event.status, OrderStatus::Pending);
        assert_eq!(event.request_id, "req-1");
        assert!(!event.event_id.is_empty());
    }

    #[test]
    fn test_order_created_event_wire_fields() {
        let event = OrderCreatedEvent::from_order(&sample_order(), "req-1");
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();

        for field in [
            "event_id",
            "order_id",
            "user_id",
            "total_amount",
            "items",
            "status",
            "timestamp",
            "request_id",
        ] {
            assert!(json.get(field).is_some(), "missing field {}", field);
        }
        assert_eq!(json["status"], "PENDING");
    }

    #[test]
    fn test_ordering_key() {
        let event = OrderCreatedEvent::from_order(&sample_order(), "req-1");
        assert_eq!(event.ordering_key(), "ORDER#o-1");
    }

    #[test]
    fn test_stock_deduction_failed_wire_fields() {
        let event = StockDeductionFailedEvent::new("o-1", "p-1", 2, "insufficient stock");
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();

        for field in [
            "event_id",
            "order_id",
            "product_id",
            "quantity",
            "reason",
            "timestamp",
        ] {
            assert!(json.get(field).is_some(), "missing field {}", field);
        }
        assert_eq!(event.ordering_key(), "ORDER#o-1");
    }
}
