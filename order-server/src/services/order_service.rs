//! Order Service
//!
//! The only component with business logic on the order write path:
//! build order → persist → publish event → log outcome. Persistence
//! failure is fatal to the request; publication failure is absorbed
//! (the order exists, the event is lost until a consumer reconciles).

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::db::repository::{OrderRepository, RepoError};
use crate::events::{EventPublisher, OrderCreatedEvent};
use shared::{AppError, AppResult, CreateOrderRequest, Order, OrderItem, OrderStatus};

/// Per-request metadata threaded through the write path
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: String,
    pub user_agent: String,
    pub source_ip: String,
}

impl RequestContext {
    /// Build from inbound request headers
    ///
    /// The request id is set by the request-id middleware; missing values
    /// degrade to "unknown" rather than failing the request.
    pub fn from_headers(headers: &http::HeaderMap) -> Self {
        let header_str = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown")
                .to_string()
        };

        Self {
            request_id: header_str("x-request-id"),
            user_agent: header_str("user-agent"),
            source_ip: headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .unwrap_or("unknown")
                .trim()
                .to_string(),
        }
    }
}

/// Whether the order-created event reached the broker client
///
/// Both outcomes accompany a successful creation; the caller decides
/// what, if anything, to surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Published,
    Failed { reason: String },
}

/// Result of a successful order creation
#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub order: Order,
    pub notification: NotificationOutcome,
}

#[derive(Clone)]
pub struct OrderService {
    repo: OrderRepository,
    publisher: Arc<dyn EventPublisher>,
}

impl OrderService {
    pub fn new(repo: OrderRepository, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { repo, publisher }
    }

    /// Create an order
    ///
    /// Allocates the id, computes subtotals and the total server-side,
    /// persists, then publishes the creation event. The store write
    /// happens-before the publish attempt.
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
        ctx: &RequestContext,
    ) -> AppResult<CreatedOrder> {
        let idempotency_key = request
            .idempotency_key
            .ok_or_else(|| AppError::validation("idempotency_key is required"))?;

        let now = Utc::now();
        let items: Vec<OrderItem> = request
            .items
            .iter()
            .map(|item| OrderItem {
                product_id: item.product_id.clone(),
                product_name: item.product_name.clone(),
                quantity: item.quantity,
                price: item.price,
                subtotal: f64::from(item.quantity) * item.price,
            })
            .collect();
        let total_amount = items.iter().map(|i| i.subtotal).sum();

        let order = Order {
            id: Uuid::new_v4().to_string(),
            user_id: request.user_id,
            items,
            total_amount,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            idempotency_key,
        };

        self.repo.create_order(&order).await.map_err(|e| {
            tracing::error!(
                order_id = %order.id,
                request_id = %ctx.request_id,
                error = %e,
                "Failed to save order"
            );
            AppError::from(e)
        })?;

        let event = OrderCreatedEvent::from_order(&order, &ctx.request_id);
        let notification = match self.publisher.publish_order_created(&event).await {
            Ok(()) => NotificationOutcome::Published,
            Err(e) => {
                // Eventual consistency gap: the order is durable, the
                // event is lost until reconciled. A durable outbox would
                // close this and is explicitly not implemented.
                tracing::error!(
                    order_id = %order.id,
                    request_id = %ctx.request_id,
                    error = %e,
                    "Failed to publish order created event"
                );
                NotificationOutcome::Failed {
                    reason: e.message,
                }
            }
        };

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            total_amount = order.total_amount,
            request_id = %ctx.request_id,
            "Order created"
        );

        Ok(CreatedOrder {
            order,
            notification,
        })
    }

    /// Fetch an order by id, preserving the distinguished not-found
    pub async fn get_order(&self, order_id: &str) -> AppResult<Order> {
        self.repo.get_order(order_id).await.map_err(|e| match e {
            RepoError::NotFound(_) => AppError::order_not_found(order_id),
            other => AppError::database(other.to_string()),
        })
    }

    /// List a user's orders, newest first
    pub async fn get_orders_by_user(&self, user_id: &str, limit: usize) -> AppResult<Vec<Order>> {
        Ok(self.repo.get_orders_by_user(user_id, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use async_trait::async_trait;
    use shared::CreateOrderItem;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct FakePublisher {
        events: Mutex<Vec<OrderCreatedEvent>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl EventPublisher for FakePublisher {
        async fn publish_order_created(&self, event: &OrderCreatedEvent) -> AppResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::publish("broker unreachable"));
            }
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }

        async fn health_check(&self) -> AppResult<()> {
            Ok(())
        }

        async fn close(&self) {}
    }

    async fn test_service() -> (OrderService, Arc<FakePublisher>) {
        let db = DbService::memory().await.unwrap().db;
        let repo = OrderRepository::new(db, "orders");
        let publisher = Arc::new(FakePublisher::default());
        (OrderService::new(repo, publisher.clone()), publisher)
    }

    fn request(user_id: &str) -> CreateOrderRequest {
        CreateOrderRequest {
            user_id: user_id.to_string(),
            items: vec![
                CreateOrderItem {
                    product_id: "p-1".to_string(),
                    product_name: "Widget".to_string(),
                    quantity: 2,
                    price: 10.0,
                },
                CreateOrderItem {
                    product_id: "p-2".to_string(),
                    product_name: "Gadget".to_string(),
                    quantity: 1,
                    price: 5.5,
                },
            ],
            idempotency_key: Some("key-1".to_string()),
        }
    }

    fn ctx() -> RequestContext {
        RequestContext {
            request_id: "req-1".to_string(),
            user_agent: "test".to_string(),
            source_ip: "127.0.0.1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_computes_totals_and_persists() {
        let (service, publisher) = test_service().await;

        let created = service.create_order(request("user-1"), &ctx()).await.unwrap();
        assert_eq!(created.order.total_amount, 25.5);
        assert_eq!(created.order.items[0].subtotal, 20.0);
        assert_eq!(created.order.status, OrderStatus::Pending);
        assert_eq!(created.notification, NotificationOutcome::Published);

        let fetched = service.get_order(&created.order.id).await.unwrap();
        assert_eq!(fetched.total_amount, 25.5);
        assert_eq!(fetched.items.len(), 2);

        let events = publisher.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].order_id, created.order.id);
        assert_eq!(events[0].request_id, "req-1");
        assert_eq!(events[0].total_amount, 25.5);
    }

    #[tokio::test]
    async fn test_publish_failure_is_absorbed() {
        let (service, publisher) = test_service().await;
        publisher.fail.store(true, Ordering::SeqCst);

        let created = service.create_order(request("user-1"), &ctx()).await.unwrap();
        assert!(matches!(
            created.notification,
            NotificationOutcome::Failed { .. }
        ));

        // The order is durable despite the lost event
        let fetched = service.get_order(&created.order.id).await.unwrap();
        assert_eq!(fetched.user_id, "user-1");
    }

    #[tokio::test]
    async fn test_duplicate_idempotency_key_creates_two_orders() {
        let (service, _) = test_service().await;

        let mut req = request("user-1");
        req.idempotency_key = Some("key-1".to_string());

        let first = service.create_order(req.clone(), &ctx()).await.unwrap();
        let second = service.create_order(req, &ctx()).await.unwrap();

        // The key is recorded but not enforced
        assert_ne!(first.order.id, second.order.id);
        let orders = service.get_orders_by_user("user-1", 10).await.unwrap();
        assert_eq!(orders.len(), 2);
    }

    #[tokio::test]
    async fn test_create_without_idempotency_key_is_rejected() {
        let (service, publisher) = test_service().await;

        let mut req = request("user-1");
        req.idempotency_key = None;

        let err = service.create_order(req, &ctx()).await.unwrap_err();
        assert_eq!(err.code, shared::ErrorCode::ValidationFailed);
        assert!(publisher.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_order_maps_to_order_not_found() {
        let (service, _) = test_service().await;
        let err = service.get_order("missing").await.unwrap_err();
        assert_eq!(err.code, shared::ErrorCode::OrderNotFound);
    }

    #[test]
    fn test_request_context_from_headers() {
        let mut headers = http::HeaderMap::new();
        headers.insert("x-request-id", "req-42".parse().unwrap());
        headers.insert("user-agent", "curl/8.0".parse().unwrap());
        headers.insert("x-forwarded-for", "10.0.0.1, 10.0.0.2".parse().unwrap());

        let ctx = RequestContext::from_headers(&headers);
        assert_eq!(ctx.request_id, "req-42");
        assert_eq!(ctx.user_agent, "curl/8.0");
        assert_eq!(ctx.source_ip, "10.0.0.1");

        let empty = RequestContext::from_headers(&http::HeaderMap::new());
        assert_eq!(empty.request_id, "unknown");
        assert_eq!(empty.source_ip, "unknown");
    }
}
