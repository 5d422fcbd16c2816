//! Service layer

mod order_service;

pub use order_service::{
    CreatedOrder, NotificationOutcome, OrderService, RequestContext,
};
