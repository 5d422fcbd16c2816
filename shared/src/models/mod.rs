//! Domain models shared across the workspace

mod order;

pub use order::{
    CreateOrderItem, CreateOrderRequest, CreateOrderResponse, GetOrderResponse, Order, OrderItem,
    OrderStatus,
};
