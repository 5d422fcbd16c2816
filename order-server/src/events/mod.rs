//! Eventing Module
//!
//! Broker integration for the order write path:
//!
//! - [`types`] — domain event payloads (wire contract)
//! - [`delivery`] — background delivery-report drain task
//! - [`publisher`] — primary order-event publisher (NATS JetStream)
//! - [`compensation`] — compensation-event publisher (separate connection)

pub mod compensation;
pub mod delivery;
pub mod publisher;
pub mod types;

pub use compensation::{CompensationPublisher, NatsCompensationPublisher};
pub use delivery::{DeliveryReport, DeliveryTracker};
pub use publisher::{EventBusConfig, EventPublisher, NatsEventPublisher};
pub use types::{OrderCreatedEvent, StockDeductionFailedEvent};
