//! Compensation-event publisher
//!
//! Separate client and stream from the primary publisher, so compensation
//! traffic is never starved by or interleaved with order-event traffic.

use async_nats::jetstream::Context as JetStreamContext;
use async_nats::Client;
use async_trait::async_trait;

use super::delivery::{DeliveryReport, DeliveryTracker};
use super::publisher::{
    EventBusConfig, FLUSH_TIMEOUT, broker_ping, connect_broker, ensure_stream, event_headers,
};
use super::types::StockDeductionFailedEvent;
use shared::{AppError, AppResult};

const STREAM_NAME: &str = "ORDER_COMPENSATION";
const SUBJECT_WILDCARD: &str = "orders.compensation.>";
const SUBJECT_PREFIX: &str = "orders.compensation";

/// Compensation seam for downstream-failure reporting
#[async_trait]
pub trait CompensationPublisher: Send + Sync {
    async fn publish_stock_deduction_failed(
        &self,
        event: &StockDeductionFailedEvent,
    ) -> AppResult<()>;

    async fn health_check(&self) -> AppResult<()>;

    async fn close(&self);
}

pub struct NatsCompensationPublisher {
    client: Client,
    jetstream: JetStreamContext,
    tracker: DeliveryTracker,
}

impl NatsCompensationPublisher {
    pub async fn connect(config: &EventBusConfig) -> AppResult<Self> {
        let (client, jetstream) = connect_broker(config).await?;
        ensure_stream(&jetstream, STREAM_NAME, SUBJECT_WILDCARD).await?;

        tracing::info!(
            url = config.primary_url(),
            "Compensation publisher connected"
        );

        Ok(Self {
            client,
            jetstream,
            tracker: DeliveryTracker::start("order-compensation"),
        })
    }
}

#[async_trait]
impl CompensationPublisher for NatsCompensationPublisher {
    async fn publish_stock_deduction_failed(
        &self,
        event: &StockDeductionFailedEvent,
    ) -> AppResult<()> {
        let payload = serde_json::to_vec(event)
            .map_err(|e| AppError::publish(format!("Event serialization failed: {e}")))?;

        let subject = format!("{}.{}", SUBJECT_PREFIX, event.order_id);
        let key = event.ordering_key();
        let headers = event_headers("order.stock_deduction_failed", &key);

        tracing::warn!(
            order_id = %event.order_id,
            product_id = %event.product_id,
            reason = %event.reason,
            "Publishing stock deduction failed event"
        );

        let ack = self
            .jetstream
            .publish_with_headers(subject, headers, payload.into())
            .await
            .map_err(|e| AppError::publish(format!("Event publish failed: {e}")))?;

        self.tracker.track(
            key,
            Box::pin(async move {
                ack.await
                    .map(|a| DeliveryReport {
                        stream: a.stream,
                        sequence: a.sequence,
                    })
                    .map_err(|e| e.to_string())
            }),
        );

        Ok(())
    }

    async fn health_check(&self) -> AppResult<()> {
        broker_ping(&self.client).await
    }

    async fn close(&self) {
        self.tracker.close(FLUSH_TIMEOUT).await;
        if let Err(e) = self.client.flush().await {
            tracing::warn!(error = %e, "Flush on close failed");
        }
    }
}
