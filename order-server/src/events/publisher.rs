//! Order-event publisher (NATS JetStream)
//!
//! Publishes `OrderCreatedEvent` to the `ORDER_EVENTS` stream, one subject
//! per order so per-order ordering holds. Publishing enqueues and returns;
//! delivery outcomes are consumed asynchronously by the [`DeliveryTracker`].

use std::time::Duration;

use async_nats::jetstream::{self, Context as JetStreamContext};
use async_nats::{Client, ConnectOptions};
use async_trait::async_trait;
use bytes::Bytes;

use super::delivery::{DeliveryReport, DeliveryTracker};
use super::types::OrderCreatedEvent;
use crate::core::Config;
use shared::{AppError, AppResult};

const STREAM_NAME: &str = "ORDER_EVENTS";
const SUBJECT_WILDCARD: &str = "orders.created.>";
const SUBJECT_PREFIX: &str = "orders.created";
const HEALTH_SUBJECT: &str = "orders.health";

/// Bounded wait for health checks and for flushing on close
pub(crate) const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Broker connection configuration
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Broker URLs; the first one is used for the connection
    pub urls: Vec<String>,
    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,
    /// Request timeout in seconds (None = no timeout)
    pub request_timeout_secs: Option<u64>,
    /// Max reconnection attempts (None = infinite)
    pub max_reconnects: Option<usize>,
    /// Client connection name
    pub name: Option<String>,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            urls: vec!["nats://localhost:4222".to_string()],
            connection_timeout_secs: 5,
            request_timeout_secs: Some(30),
            max_reconnects: Some(5),
            name: Some(env!("CARGO_PKG_NAME").to_string()),
        }
    }
}

impl EventBusConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            urls: config.broker_urls.clone(),
            ..Self::default()
        }
    }

    pub fn primary_url(&self) -> &str {
        self.urls
            .first()
            .map(|s| s.as_str())
            .unwrap_or("nats://localhost:4222")
    }
}

/// Connect to the broker and return the client plus a JetStream context
pub(crate) async fn connect_broker(
    config: &EventBusConfig,
) -> AppResult<(Client, JetStreamContext)> {
    let mut options =
        ConnectOptions::new().connection_timeout(Duration::from_secs(config.connection_timeout_secs));

    if let Some(timeout_secs) = config.request_timeout_secs {
        options = options.request_timeout(Some(Duration::from_secs(timeout_secs)));
    }
    if let Some(name) = &config.name {
        options = options.name(name);
    }
    if let Some(max_reconnects) = config.max_reconnects {
        options = options.max_reconnects(max_reconnects);
    }

    let client = async_nats::connect_with_options(config.primary_url(), options)
        .await
        .map_err(|e| AppError::broker_unavailable(format!("Broker connection failed: {e}")))?;

    let jetstream = jetstream::new(client.clone());
    Ok((client, jetstream))
}

/// Ensure the stream exists, creating it on first startup
pub(crate) async fn ensure_stream(
    jetstream: &JetStreamContext,
    name: &str,
    subject_wildcard: &str,
) -> AppResult<()> {
    if jetstream.get_stream(name).await.is_ok() {
        tracing::debug!(stream = name, "Stream already exists");
        return Ok(());
    }

    tracing::info!(stream = name, subject = subject_wildcard, "Creating stream");
    jetstream
        .create_stream(jetstream::stream::Config {
            name: name.to_string(),
            subjects: vec![subject_wildcard.to_string()],
            max_age: Duration::from_secs(24 * 60 * 60),
            max_bytes: 1024 * 1024 * 1024,
            max_messages: 1_000_000,
            storage: jetstream::stream::StorageType::File,
            num_replicas: 1,
            ..Default::default()
        })
        .await
        .map_err(|e| AppError::broker_unavailable(format!("Stream creation failed: {e}")))?;

    Ok(())
}

/// Standard message headers carried on every published event
pub(crate) fn event_headers(event_type: &str, key: &str) -> async_nats::HeaderMap {
    let mut headers = async_nats::HeaderMap::new();
    headers.insert("event_type", event_type);
    headers.insert("service", env!("CARGO_PKG_NAME"));
    headers.insert("version", env!("CARGO_PKG_VERSION"));
    headers.insert("x-message-key", key);
    headers
}

/// Ping the broker and flush within the bounded wait
pub(crate) async fn broker_ping(client: &Client) -> AppResult<()> {
    let probe = async {
        client
            .publish(HEALTH_SUBJECT, Bytes::from_static(b"ping"))
            .await
            .map_err(|e| AppError::broker_unavailable(format!("Broker ping failed: {e}")))?;
        client
            .flush()
            .await
            .map_err(|e| AppError::broker_unavailable(format!("Broker flush failed: {e}")))
    };

    tokio::time::timeout(FLUSH_TIMEOUT, probe)
        .await
        .map_err(|_| AppError::broker_unavailable("Broker health check timed out"))?
}

/// Publisher seam for the order service
///
/// The production implementation talks to NATS; tests substitute a
/// recording fake.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Serialize and enqueue the event; returns once the broker client
    /// has accepted it, without awaiting delivery
    async fn publish_order_created(&self, event: &OrderCreatedEvent) -> AppResult<()>;

    /// Probe broker reachability with a bounded wait
    async fn health_check(&self) -> AppResult<()>;

    /// Flush outstanding sends and release the client; call exactly once
    async fn close(&self);
}

pub struct NatsEventPublisher {
    client: Client,
    jetstream: JetStreamContext,
    tracker: DeliveryTracker,
}

impl NatsEventPublisher {
    pub async fn connect(config: &EventBusConfig) -> AppResult<Self> {
        let (client, jetstream) = connect_broker(config).await?;
        ensure_stream(&jetstream, STREAM_NAME, SUBJECT_WILDCARD).await?;

        tracing::info!(url = config.primary_url(), "Order event publisher connected");

        Ok(Self {
            client,
            jetstream,
            tracker: DeliveryTracker::start("order-events"),
        })
    }
}

#[async_trait]
impl EventPublisher for NatsEventPublisher {
    async fn publish_order_created(&self, event: &OrderCreatedEvent) -> AppResult<()> {
        let payload = serde_json::to_vec(event)
            .map_err(|e| AppError::publish(format!("Event serialization failed: {e}")))?;

        let subject = format!("{}.{}", SUBJECT_PREFIX, event.order_id);
        let key = event.ordering_key();
        let headers = event_headers("order.created", &key);

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
