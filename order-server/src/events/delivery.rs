//! Delivery-report drain task
//!
//! Publishing hands the broker an ack future and returns immediately; a
//! single long-lived task per publisher awaits those futures and logs the
//! outcome. The drain task is the only consumer of its channel and lives
//! for the publisher's lifetime.

use futures::future::BoxFuture;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Broker acknowledgment for a stored message
#[derive(Debug, Clone)]
pub struct DeliveryReport {
    pub stream: String,
    pub sequence: u64,
}

/// Pending acknowledgment, keyed for correlation in logs
pub type AckFuture = BoxFuture<'static, Result<DeliveryReport, String>>;

struct DeliveryTicket {
    key: String,
    ack: AckFuture,
}

/// Owns the drain task and the channel feeding it
pub struct DeliveryTracker {
    tx: Mutex<Option<mpsc::UnboundedSender<DeliveryTicket>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    name: &'static str,
}

impl DeliveryTracker {
    /// Spawn the drain task
    ///
    /// `name` distinguishes publishers in log output.
    pub fn start(name: &'static str) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<DeliveryTicket>();

        let handle = tokio::spawn(async move {
            while let Some(ticket) = rx.recv().await {
                match ticket.ack.await {
                    Ok(report) => {
                        tracing::debug!(
                            publisher = name,
                            key = %ticket.key,
                            stream = %report.stream,
                            sequence = report.sequence,
                            "Event delivered"
                        );
                    }
                    Err(reason) => {
                        tracing::error!(
                            publisher = name,
                            key = %ticket.key,
                            error = %reason,
                            "Event delivery failed"
                        );
                    }
                }
            }
        });

        Self {
            tx: Mutex::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
            name,
        }
    }

    /// Hand a pending acknowledgment to the drain task
    pub fn track(&self, key: String, ack: AckFuture) {
        let tx = self.tx.lock().expect("delivery tracker lock poisoned");
        match tx.as_ref() {
            Some(tx) => {
                let _ = tx.send(DeliveryTicket { key, ack });
            }
            None => {
                tracing::warn!(
                    publisher = self.name,
                    key = %key,
                    "Delivery tracker already closed, dropping report"
                );
            }
        }
    }

    /// Stop accepting tickets and drain the remaining ones
    ///
    /// Waits up to `timeout` for the drain task to finish; logs a warning
    /// if reports are still pending past the deadline.
    pub async fn close(&self, timeout: Duration) {
        let tx = self
            .tx
            .lock()
            .expect("delivery tracker lock poisoned")
            .take();
        drop(tx);

        let handle = self
            .handle
            .lock()
            .expect("delivery tracker lock poisoned")
            .take();

        if let Some(handle) = handle {
            if tokio::time::timeout(timeout, handle).await.is_err() {
                tracing::warn!(
                    publisher = self.name,
                    "Delivery reports still pending after close timeout"
                );
            }
        }
    }
}
