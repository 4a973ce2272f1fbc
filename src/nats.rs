// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS transport for work items
//!
//! Work items arrive as JSON on a core NATS subject. Each message is decoded,
//! counted as valid or invalid, and handed to a [`MessageHandler`] on its own
//! task. When the message carries a reply subject the handler's reply is
//! published there.

use std::sync::Arc;
use std::time::Duration;

use async_nats::{Client, ConnectOptions, Subscriber};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::metrics::MetricsSink;

/// Configuration for NATS connection
#[derive(Debug, Clone)]
pub struct NatsConfig {
    /// NATS server URLs
    pub servers: Vec<String>,
    /// Client name
    pub name: String,
    /// Connection timeout
    pub connect_timeout: Duration,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://localhost:4222".to_string()],
            name: "bmc-worker".to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// NATS client wrapper
#[derive(Clone)]
pub struct NatsClient {
    client: Client,
}

impl NatsClient {
    /// Create a new NATS client with the given configuration
    pub async fn new(config: NatsConfig) -> InfrastructureResult<Self> {
        let connect_options = ConnectOptions::new()
            .name(&config.name)
            .connection_timeout(config.connect_timeout);

        let client = async_nats::connect_with_options(config.servers.join(","), connect_options)
            .await
            .map_err(|e| InfrastructureError::NatsConnection(e.to_string()))?;

        info!(servers = ?config.servers, "connected to NATS");

        Ok(Self { client })
    }

    /// Publish a JSON message to a subject
    pub async fn publish<T>(&self, subject: &str, message: &T) -> InfrastructureResult<()>
    where
        T: Serialize,
    {
        let payload = serde_json::to_vec(message)?;
        self.publish_bytes(subject, payload).await
    }

    /// Publish an already encoded payload
    pub async fn publish_bytes(&self, subject: &str, payload: Vec<u8>) -> InfrastructureResult<()> {
        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(|e| InfrastructureError::NatsConnection(e.to_string()))?;

        debug!(subject, "published message");
        Ok(())
    }

    /// Subscribe to a subject
    pub async fn subscribe(&self, subject: &str) -> InfrastructureResult<Subscriber> {
        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| InfrastructureError::NatsSubscribe(e.to_string()))?;

        info!(subject, "subscribed");
        Ok(subscriber)
    }

    /// Get the underlying NATS client for advanced operations
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Trait for handling work items from NATS
#[async_trait::async_trait]
pub trait MessageHandler: Send + Sync {
    /// The decoded message type
    type Message: DeserializeOwned + Send;

    /// Reply published when the message carries a reply subject
    type Reply: Serialize + Send;

    /// Handle a message
    ///
    /// Returning [`InfrastructureError::WorkItemRejected`] marks the message as
    /// not meant for this worker.
    async fn handle(
        &self,
        message: Self::Message,
        cancel: &CancellationToken,
    ) -> InfrastructureResult<Self::Reply>;

    /// Get the subject this handler subscribes to
    fn subject(&self) -> &str;
}

/// Decode one payload, run the handler and count the event
pub async fn dispatch<H>(
    handler: &H,
    metrics: &dyn MetricsSink,
    payload: &[u8],
    cancel: &CancellationToken,
) -> InfrastructureResult<H::Reply>
where
    H: MessageHandler + ?Sized,
{
    let message = match serde_json::from_slice::<H::Message>(payload) {
        Ok(message) => message,
        Err(e) => {
            metrics.event_received(false, "nack");
            warn!(error = %e, "discarding undecodable work item");
            return Err(InfrastructureError::Deserialization(e.to_string()));
        }
    };

    match handler.handle(message, cancel).await {
        Ok(reply) => {
            metrics.event_received(true, "ack");
            Ok(reply)
        }
        Err(InfrastructureError::WorkItemRejected(reason)) => {
            metrics.event_received(false, "nack");
            debug!(reason = %reason, "work item rejected");
            Err(InfrastructureError::WorkItemRejected(reason))
        }
        Err(e) => {
            metrics.event_received(true, "nack");
            error!(kind = e.kind(), error = %e, "work item failed");
            Err(e)
        }
    }
}

/// Message processor that runs handlers for subscriptions
pub struct MessageProcessor {
    client: NatsClient,
    metrics: Arc<dyn MetricsSink>,
}

impl MessageProcessor {
    /// Create a new message processor
    pub fn new(client: NatsClient, metrics: Arc<dyn MetricsSink>) -> Self {
        Self { client, metrics }
    }

    /// Start processing messages for a handler until `cancel` fires
    ///
    /// On cancellation the subscription stops and in-flight work items are
    /// awaited; they observe the same token and release their sessions.
    pub async fn run_handler<H>(
        &self,
        handler: Arc<H>,
        cancel: CancellationToken,
    ) -> InfrastructureResult<JoinHandle<()>>
    where
        H: MessageHandler + 'static,
    {
        let subject = handler.subject().to_string();
        let mut subscriber = self.client.subscribe(&subject).await?;
        let client = self.client.clone();
        let metrics = self.metrics.clone();

        let task = tokio::spawn(async move {
            let mut in_flight = JoinSet::new();

            loop {
                let message = tokio::select! {
                    _ = cancel.cancelled() => break,
                    message = subscriber.next() => message,
                    Some(_) = in_flight.join_next(), if !in_flight.is_empty() => continue,
                };

                let Some(message) = message else {
                    warn!(subject = %subject, "subscription closed");
                    break;
                };

                let handler = handler.clone();
                let metrics = metrics.clone();
                let client = client.clone();
                let cancel = cancel.clone();

                in_flight.spawn(async move {
                    let result =
                        dispatch(handler.as_ref(), metrics.as_ref(), &message.payload, &cancel).await;

                    let (Ok(reply), Some(reply_to)) = (result, message.reply) else {
                        return;
                    };

                    // Encode first so no borrow of the reply crosses the publish
                    let payload = match serde_json::to_vec(&reply) {
                        Ok(payload) => payload,
                        Err(e) => {
                            error!(error = %e, "failed to encode reply");
                            return;
                        }
                    };

                    if let Err(e) = client.publish_bytes(&reply_to.to_string(), payload).await {
                        error!(error = %e, "failed to publish reply");
                    }
                });
            }

            if let Err(e) = subscriber.unsubscribe().await {
                debug!(error = %e, "unsubscribe failed");
            }

            while in_flight.join_next().await.is_some() {}
            info!(subject = %subject, "message processor stopped");
        });

        Ok(task)
    }
}
