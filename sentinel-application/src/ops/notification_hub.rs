// Live-feed fan-out
//
// The hub owns every connected channel. Connection tasks hold only the receiving
// half of their queue; broadcast never awaits a socket.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sentinel_domain::ports::EventPublisher;
use sentinel_domain::{ChannelId, EventEnvelope, InboundMessage};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use crate::ops::subscriber_channel::{ChannelEffect, ChannelInput, SubscriberChannel};
use crate::Metrics;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HubError {
    #[error("live feed is at capacity ({max} channels)")]
    AtCapacity { max: usize },
}

/// Returned to the connection task that owns the socket.
#[derive(Debug)]
pub struct ChannelRegistration {
    pub id: ChannelId,
    pub outbound: mpsc::Receiver<Arc<EventEnvelope>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundOutcome {
    Subscribed,
    Malformed,
    UnknownChannel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveFeedSnapshot {
    pub channels: usize,
    pub subscribed: usize,
    pub max_channels: usize,
}

pub struct NotificationHub {
    channels: RwLock<HashMap<ChannelId, SubscriberChannel>>,
    next_id: AtomicU64,
    max_channels: usize,
    channel_buffer: usize,
    metrics: Arc<Metrics>,
}

impl NotificationHub {
    pub fn new(max_channels: usize, channel_buffer: usize, metrics: Arc<Metrics>) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            max_channels: max_channels.max(1),
            channel_buffer: channel_buffer.max(1),
            metrics,
        }
    }

    pub fn max_channels(&self) -> usize {
        self.max_channels
    }

    /// Cheap pre-check used before accepting an upgrade; `register` re-checks.
    pub async fn has_capacity(&self) -> bool {
        self.channels.read().await.len() < self.max_channels
    }

    pub async fn register(&self) -> Result<ChannelRegistration, HubError> {
        let mut channels = self.channels.write().await;
        if channels.len() >= self.max_channels {
            warn!(max = self.max_channels, "live feed rejected channel: at capacity");
            return Err(HubError::AtCapacity {
                max: self.max_channels,
            });
        }
        let id = ChannelId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(self.channel_buffer);
        channels.insert(id, SubscriberChannel::new(tx));
        self.metrics.record_channel_opened();
        info!(channel = %id, live = channels.len(), "live feed channel registered");
        Ok(ChannelRegistration { id, outbound: rx })
    }

    /// Removing an unknown or already removed channel is a no-op.
    pub async fn deregister(&self, id: ChannelId) -> bool {
        let mut channels = self.channels.write().await;
        let Some(mut channel) = channels.remove(&id) else {
            return false;
        };
        if channel.apply(ChannelInput::TransportClosed) == ChannelEffect::Deregister {
            self.metrics.record_channels_closed(1);
        }
        info!(channel = %id, live = channels.len(), "live feed channel deregistered");
        true
    }

    /// Queues the envelope for every open channel and returns how many accepted it.
    /// A full or closed queue only affects its own channel.
    pub async fn broadcast(&self, envelope: EventEnvelope) -> usize {
        let envelope = Arc::new(envelope);
        let channels = self.channels.read().await;
        let mut delivered = 0;
        for (id, channel) in channels.iter() {
            if !channel.is_open() {
                debug!(channel = %id, "skipping closed live feed channel");
                continue;
            }
            match channel.try_send(Arc::clone(&envelope)) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    self.metrics.record_delivery_failure();
                    warn!(
                        channel = %id,
                        kind = envelope.kind().as_str(),
                        "live feed channel queue full; envelope dropped"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!(channel = %id, "live feed channel closed during broadcast");
                }
            }
        }
        self.metrics.record_broadcast(delivered);
        debug!(kind = envelope.kind().as_str(), delivered, "broadcast envelope");
        delivered
    }

    /// Handles one text frame from a client. Only the subscribe handshake is
    /// recognised; everything else is logged and dropped without closing the channel.
    pub async fn handle_inbound(&self, id: ChannelId, raw: &str) -> InboundOutcome {
        if InboundMessage::parse(raw).is_err() {
            self.metrics.record_malformed_inbound();
            warn!(channel = %id, bytes = raw.len(), "ignoring malformed live feed message");
            return InboundOutcome::Malformed;
        }

        let mut channels = self.channels.write().await;
        let Some(channel) = channels.get_mut(&id) else {
            return InboundOutcome::UnknownChannel;
        };
        if channel.apply(ChannelInput::Handshake) == ChannelEffect::ConfirmSubscription {
            if let Err(err) = channel.try_send(Arc::new(EventEnvelope::subscribed())) {
                self.metrics.record_delivery_failure();
                warn!(channel = %id, "failed to confirm subscription: {}", err);
            }
        }
        debug!(channel = %id, "live feed channel subscribed");
        InboundOutcome::Subscribed
    }

    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }

    pub async fn snapshot(&self) -> LiveFeedSnapshot {
        let channels = self.channels.read().await;
        LiveFeedSnapshot {
            channels: channels.len(),
            subscribed: channels
                .values()
                .filter(|channel| channel.state().is_subscribed())
                .count(),
            max_channels: self.max_channels,
        }
    }

    /// Drops every outbound queue; connection tasks see the closed queue and hang up.
    pub async fn close_all(&self) -> usize {
        let mut channels = self.channels.write().await;
        let closed = channels.len();
        for (_, mut channel) in channels.drain() {
            channel.apply(ChannelInput::TransportClosed);
        }
        self.metrics.record_channels_closed(closed);
        info!(closed, "live feed closed all channels");
        closed
    }
}

#[async_trait]
impl EventPublisher for NotificationHub {
    async fn publish(&self, envelope: EventEnvelope) -> usize {
        self.broadcast(envelope).await
    }
}
