//! Transport adapter.
//!
//! A transport wraps one bidirectional pub/sub socket. Every method is
//! fire-and-forget: results are reported later as [`TransportEvent`]s through
//! the [`EventSink`] the transport was built with.

mod pusher;
#[cfg(test)]
pub(crate) mod testing;

pub use pusher::PusherTransport;

use crate::config::RealtimeConfig;
use crate::types::Result;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Commands the lifecycle manager issues to the socket
pub trait Transport: Send + Sync {
    /// Starts connecting. No-op when a socket is already open or opening.
    fn connect(&self);

    /// Closes the socket. Reports `Disconnected`.
    fn disconnect(&self);

    fn subscribe(&self, channel: &str);

    fn unsubscribe(&self, channel: &str);

    /// Provider-specific keepalive frame
    fn send_keepalive(&self);
}

/// Raw events reported by a transport
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Connecting,
    Connected { socket_id: String },
    Disconnected,
    Failed { reason: String },
    Error { message: String },
    SubscriptionSucceeded { channel: String },
    SubscriptionError { channel: String, error: String },
    Message { channel: String, event: String, data: Value },
}

/// Sender half handed to a transport. Events are tagged with the transport
/// generation so events from a replaced transport can be discarded.
#[derive(Clone)]
pub struct EventSink {
    generation: u64,
    tx: mpsc::UnboundedSender<(u64, TransportEvent)>,
}

impl EventSink {
    pub(crate) fn new(generation: u64, tx: mpsc::UnboundedSender<(u64, TransportEvent)>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn emit(&self, event: TransportEvent) {
        if self.tx.send((self.generation, event)).is_err() {
            tracing::debug!("Client dropped, discarding transport event");
        }
    }
}

/// Builds a transport for the given configuration
pub type TransportFactory =
    Arc<dyn Fn(&RealtimeConfig, EventSink) -> Result<Arc<dyn Transport>> + Send + Sync>;

/// Factory producing [`PusherTransport`]s
pub fn pusher_factory() -> TransportFactory {
    Arc::new(|config: &RealtimeConfig, sink: EventSink| {
        let transport: Arc<dyn Transport> = Arc::new(PusherTransport::new(config, sink)?);
        Ok(transport)
    })
}
