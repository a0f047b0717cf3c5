use super::{ClientInner, ClientState, ConnectionState, RealtimeClient};
use crate::config::RealtimeConfig;
use crate::infrastructure::Backoff;
use crate::messaging::MessageRouter;
use crate::transport::{EventSink, TransportFactory, pusher_factory};
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc, watch};

/// Builder for RealtimeClient that handles initialization
pub struct RealtimeClientBuilder {
    config: RealtimeConfig,
    factory: TransportFactory,
}

impl RealtimeClientBuilder {
    /// Create a new builder using the Pusher transport
    pub fn new(config: RealtimeConfig) -> Self {
        Self {
            config,
            factory: pusher_factory(),
        }
    }

    /// Replaces the transport factory, e.g. with a self-hosted gateway adapter
    pub fn transport_factory(mut self, factory: TransportFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Build the client, spawn the dispatcher task and start connecting.
    ///
    /// Must be called from within a tokio runtime. Never fails: a missing key
    /// leaves the client `disconnected` for good and a transport that cannot
    /// be built leaves it `failed` until [`RealtimeClient::reconnect`].
    pub fn build(self) -> RealtimeClient {
        let Self { config, factory } = self;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);

        let backoff = Backoff::new(config.reconnect_base(), config.max_reconnect_attempts);
        let mut client_state = ClientState::new(backoff, state_tx);

        if !config.has_key() {
            tracing::warn!("No connection key configured, realtime updates are disabled");
        } else {
            client_state.generation = 1;
            let sink = EventSink::new(client_state.generation, events_tx.clone());
            match factory(&config, sink) {
                Ok(transport) => {
                    client_state.set_connection(ConnectionState::Connecting);
                    transport.connect();
                    client_state.transport = Some(transport);
                }
                Err(e) => {
                    tracing::error!("Failed to initialize transport: {}", e);
                    client_state.set_connection(ConnectionState::Failed);
                }
            }
        }

        let inner = Arc::new(ClientInner {
            config,
            factory,
            events_tx,
            state_rx,
            state: RwLock::new(client_state),
        });

        let router = MessageRouter::new(Arc::downgrade(&inner));
        tokio::spawn(router.run(events_rx));

        RealtimeClient { inner }
    }
}
