use super::connection::ConnectionState;
use crate::channel::ChannelRegistry;
use crate::infrastructure::{Backoff, Timer};
use crate::transport::Transport;
use std::sync::Arc;
use tokio::sync::watch;

/// Consolidated mutable state for RealtimeClient
/// Using a single struct keeps every transition under one lock
pub struct ClientState {
    /// Current connection state; mirrored into the watch channel
    pub connection: ConnectionState,

    /// The live transport, if one could be built
    pub transport: Option<Arc<dyn Transport>>,

    /// Generation of `transport`; events tagged with an older one are stale
    pub generation: u64,

    /// All channels managed by this client
    pub channels: ChannelRegistry,

    pub backoff: Backoff,

    pub heartbeat: Timer,
    pub reconnect_timer: Timer,
    pub background_timer: Timer,

    pub backgrounded: bool,

    /// Set by `cleanup()`, never cleared
    pub terminated: bool,

    state_tx: watch::Sender<ConnectionState>,
}

impl ClientState {
    pub fn new(backoff: Backoff, state_tx: watch::Sender<ConnectionState>) -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            transport: None,
            generation: 0,
            channels: ChannelRegistry::new(),
            backoff,
            heartbeat: Timer::new(),
            reconnect_timer: Timer::new(),
            background_timer: Timer::new(),
            backgrounded: false,
            terminated: false,
            state_tx,
        }
    }

    /// Moves to `next` and notifies state watchers. Re-entering the current
    /// state is silent.
    pub fn set_connection(&mut self, next: ConnectionState) {
        let previous = self.connection;
        if previous == next {
            return;
        }
        self.connection = next;
        tracing::debug!("state: {} → {}", previous, next);
        self.state_tx.send_replace(next);
    }

    /// Whether an event from transport `generation` should still be applied
    pub fn accepts(&self, generation: u64) -> bool {
        !self.terminated && self.generation == generation
    }
}
