use super::{ChannelStatus, RealtimeChannel};
use crate::client::ClientInner;
use crate::transport::Transport;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Channel name → subscription handle.
///
/// Holds at most one channel per name. The transport is asked to subscribe
/// only when a name is first tracked while connected, or when every tracked
/// name is replayed after a (re)connect.
#[derive(Default)]
pub struct ChannelRegistry {
    channels: HashMap<String, Arc<RealtimeChannel>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<RealtimeChannel>> {
        self.channels.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the tracked channel for `name`, creating it on first use
    pub(crate) fn subscribe(
        &mut self,
        name: &str,
        transport: &dyn Transport,
        connected: bool,
        client: Weak<ClientInner>,
    ) -> Arc<RealtimeChannel> {
        if let Some(existing) = self.channels.get(name) {
            return Arc::clone(existing);
        }

        let channel = Arc::new(RealtimeChannel::new(name.to_string(), client));
        self.channels.insert(name.to_string(), Arc::clone(&channel));

        if connected {
            tracing::info!("Subscribing to channel: {}", name);
            transport.subscribe(name);
        } else {
            tracing::debug!("Channel {} will subscribe once connected", name);
        }
        channel
    }

    /// Stops tracking `name` and closes its handle. Unknown names are ignored.
    pub(crate) fn unsubscribe(
        &mut self,
        name: &str,
        transport: Option<&dyn Transport>,
    ) -> Option<Arc<RealtimeChannel>> {
        let channel = self.channels.remove(name)?;
        if let Some(transport) = transport {
            transport.unsubscribe(name);
        }
        channel.close();
        Some(channel)
    }

    /// Re-issues the transport subscribe for every tracked channel
    pub(crate) fn resubscribe_all(&self, transport: &dyn Transport) {
        for (name, channel) in self.channels.iter() {
            channel.set_status(ChannelStatus::Pending);
            tracing::debug!("Resubscribing to channel: {}", name);
            transport.subscribe(name);
        }
    }

    /// Marks every channel pending again, e.g. after the socket dropped
    pub(crate) fn mark_all_pending(&self) {
        for channel in self.channels.values() {
            if channel.status() == ChannelStatus::Subscribed {
                channel.set_status(ChannelStatus::Pending);
            }
        }
    }

    pub(crate) fn drain(&mut self) -> Vec<Arc<RealtimeChannel>> {
        self.channels.drain().map(|(_, channel)| channel).collect()
    }
}
