use serde_json::Value;
use std::sync::Arc;

/// Callback bound to a channel event. Payloads are passed through verbatim.
pub type Callback = Arc<dyn Fn(Value) + Send + Sync + 'static>;

/// Identifies one binding on one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(pub(crate) u64);

/// Where a channel stands with the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    /// Tracked, waiting for the transport to confirm
    Pending,
    Subscribed,
    /// The provider refused the subscription (e.g. authorization)
    Errored,
    Closed,
}

/// One callback bound to one event name
pub struct EventBinding {
    pub id: BindingId,
    pub event: String,
    pub callback: Callback,
}

/// Status and bindings, guarded by the channel lock
pub struct ChannelState {
    pub status: ChannelStatus,
    pub bindings: Vec<EventBinding>,
    next_binding: u64,
}

impl ChannelState {
    pub fn new() -> Self {
        Self {
            status: ChannelStatus::Pending,
            bindings: Vec::new(),
            next_binding: 0,
        }
    }

    pub fn next_binding_id(&mut self) -> BindingId {
        self.next_binding += 1;
        BindingId(self.next_binding)
    }
}

impl Default for ChannelState {
    fn default() -> Self {
        Self::new()
    }
}
