use super::state::{BindingId, Callback, ChannelState, ChannelStatus, EventBinding};
use crate::client::{ClientInner, RealtimeClient};
use crate::types::constants::LISTENER_BUFFER_SIZE;
use parking_lot::RwLock;
use serde_json::Value;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;

/// Handle to one subscribed channel.
///
/// The registry hands out the same `Arc<RealtimeChannel>` to every caller that
/// subscribes to the same name, so bindings from different helpers share one
/// transport-level subscription.
///
/// # Example
///
/// ```no_run
/// use rivals_realtime::{RealtimeClient, RealtimeConfig};
///
/// # async fn example() {
/// let client = RealtimeClient::new(RealtimeConfig::from_env());
///
/// if let Some(channel) = client.subscribe("event.7").await {
///     channel.bind("bracket-updated", |data| {
///         println!("bracket changed: {}", data);
///     });
///
///     // On teardown
///     channel.unbind_all();
///     channel.unsubscribe().await;
/// }
/// # }
/// ```
pub struct RealtimeChannel {
    name: String,
    client: Weak<ClientInner>,
    state: RwLock<ChannelState>,
}

impl RealtimeChannel {
    pub(crate) fn new(name: String, client: Weak<ClientInner>) -> Self {
        Self {
            name,
            client,
            state: RwLock::new(ChannelState::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> ChannelStatus {
        self.state.read().status
    }

    pub fn is_subscribed(&self) -> bool {
        self.status() == ChannelStatus::Subscribed
    }

    pub(crate) fn set_status(&self, status: ChannelStatus) {
        self.state.write().status = status;
    }

    /// Binds `callback` to `event`. The same callback may be bound to many events.
    pub fn bind<F>(&self, event: impl Into<String>, callback: F) -> BindingId
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.bind_callback(event, Arc::new(callback))
    }

    pub fn bind_callback(&self, event: impl Into<String>, callback: Callback) -> BindingId {
        let mut state = self.state.write();
        let id = state.next_binding_id();
        state.bindings.push(EventBinding {
            id,
            event: event.into(),
            callback,
        });
        id
    }

    /// Registers a listener and returns a receiver of its payloads.
    ///
    /// Payloads are dropped with a warning when the receiver falls more than
    /// `LISTENER_BUFFER_SIZE` events behind.
    pub fn on(&self, event: impl Into<String>) -> mpsc::Receiver<Value> {
        let (tx, rx) = mpsc::channel(LISTENER_BUFFER_SIZE);
        let event = event.into();
        let label = format!("{}/{}", self.name, event);
        self.bind(event, move |payload| {
            if let Err(e) = tx.try_send(payload) {
                tracing::warn!(
                    "Failed to forward event '{}' to listener: {}. Receiver may be closed or full.",
                    label,
                    e
                );
            }
        });
        rx
    }

    /// Removes every binding for `event`
    pub fn unbind(&self, event: &str) {
        self.state.write().bindings.retain(|b| b.event != event);
    }

    pub fn unbind_binding(&self, id: BindingId) {
        self.state.write().bindings.retain(|b| b.id != id);
    }

    pub fn unbind_all(&self) {
        self.state.write().bindings.clear();
    }

    pub fn binding_count(&self) -> usize {
        self.state.read().bindings.len()
    }

    /// Unsubscribes this channel through the registry that created it.
    ///
    /// No-op when the client is gone or the registry already tracks a newer
    /// channel under the same name.
    pub async fn unsubscribe(&self) {
        if let Some(inner) = self.client.upgrade() {
            RealtimeClient::from_inner(inner)
                .unsubscribe_channel(self)
                .await;
        }
    }

    /// Marks the channel closed and drops its bindings
    pub(crate) fn close(&self) {
        let mut state = self.state.write();
        state.status = ChannelStatus::Closed;
        state.bindings.clear();
    }

    /// Delivers `payload` to every callback bound to `event`, in bind order.
    ///
    /// Callbacks run with no lock held. A panicking callback is logged and
    /// does not prevent delivery to the others. Returns how many callbacks
    /// completed.
    pub(crate) fn trigger(&self, event: &str, payload: Value) -> usize {
        let callbacks: Vec<Callback> = {
            let state = self.state.read();
            state
                .bindings
                .iter()
                .filter(|b| b.event == event)
                .map(|b| Arc::clone(&b.callback))
                .collect()
        };

        let mut delivered = 0;
        for callback in callbacks {
            let payload = payload.clone();
            match catch_unwind(AssertUnwindSafe(|| callback(payload))) {
                Ok(()) => delivered += 1,
                Err(_) => tracing::error!(
                    "Callback for '{}' on channel {} panicked",
                    event,
                    self.name
                ),
            }
        }
        delivered
    }
}

impl std::fmt::Debug for RealtimeChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeChannel")
            .field("name", &self.name)
            .field("status", &self.status())
            .field("bindings", &self.binding_count())
            .finish()
    }
}
