use super::{BindingId, RealtimeChannel};
use std::sync::Arc;

/// What a channel helper hands back: the shared channel handle plus the
/// bindings that particular helper call created.
///
/// `unbind` releases only those bindings, leaving other callers that share the
/// channel untouched. `unbind_all` and `unsubscribe` act on the whole channel.
#[derive(Debug, Clone)]
pub struct ChannelSubscription {
    channel: Arc<RealtimeChannel>,
    bindings: Vec<BindingId>,
}

impl ChannelSubscription {
    pub(crate) fn new(channel: Arc<RealtimeChannel>, bindings: Vec<BindingId>) -> Self {
        Self { channel, bindings }
    }

    pub fn channel(&self) -> &Arc<RealtimeChannel> {
        &self.channel
    }

    pub fn name(&self) -> &str {
        self.channel.name()
    }

    pub fn binding_ids(&self) -> &[BindingId] {
        &self.bindings
    }

    pub fn unbind(&self) {
        for id in &self.bindings {
            self.channel.unbind_binding(*id);
        }
    }

    pub fn unbind_all(&self) {
        self.channel.unbind_all();
    }

    pub async fn unsubscribe(&self) {
        self.channel.unsubscribe().await;
    }
}
