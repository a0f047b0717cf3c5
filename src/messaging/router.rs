use crate::client::{ClientInner, RealtimeClient};
use crate::transport::TransportEvent;
use std::sync::Weak;
use tokio::sync::mpsc;

/// Applies transport events to the client, one at a time, in arrival order
pub struct MessageRouter {
    client: Weak<ClientInner>,
}

impl MessageRouter {
    pub(crate) fn new(client: Weak<ClientInner>) -> Self {
        Self { client }
    }

    /// Drains `events` until every sender is gone or the client is dropped
    pub async fn run(self, mut events: mpsc::UnboundedReceiver<(u64, TransportEvent)>) {
        while let Some((generation, event)) = events.recv().await {
            let Some(inner) = self.client.upgrade() else {
                break;
            };
            Self::route(&RealtimeClient::from_inner(inner), generation, event).await;
        }
        tracing::debug!("Message router finished");
    }

    /// Routes one event to the matching lifecycle or channel handler
    async fn route(client: &RealtimeClient, generation: u64, event: TransportEvent) {
        match event {
            TransportEvent::Connecting => client.transport_connecting(generation).await,
            TransportEvent::Connected { socket_id } => {
                client.transport_connected(generation, &socket_id).await
            }
            TransportEvent::Disconnected => client.transport_disconnected(generation).await,
            TransportEvent::Failed { reason } => {
                client.transport_failed(generation, &reason).await
            }
            TransportEvent::Error { message } => {
                tracing::warn!("Transport error: {}", message);
            }
            TransportEvent::SubscriptionSucceeded { channel } => {
                client.subscription_succeeded(generation, &channel).await
            }
            TransportEvent::SubscriptionError { channel, error } => {
                client.subscription_failed(generation, &channel, &error).await
            }
            TransportEvent::Message {
                channel,
                event,
                data,
            } => {
                tracing::debug!("Routing message: channel={}, event={}", channel, event);
                client
                    .dispatch_message(generation, &channel, &event, data)
                    .await
            }
        }
    }
}
