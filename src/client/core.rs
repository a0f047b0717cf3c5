use super::{ClientState, ConnectionState, RealtimeClientBuilder};
use crate::channel::RealtimeChannel;
use crate::config::RealtimeConfig;
use crate::infrastructure::HeartbeatManager;
use crate::transport::{EventSink, TransportEvent, TransportFactory};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc, watch};

pub(crate) struct ClientInner {
    pub(crate) config: RealtimeConfig,
    pub(crate) factory: TransportFactory,
    pub(crate) events_tx: mpsc::UnboundedSender<(u64, TransportEvent)>,
    pub(crate) state_rx: watch::Receiver<ConnectionState>,

    // Consolidated mutable state
    pub(crate) state: RwLock<ClientState>,
}

/// The main entry point for realtime match, forum and notification updates.
///
/// `RealtimeClient` owns the one shared transport connection, tracks its
/// state, keeps it alive with a heartbeat, reconnects with exponential backoff
/// after failures and routes inbound events to subscribed channels.
///
/// Build one per application and pass clones around; every clone shares the
/// same connection and channel registry.
///
/// # Example
///
/// ```no_run
/// use rivals_realtime::{RealtimeClient, RealtimeConfig};
///
/// # async fn example() {
/// let client = RealtimeClient::new(RealtimeConfig::from_env());
///
/// if let Some(channel) = client.subscribe("live-matches").await {
///     channel.bind("match-started", |data| println!("started: {}", data));
/// }
///
/// // On shutdown
/// client.cleanup().await;
/// # }
/// ```
#[derive(Clone)]
pub struct RealtimeClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl RealtimeClient {
    /// Creates a client using the Pusher transport and starts connecting.
    ///
    /// Never fails. Without a connection key the client stays `disconnected`
    /// and every operation is a no-op.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new(config: RealtimeConfig) -> Self {
        RealtimeClientBuilder::new(config).build()
    }

    pub fn builder(config: RealtimeConfig) -> RealtimeClientBuilder {
        RealtimeClientBuilder::new(config)
    }

    pub(crate) fn from_inner(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    pub fn config(&self) -> &RealtimeConfig {
        &self.inner.config
    }

    /// Whether `other` is a handle to the same client
    pub fn same_instance(&self, other: &RealtimeClient) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.inner.state_rx.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.connection_state() == ConnectionState::Connected
    }

    /// Receiver notified on every connection state transition
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        let mut rx = self.inner.state_rx.clone();
        // Only transitions after this call count as changes
        rx.mark_unchanged();
        rx
    }

    /// Asks the transport to connect.
    ///
    /// No-op while already connected or connecting. When automatic reconnects
    /// are exhausted, or the transport could never be built, the transport is
    /// rebuilt from scratch first.
    pub async fn reconnect(&self) {
        let mut state = self.inner.state.write().await;
        if state.terminated || !self.inner.config.has_key() {
            tracing::debug!("Reconnect ignored, client is inactive");
            return;
        }

        let exhausted =
            state.connection == ConnectionState::Failed && state.backoff.is_exhausted();
        if (state.transport.is_none() || exhausted) && !self.rebuild_transport(&mut state) {
            return;
        }

        if matches!(
            state.connection,
            ConnectionState::Connected | ConnectionState::Connecting
        ) {
            tracing::debug!("Already {}, skipping reconnect", state.connection);
            return;
        }

        state.reconnect_timer.cancel();
        Self::connect_locked(&mut state);
    }

    fn connect_locked(state: &mut ClientState) {
        if let Some(transport) = state.transport.clone() {
            tracing::info!("Connecting...");
            state.set_connection(ConnectionState::Connecting);
            transport.connect();
        }
    }

    /// Replaces the transport with a freshly built one. Returns `false` when
    /// the factory fails, leaving the client `failed`.
    fn rebuild_transport(&self, state: &mut ClientState) -> bool {
        state.heartbeat.cancel();
        state.reconnect_timer.cancel();
        if let Some(old) = state.transport.take() {
            old.disconnect();
        }

        state.generation += 1;
        let sink = EventSink::new(state.generation, self.inner.events_tx.clone());
        match (self.inner.factory)(&self.inner.config, sink) {
            Ok(transport) => {
                tracing::info!("Rebuilt transport (generation {})", state.generation);
                state.transport = Some(transport);
                state.backoff.reset();
                // Fresh transport, nothing is open yet
                state.set_connection(ConnectionState::Disconnected);
                true
            }
            Err(e) => {
                tracing::error!("Failed to rebuild transport: {}", e);
                state.set_connection(ConnectionState::Failed);
                false
            }
        }
    }

    async fn fire_scheduled_reconnect(&self) {
        let mut state = self.inner.state.write().await;
        state.reconnect_timer.disarm();
        if state.terminated || state.connection != ConnectionState::Failed {
            tracing::debug!("Scheduled reconnect no longer needed");
            return;
        }
        tracing::info!(
            "Attempting to reconnect (attempt {})",
            state.backoff.attempts()
        );
        Self::connect_locked(&mut state);
    }

    /// Closes the connection and stops the heartbeat. Tracked channels are
    /// kept and resubscribed on the next connect.
    pub async fn disconnect(&self) {
        let mut state = self.inner.state.write().await;
        if state.terminated {
            return;
        }
        Self::disconnect_locked(&mut state);
    }

    fn disconnect_locked(state: &mut ClientState) {
        state.heartbeat.cancel();
        state.reconnect_timer.cancel();
        state.channels.mark_all_pending();
        state.set_connection(ConnectionState::Disconnected);
        if let Some(transport) = state.transport.clone() {
            tracing::info!("Disconnecting");
            transport.disconnect();
        }
    }

    /// Full teardown: cancels every timer, unsubscribes every channel and
    /// closes the transport. The client stays inert afterwards.
    pub async fn cleanup(&self) {
        let mut state = self.inner.state.write().await;
        if state.terminated {
            return;
        }

        state.heartbeat.cancel();
        state.background_timer.cancel();
        state.reconnect_timer.cancel();

        let transport = state.transport.take();
        for channel in state.channels.drain() {
            if let Some(transport) = &transport {
                transport.unsubscribe(channel.name());
            }
            channel.close();
        }
        if let Some(transport) = transport {
            transport.disconnect();
        }

        state.backgrounded = false;
        state.set_connection(ConnectionState::Disconnected);
        state.terminated = true;
        tracing::info!("Realtime client cleaned up");
    }

    /// Marks the host as backgrounded and arms the suspend timer, replacing
    /// any pending one. The connection is released if the host is still in
    /// background once the grace period elapses.
    pub async fn enter_background(&self) {
        let mut state = self.inner.state.write().await;
        if state.terminated {
            return;
        }
        state.backgrounded = true;

        let grace = self.inner.config.background_grace();
        let client = Arc::downgrade(&self.inner);
        state.background_timer.arm(grace, async move {
            if let Some(inner) = client.upgrade() {
                RealtimeClient::from_inner(inner)
                    .fire_background_suspend()
                    .await;
            }
        });
        tracing::debug!("Entered background, suspending in {:?}", grace);
    }

    async fn fire_background_suspend(&self) {
        let mut state = self.inner.state.write().await;
        state.background_timer.disarm();
        if state.backgrounded && !state.terminated {
            tracing::info!("Still in background, releasing connection");
            Self::disconnect_locked(&mut state);
        }
    }

    /// Clears the background flag and cancels a pending suspend
    pub async fn enter_foreground(&self) {
        let mut state = self.inner.state.write().await;
        state.backgrounded = false;
        state.background_timer.cancel();
    }

    /// Returns the channel for `name`, subscribing on first use.
    ///
    /// `None` when no transport is available (no key configured, transport
    /// build failed, or after `cleanup()`).
    pub async fn subscribe(&self, name: &str) -> Option<Arc<RealtimeChannel>> {
        let mut state = self.inner.state.write().await;
        if state.terminated {
            return None;
        }
        let Some(transport) = state.transport.clone() else {
            tracing::warn!("Realtime unavailable, not subscribing to {}", name);
            return None;
        };

        let connected = state.connection == ConnectionState::Connected;
        let client = Arc::downgrade(&self.inner);
        Some(
            state
                .channels
                .subscribe(name, transport.as_ref(), connected, client),
        )
    }

    /// Stops tracking `name`. Unknown names are ignored.
    pub async fn unsubscribe(&self, name: &str) {
        let mut state = self.inner.state.write().await;
        let transport = state.transport.clone();
        if state
            .channels
            .unsubscribe(name, transport.as_deref())
            .is_some()
        {
            tracing::info!("Unsubscribed from {}", name);
        }
    }

    /// Unsubscribes `channel` only if it is still the tracked handle for its name
    pub(crate) async fn unsubscribe_channel(&self, channel: &RealtimeChannel) {
        let mut state = self.inner.state.write().await;
        let is_current = state
            .channels
            .get(channel.name())
            .is_some_and(|current| std::ptr::eq(Arc::as_ptr(&current), channel));
        if !is_current {
            tracing::debug!("Ignoring unsubscribe from stale handle {}", channel.name());
            return;
        }

        let transport = state.transport.clone();
        state.channels.unsubscribe(channel.name(), transport.as_deref());
        tracing::info!("Unsubscribed from {}", channel.name());
    }

    pub async fn channel(&self, name: &str) -> Option<Arc<RealtimeChannel>> {
        self.inner.state.read().await.channels.get(name)
    }

    pub async fn channel_names(&self) -> Vec<String> {
        self.inner.state.read().await.channels.names()
    }

    pub async fn heartbeat_active(&self) -> bool {
        self.inner.state.read().await.heartbeat.is_armed()
    }

    pub async fn backoff_attempts(&self) -> u32 {
        self.inner.state.read().await.backoff.attempts()
    }

    pub async fn reconnect_scheduled(&self) -> bool {
        self.inner.state.read().await.reconnect_timer.is_armed()
    }

    pub async fn background_suspend_armed(&self) -> bool {
        self.inner.state.read().await.background_timer.is_armed()
    }

    pub async fn is_backgrounded(&self) -> bool {
        self.inner.state.read().await.backgrounded
    }

    pub async fn is_terminated(&self) -> bool {
        self.inner.state.read().await.terminated
    }

    // Transport event hooks, called in order by the MessageRouter

    pub(crate) async fn transport_connecting(&self, generation: u64) {
        let mut state = self.inner.state.write().await;
        if state.accepts(generation) {
            state.set_connection(ConnectionState::Connecting);
        }
    }

    pub(crate) async fn transport_connected(&self, generation: u64, socket_id: &str) {
        let mut state = self.inner.state.write().await;
        if !state.accepts(generation) {
            return;
        }
        let Some(transport) = state.transport.clone() else {
            return;
        };

        tracing::info!("Connected (socket {})", socket_id);
        state.set_connection(ConnectionState::Connected);
        state.backoff.reset();
        state.reconnect_timer.cancel();

        HeartbeatManager::new(&transport)
            .with_interval(self.inner.config.heartbeat_interval())
            .start(&mut state.heartbeat);

        state.channels.resubscribe_all(transport.as_ref());
    }

    pub(crate) async fn transport_disconnected(&self, generation: u64) {
        let mut state = self.inner.state.write().await;
        if !state.accepts(generation) {
            return;
        }
        state.heartbeat.cancel();
        state.channels.mark_all_pending();
        if state.connection != ConnectionState::Disconnected {
            tracing::info!("Disconnected");
            state.set_connection(ConnectionState::Disconnected);
        }
    }

    pub(crate) async fn transport_failed(&self, generation: u64, reason: &str) {
        let mut state = self.inner.state.write().await;
        if !state.accepts(generation) {
            return;
        }

        tracing::error!("Connection failed: {}", reason);
        state.heartbeat.cancel();
        state.channels.mark_all_pending();
        state.set_connection(ConnectionState::Failed);

        match state.backoff.next_delay() {
            Some(delay) => {
                tracing::info!(
                    "Reconnecting in {:?} (attempt {})",
                    delay,
                    state.backoff.attempts()
                );
                let client = Arc::downgrade(&self.inner);
                state.reconnect_timer.arm(delay, async move {
                    if let Some(inner) = client.upgrade() {
                        RealtimeClient::from_inner(inner)
                            .fire_scheduled_reconnect()
                            .await;
                    }
                });
            }
            None => {
                tracing::error!(
                    "Max reconnection attempts reached, call reconnect() to retry"
                );
            }
        }
    }

    pub(crate) async fn subscription_succeeded(&self, generation: u64, channel: &str) {
        let state = self.inner.state.read().await;
        if !state.accepts(generation) {
            return;
        }
        if let Some(channel) = state.channels.get(channel) {
            channel.set_status(crate::channel::ChannelStatus::Subscribed);
            tracing::info!("Subscribed to {}", channel.name());
        }
    }

    pub(crate) async fn subscription_failed(&self, generation: u64, channel: &str, error: &str) {
        let state = self.inner.state.read().await;
        if !state.accepts(generation) {
            return;
        }
        if let Some(channel) = state.channels.get(channel) {
            channel.set_status(crate::channel::ChannelStatus::Errored);
        }
        tracing::warn!("Failed to subscribe to {}: {}", channel, error);
    }

    /// Delivers an inbound event to the channel's bindings, outside any lock
    pub(crate) async fn dispatch_message(
        &self,
        generation: u64,
        channel: &str,
        event: &str,
        data: Value,
    ) {
        let target = {
            let state = self.inner.state.read().await;
            if !state.accepts(generation) {
                return;
            }
            state.channels.get(channel)
        };

        match target {
            Some(target) => {
                if target.trigger(event, data) == 0 {
                    tracing::debug!("No bindings for '{}' on {}", event, channel);
                }
            }
            None => tracing::debug!("Dropping '{}' for untracked channel {}", event, channel),
        }
    }
}

impl std::fmt::Debug for RealtimeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeClient")
            .field("state", &self.connection_state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelStatus;
    use crate::transport::testing::{Call, fake_client, fake_factory, settle};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::{self, Instant};

    async fn connected_client() -> (RealtimeClient, Arc<crate::transport::testing::FakeHub>) {
        let (client, hub) = fake_client();
        hub.current().connected();
        settle().await;
        assert_eq!(client.connection_state(), ConnectionState::Connected);
        (client, hub)
    }

    #[tokio::test(start_paused = true)]
    async fn test_build_starts_connecting() {
        let (client, hub) = fake_client();

        assert_eq!(client.connection_state(), ConnectionState::Connecting);
        assert_eq!(hub.built(), 1);
        assert_eq!(hub.current().calls(), vec![Call::Connect]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_one_instance() {
        let (client, hub) = fake_client();
        let other = client.clone();

        assert!(client.same_instance(&other));
        other.reconnect().await;
        assert_eq!(hub.built(), 1);

        let (separate, _) = fake_client();
        assert!(!client.same_instance(&separate));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_is_idempotent() {
        let (client, hub) = connected_client().await;

        let first = client.subscribe("match.42").await.unwrap();
        let second = client.subscribe("match.42").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            hub.current().count(&Call::Subscribe("match.42".to_string())),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_while_connecting_waits_for_connected() {
        let (client, hub) = fake_client();
        let transport = hub.current();

        client.subscribe("live-matches").await.unwrap();
        assert_eq!(transport.count(&Call::Subscribe("live-matches".to_string())), 0);

        transport.connected();
        settle().await;
        assert_eq!(transport.count(&Call::Subscribe("live-matches".to_string())), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe_unknown_channel_is_noop() {
        let (client, hub) = connected_client().await;

        client.unsubscribe("does-not-exist").await;
        client.unsubscribe("does-not-exist").await;

        assert_eq!(hub.current().calls(), vec![Call::Connect]);
        assert_eq!(client.connection_state(), ConnectionState::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe_then_resubscribe_same_tick() {
        let (client, hub) = connected_client().await;
        let transport = hub.current();

        let old = client.subscribe("thread.9").await.unwrap();
        client.unsubscribe("thread.9").await;
        let new = client.subscribe("thread.9").await.unwrap();

        assert!(!Arc::ptr_eq(&old, &new));
        assert_eq!(old.status(), ChannelStatus::Closed);
        assert_eq!(transport.count(&Call::Subscribe("thread.9".to_string())), 2);
        assert_eq!(transport.count(&Call::Unsubscribe("thread.9".to_string())), 1);
        assert_eq!(client.channel_names().await, vec!["thread.9".to_string()]);

        // The replaced handle no longer controls the registry entry
        old.unsubscribe().await;
        assert_eq!(client.channel_names().await, vec!["thread.9".to_string()]);

        new.unsubscribe().await;
        assert!(client.channel_names().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_delays_double_then_stop() {
        let (client, hub) = connected_client().await;
        let transport = hub.current();

        let mut delays = Vec::new();
        for _ in 0..5 {
            let failed_at = Instant::now();
            let connects = transport.count(&Call::Connect);
            transport.failed();
            settle().await;
            assert_eq!(client.connection_state(), ConnectionState::Failed);
            assert!(client.reconnect_scheduled().await);

            time::sleep(Duration::from_secs(20)).await;
            let times = transport.times(&Call::Connect);
            assert_eq!(times.len(), connects + 1);
            delays.push(times[connects] - failed_at);
        }

        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
                Duration::from_secs(16),
            ]
        );

        // Sixth failure: nothing more is scheduled
        let connects = transport.count(&Call::Connect);
        transport.failed();
        settle().await;
        assert!(!client.reconnect_scheduled().await);
        time::sleep(Duration::from_secs(120)).await;
        assert_eq!(transport.count(&Call::Connect), connects);
        assert_eq!(client.connection_state(), ConnectionState::Failed);
        assert_eq!(client.backoff_attempts().await, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_reconnect_after_exhaustion_rebuilds_transport() {
        let (client, hub) = connected_client().await;
        let first = hub.current();

        for _ in 0..6 {
            first.failed();
            settle().await;
            time::sleep(Duration::from_secs(20)).await;
        }
        assert_eq!(client.backoff_attempts().await, 5);

        client.reconnect().await;

        assert_eq!(hub.built(), 2);
        assert_eq!(first.count(&Call::Disconnect), 1);
        let second = hub.current();
        assert_eq!(second.calls(), vec![Call::Connect]);
        assert_eq!(client.backoff_attempts().await, 0);
        assert_eq!(client.connection_state(), ConnectionState::Connecting);

        // Late events from the replaced transport are ignored
        first.connected();
        settle().await;
        assert_eq!(client.connection_state(), ConnectionState::Connecting);

        second.connected();
        settle().await;
        assert_eq!(client.connection_state(), ConnectionState::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_build_failure_leaves_failed_until_reconnect() {
        let (factory, hub) = fake_factory();
        hub.fail_next_builds(1);
        let client = RealtimeClient::builder(RealtimeConfig::with_key("test-key"))
            .transport_factory(factory)
            .build();

        assert_eq!(client.connection_state(), ConnectionState::Failed);
        assert!(client.subscribe("global").await.is_none());

        client.reconnect().await;
        assert_eq!(hub.built(), 1);
        assert_eq!(client.connection_state(), ConnectionState::Connecting);
        assert!(client.subscribe("global").await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_runs_only_while_connected() {
        let (client, hub) = fake_client();
        let transport = hub.current();
        assert!(!client.heartbeat_active().await);

        transport.connected();
        settle().await;
        assert!(client.heartbeat_active().await);

        time::sleep(Duration::from_secs(31)).await;
        assert_eq!(transport.count(&Call::Keepalive), 1);

        transport.failed();
        settle().await;
        assert!(!client.heartbeat_active().await);

        time::sleep(Duration::from_secs(90)).await;
        assert_eq!(transport.count(&Call::Keepalive), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_disconnect_stops_heartbeat_without_retry() {
        let (client, hub) = connected_client().await;
        let transport = hub.current();

        transport.emit(TransportEvent::Disconnected);
        settle().await;

        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
        assert!(!client.heartbeat_active().await);
        assert!(!client.reconnect_scheduled().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_is_idempotent() {
        let (client, hub) = fake_client();
        client.reconnect().await;
        assert_eq!(hub.current().count(&Call::Connect), 1);

        hub.current().connected();
        settle().await;
        client.reconnect().await;
        assert_eq!(hub.current().count(&Call::Connect), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_keeps_channels_for_next_connect() {
        let (client, hub) = connected_client().await;
        let transport = hub.current();
        client.subscribe("event.7").await.unwrap();

        client.disconnect().await;
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
        assert!(!client.heartbeat_active().await);
        assert_eq!(transport.count(&Call::Disconnect), 1);
        assert_eq!(client.channel_names().await, vec!["event.7".to_string()]);

        client.reconnect().await;
        transport.connected();
        settle().await;
        assert_eq!(transport.count(&Call::Subscribe("event.7".to_string())), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscription_survives_reconnect() {
        let (client, hub) = connected_client().await;
        let transport = hub.current();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let channel = client.subscribe("event.7").await.unwrap();
        channel.bind("bracket-updated", move |data| sink.lock().push(data));

        transport.failed();
        settle().await;
        time::sleep(Duration::from_millis(1_100)).await;
        assert_eq!(client.connection_state(), ConnectionState::Connecting);

        transport.connected();
        settle().await;
        assert_eq!(client.backoff_attempts().await, 0);
        assert_eq!(transport.count(&Call::Subscribe("event.7".to_string())), 2);

        transport.message("event.7", "bracket-updated", json!({"round": 3}));
        settle().await;
        assert_eq!(*seen.lock(), vec![json!({"round": 3})]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscription_error_is_isolated() {
        let (client, hub) = connected_client().await;
        let transport = hub.current();
        let private = client.subscribe("private-user.5").await.unwrap();
        let public = client.subscribe("global").await.unwrap();

        transport.emit(TransportEvent::SubscriptionError {
            channel: "private-user.5".to_string(),
            error: "403".to_string(),
        });
        transport.emit(TransportEvent::SubscriptionSucceeded {
            channel: "global".to_string(),
        });
        settle().await;

        assert_eq!(private.status(), ChannelStatus::Errored);
        assert_eq!(public.status(), ChannelStatus::Subscribed);
        assert_eq!(client.connection_state(), ConnectionState::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_delivered_in_arrival_order() {
        let (client, hub) = connected_client().await;
        let transport = hub.current();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        client
            .subscribe("match.42")
            .await
            .unwrap()
            .bind("score-updated", move |data| sink.lock().push(data));

        for score in 0..10 {
            transport.message("match.42", "score-updated", json!(score));
        }
        transport.message("match.43", "score-updated", json!(99));
        settle().await;

        assert_eq!(*seen.lock(), (0..10).map(|s| json!(s)).collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_key_is_inert() {
        let (factory, hub) = fake_factory();
        let client = RealtimeClient::builder(RealtimeConfig::default())
            .transport_factory(factory)
            .build();

        assert_eq!(hub.built(), 0);
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
        assert!(client.subscribe("match.42").await.is_none());

        client.reconnect().await;
        client.unsubscribe("match.42").await;
        client.disconnect().await;
        client.enter_background().await;
        time::sleep(Duration::from_secs(300)).await;

        assert_eq!(hub.built(), 0);
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_releases_everything() {
        let (client, hub) = connected_client().await;
        let transport = hub.current();
        let channel = client.subscribe("user.3").await.unwrap();
        channel.bind("notification", |_| {});
        client.enter_background().await;

        client.cleanup().await;

        assert!(client.is_terminated().await);
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
        assert!(!client.heartbeat_active().await);
        assert!(!client.background_suspend_armed().await);
        assert_eq!(transport.count(&Call::Unsubscribe("user.3".to_string())), 1);
        assert_eq!(transport.count(&Call::Disconnect), 1);
        assert_eq!(channel.status(), ChannelStatus::Closed);
        assert_eq!(channel.binding_count(), 0);

        // Nothing resurrects the client
        assert!(client.subscribe("user.3").await.is_none());
        client.reconnect().await;
        transport.connected();
        settle().await;
        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
        assert_eq!(transport.count(&Call::Connect), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_changes_are_observable() {
        let (client, hub) = fake_client();
        let mut changes = client.state_changes();
        // Connecting happened before the receiver existed
        assert!(!changes.has_changed().unwrap());
        assert_eq!(*changes.borrow(), ConnectionState::Connecting);

        hub.current().connected();
        changes.changed().await.unwrap();
        assert_eq!(*changes.borrow_and_update(), ConnectionState::Connected);
    }
}
