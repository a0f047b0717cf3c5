//! Host environment policy.
//!
//! Adapts connection liveness to visibility, connectivity and app lifecycle
//! signals without knowing anything about individual channels. Signals come
//! from whatever the host provides (a browser bridge, a mobile shell, a test)
//! as a [`Stream`] of [`EnvironmentSignal`]s.

use crate::client::{ConnectionState, RealtimeClient};
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Online,
    Offline,
}

/// App suspend/resume, independent of visibility on some platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Suspend,
    Resume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentSignal {
    Visibility(Visibility),
    Network(Network),
    Lifecycle(Lifecycle),
}

impl EnvironmentSignal {
    fn is_background(&self) -> bool {
        matches!(
            self,
            Self::Visibility(Visibility::Hidden) | Self::Lifecycle(Lifecycle::Suspend)
        )
    }

    fn is_foreground(&self) -> bool {
        matches!(
            self,
            Self::Visibility(Visibility::Visible) | Self::Lifecycle(Lifecycle::Resume)
        )
    }
}

/// Suspends the connection after sustained backgrounding, drops it while
/// offline, and brings it back on foreground or reconnection.
pub struct EnvironmentPolicy {
    client: RealtimeClient,
    online: Mutex<bool>,
}

impl EnvironmentPolicy {
    /// Starts out foregrounded and online
    pub fn new(client: RealtimeClient) -> Self {
        Self {
            client,
            online: Mutex::new(true),
        }
    }

    pub fn client(&self) -> &RealtimeClient {
        &self.client
    }

    pub fn is_online(&self) -> bool {
        *self.online.lock()
    }

    pub async fn is_backgrounded(&self) -> bool {
        self.client.is_backgrounded().await
    }

    /// Applies one signal
    pub async fn handle(&self, signal: EnvironmentSignal) {
        tracing::debug!("Environment signal: {:?}", signal);

        if signal.is_background() {
            self.client.enter_background().await;
        } else if signal.is_foreground() {
            self.client.enter_foreground().await;
            self.resume_if_disconnected().await;
        } else if signal == EnvironmentSignal::Network(Network::Offline) {
            *self.online.lock() = false;
            tracing::info!("Network offline, disconnecting");
            self.client.disconnect().await;
        } else if signal == EnvironmentSignal::Network(Network::Online) {
            *self.online.lock() = true;
            self.resume_if_disconnected().await;
        }
    }

    async fn resume_if_disconnected(&self) {
        if self.client.connection_state() == ConnectionState::Disconnected {
            tracing::info!("Resuming realtime connection");
            self.client.reconnect().await;
        }
    }

    /// Consumes `signals` on a background task until the stream ends
    pub fn spawn<S>(self: Arc<Self>, signals: S) -> JoinHandle<()>
    where
        S: Stream<Item = EnvironmentSignal> + Send + 'static,
    {
        tokio::spawn(async move {
            let mut signals = std::pin::pin!(signals);
            while let Some(signal) = signals.next().await {
                self.handle(signal).await;
            }
            tracing::debug!("Environment signal stream ended");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::{Call, FakeHub, fake_client, settle};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::{self, Instant};

    const HIDDEN: EnvironmentSignal = EnvironmentSignal::Visibility(Visibility::Hidden);
    const VISIBLE: EnvironmentSignal = EnvironmentSignal::Visibility(Visibility::Visible);
    const OFFLINE: EnvironmentSignal = EnvironmentSignal::Network(Network::Offline);
    const ONLINE: EnvironmentSignal = EnvironmentSignal::Network(Network::Online);

    async fn connected_policy() -> (EnvironmentPolicy, Arc<FakeHub>) {
        let (client, hub) = fake_client();
        hub.current().connected();
        settle().await;
        (EnvironmentPolicy::new(client), hub)
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_background_keeps_connection() {
        let (policy, hub) = connected_policy().await;

        policy.handle(HIDDEN).await;
        assert!(policy.client().background_suspend_armed().await);
        time::sleep(Duration::from_secs(15)).await;
        policy.handle(VISIBLE).await;
        time::sleep(Duration::from_secs(60)).await;

        assert_eq!(hub.current().count(&Call::Disconnect), 0);
        assert!(!policy.client().background_suspend_armed().await);
        assert!(policy.client().is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sustained_background_disconnects_once_at_grace() {
        let (policy, hub) = connected_policy().await;
        let transport = hub.current();
        let start = Instant::now();

        policy.handle(HIDDEN).await;
        time::sleep(Duration::from_secs(45)).await;
        assert_eq!(
            policy.client().connection_state(),
            ConnectionState::Disconnected
        );
        assert!(!policy.client().heartbeat_active().await);

        policy.handle(VISIBLE).await;

        let disconnects = transport.times(&Call::Disconnect);
        assert_eq!(disconnects, vec![start + Duration::from_secs(30)]);
        // Foreground brings the connection back
        assert_eq!(transport.count(&Call::Connect), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_toggling_arms_one_timer() {
        let (policy, hub) = connected_policy().await;
        let start = Instant::now();

        for _ in 0..5 {
            policy.handle(HIDDEN).await;
            time::sleep(Duration::from_secs(2)).await;
            policy.handle(VISIBLE).await;
            time::sleep(Duration::from_secs(1)).await;
        }
        policy.handle(HIDDEN).await;
        policy.handle(EnvironmentSignal::Lifecycle(Lifecycle::Suspend)).await;
        time::sleep(Duration::from_secs(120)).await;

        // Only the last arming fires, 30s after it
        assert_eq!(
            hub.current().times(&Call::Disconnect),
            vec![start + Duration::from_secs(45)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_offline_disconnects_immediately() {
        let (policy, hub) = connected_policy().await;
        let at = Instant::now();

        policy.handle(OFFLINE).await;

        assert_eq!(hub.current().times(&Call::Disconnect), vec![at]);
        assert_eq!(
            policy.client().connection_state(),
            ConnectionState::Disconnected
        );
        assert!(!policy.is_online());
    }

    #[tokio::test(start_paused = true)]
    async fn test_offline_while_backgrounded_is_immediate() {
        let (policy, hub) = connected_policy().await;
        policy.handle(HIDDEN).await;
        time::sleep(Duration::from_secs(5)).await;

        policy.handle(OFFLINE).await;
        assert_eq!(hub.current().count(&Call::Disconnect), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_after_network_blip() {
        let (policy, hub) = connected_policy().await;
        let transport = hub.current();

        policy.handle(OFFLINE).await;
        assert!(!policy.client().heartbeat_active().await);

        time::sleep(Duration::from_millis(1_500)).await;
        policy.handle(ONLINE).await;
        assert_eq!(transport.count(&Call::Connect), 2);
        assert_eq!(
            policy.client().connection_state(),
            ConnectionState::Connecting
        );

        transport.connected();
        settle().await;
        assert_eq!(policy.client().backoff_attempts().await, 0);
        assert!(policy.client().heartbeat_active().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_foreground_recovers_without_online_signal() {
        let (policy, hub) = connected_policy().await;
        policy.handle(OFFLINE).await;
        policy.handle(HIDDEN).await;
        policy.handle(VISIBLE).await;

        // The host may never report `online`; foreground alone retries
        assert_eq!(hub.current().count(&Call::Connect), 2);
        assert_eq!(
            policy.client().connection_state(),
            ConnectionState::Connecting
        );
        assert!(!policy.is_online());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_consumes_signal_stream() {
        let (policy, hub) = connected_policy().await;
        let policy = Arc::new(policy);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let signals = futures::stream::poll_fn(move |cx| rx.poll_recv(cx));

        let task = Arc::clone(&policy).spawn(signals);
        tx.send(OFFLINE).unwrap();
        settle().await;
        assert_eq!(hub.current().count(&Call::Disconnect), 1);

        drop(tx);
        task.await.unwrap();
    }
}
