//! In-memory transport recording every command, used by the unit tests.

use super::{EventSink, Transport, TransportEvent, TransportFactory};
use crate::config::RealtimeConfig;
use crate::types::RealtimeError;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect,
    Disconnect,
    Subscribe(String),
    Unsubscribe(String),
    Keepalive,
}

pub struct FakeTransport {
    sink: EventSink,
    calls: Mutex<Vec<(Instant, Call)>>,
}

impl FakeTransport {
    fn record(&self, call: Call) {
        self.calls.lock().push((Instant::now(), call));
    }

    pub fn emit(&self, event: TransportEvent) {
        self.sink.emit(event);
    }

    pub fn connected(&self) {
        self.emit(TransportEvent::Connected {
            socket_id: "1.1".to_string(),
        });
    }

    pub fn failed(&self) {
        self.emit(TransportEvent::Failed {
            reason: "network unreachable".to_string(),
        });
    }

    pub fn message(&self, channel: &str, event: &str, data: serde_json::Value) {
        self.emit(TransportEvent::Message {
            channel: channel.to_string(),
            event: event.to_string(),
            data,
        });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().iter().map(|(_, call)| call.clone()).collect()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().iter().filter(|(_, c)| c == call).count()
    }

    /// Timestamps of every recorded `call`
    pub fn times(&self, call: &Call) -> Vec<Instant> {
        self.calls
            .lock()
            .iter()
            .filter(|(_, c)| c == call)
            .map(|(at, _)| *at)
            .collect()
    }
}

impl Transport for FakeTransport {
    fn connect(&self) {
        self.record(Call::Connect);
    }

    fn disconnect(&self) {
        self.record(Call::Disconnect);
    }

    fn subscribe(&self, channel: &str) {
        self.record(Call::Subscribe(channel.to_string()));
    }

    fn unsubscribe(&self, channel: &str) {
        self.record(Call::Unsubscribe(channel.to_string()));
    }

    fn send_keepalive(&self) {
        self.record(Call::Keepalive);
    }
}

/// Every transport a factory has built, newest last
#[derive(Default)]
pub struct FakeHub {
    built: Mutex<Vec<Arc<FakeTransport>>>,
    fail_builds: Mutex<usize>,
}

impl FakeHub {
    pub fn current(&self) -> Arc<FakeTransport> {
        Arc::clone(self.built.lock().last().expect("no transport built"))
    }

    pub fn built(&self) -> usize {
        self.built.lock().len()
    }

    /// Makes the next `n` builds fail
    pub fn fail_next_builds(&self, n: usize) {
        *self.fail_builds.lock() = n;
    }
}

pub fn fake_factory() -> (TransportFactory, Arc<FakeHub>) {
    let hub = Arc::new(FakeHub::default());
    let factory_hub = Arc::clone(&hub);
    let factory: TransportFactory = Arc::new(move |_config: &RealtimeConfig, sink: EventSink| {
        {
            let mut failing = factory_hub.fail_builds.lock();
            if *failing > 0 {
                *failing -= 1;
                return Err(RealtimeError::Connection("provider unavailable".to_string()));
            }
        }
        let transport = Arc::new(FakeTransport {
            sink,
            calls: Mutex::new(Vec::new()),
        });
        factory_hub.built.lock().push(Arc::clone(&transport));
        let transport: Arc<dyn Transport> = transport;
        Ok(transport)
    });
    (factory, hub)
}

/// Lets the dispatcher task drain queued transport events without moving the clock
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Client wired to a fake transport, already `connecting`
pub fn fake_client() -> (crate::client::RealtimeClient, Arc<FakeHub>) {
    let (factory, hub) = fake_factory();
    let client = crate::client::RealtimeClient::builder(RealtimeConfig::with_key("test-key"))
        .transport_factory(factory)
        .build();
    (client, hub)
}
