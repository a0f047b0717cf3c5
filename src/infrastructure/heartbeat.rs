use super::Timer;
use crate::transport::Transport;
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Periodic keepalive sent through the transport while connected
pub struct HeartbeatManager {
    interval: Duration,
    transport: Weak<dyn Transport>,
}

impl HeartbeatManager {
    pub fn new(transport: &Arc<dyn Transport>) -> Self {
        Self {
            interval: Duration::from_millis(crate::types::HEARTBEAT_INTERVAL),
            transport: Arc::downgrade(transport),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Arms `timer` with the keepalive loop, replacing whatever it held.
    pub fn start(self, timer: &mut Timer) {
        let transport = self.transport;
        timer.arm_interval(self.interval, move || {
            let transport = transport.upgrade();
            async move {
                match transport {
                    Some(transport) => {
                        transport.send_keepalive();
                        tracing::debug!("Sent heartbeat");
                        true
                    }
                    None => {
                        // Transport replaced or dropped, stop ticking
                        false
                    }
                }
            }
        });
    }
}
