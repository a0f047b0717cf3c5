use super::events::{MatchUpdateKind, match_update_kind};
use crate::channel::Callback;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

struct Delivery {
    event: String,
    payload: Value,
    at: Instant,
}

/// Funnels every match-update alias into one callback.
///
/// The backend may announce one change under both its current and its legacy
/// name. An event is suppressed when the last delivery of the same kind came
/// from a different alias, carried an identical payload and is younger than
/// the window. The same name arriving twice is always delivered.
pub struct MatchUpdateFanIn {
    callback: Callback,
    window: Duration,
    last: Mutex<HashMap<MatchUpdateKind, Delivery>>,
}

impl MatchUpdateFanIn {
    pub fn new(callback: Callback, window: Duration) -> Self {
        Self {
            callback,
            window,
            last: Mutex::new(HashMap::new()),
        }
    }

    /// Handles one inbound event; returns whether the callback ran
    pub fn handle(&self, event: &str, payload: Value) -> bool {
        if let Some(kind) = match_update_kind(event) {
            let now = Instant::now();
            let mut last = self.last.lock();
            if let Some(previous) = last.get(&kind)
                && previous.event != event
                && previous.payload == payload
                && now.duration_since(previous.at) < self.window
            {
                tracing::debug!(
                    "Suppressing '{}', already delivered as '{}'",
                    event,
                    previous.event
                );
                return false;
            }
            last.insert(
                kind,
                Delivery {
                    event: event.to_string(),
                    payload: payload.clone(),
                    at: now,
                },
            );
        }

        (self.callback)(payload);
        true
    }
}
