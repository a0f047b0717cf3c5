use serde::{Deserialize, Serialize};

use crate::messaging::PusherEvent;

/// A single frame of the Pusher channels protocol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PusherMessage {
    pub event: PusherEvent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl PusherMessage {
    pub fn new(event: impl Into<PusherEvent>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            channel: None,
            data,
            user_id: None,
        }
    }

    /// Returns the event data with one level of string encoding removed.
    ///
    /// Pusher servers send `data` as a JSON document serialized into a string.
    /// Strings that are not valid JSON are returned unchanged.
    pub fn decoded_data(&self) -> serde_json::Value {
        match &self.data {
            serde_json::Value::String(raw) => {
                serde_json::from_str(raw).unwrap_or_else(|_| self.data.clone())
            }
            other => other.clone(),
        }
    }
}
