use crate::types::constants::pusher_events;
use serde::{Deserialize, Serialize};

/// Type-safe Pusher events
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PusherEvent {
    /// Protocol events (`pusher:*`, `pusher_internal:*`)
    System(SystemEvent),

    /// Application event emitted by the backend on a channel
    Custom(String),
}

impl PusherEvent {
    /// Parse a string into a PusherEvent
    pub fn parse(s: &str) -> Self {
        match SystemEvent::parse(s) {
            Some(system) => Self::System(system),
            None => Self::Custom(s.to_string()),
        }
    }

    /// Convert event to string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::System(sys) => sys.as_str(),
            Self::Custom(s) => s,
        }
    }
}

impl From<&str> for PusherEvent {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for PusherEvent {
    fn from(s: String) -> Self {
        match SystemEvent::parse(&s) {
            Some(system) => Self::System(system),
            None => Self::Custom(s),
        }
    }
}

impl From<SystemEvent> for PusherEvent {
    fn from(event: SystemEvent) -> Self {
        Self::System(event)
    }
}

impl From<PusherEvent> for String {
    fn from(event: PusherEvent) -> Self {
        match event {
            PusherEvent::System(sys) => sys.as_str().to_string(),
            PusherEvent::Custom(s) => s,
        }
    }
}

impl std::fmt::Display for PusherEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pusher protocol events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemEvent {
    ConnectionEstablished,
    Error,
    Ping,
    Pong,
    Subscribe,
    Unsubscribe,
    SubscriptionSucceeded,
    SubscriptionError,
}

impl SystemEvent {
    /// Returns `None` for anything that is not a known protocol event
    pub fn parse(s: &str) -> Option<Self> {
        let event = match s {
            pusher_events::CONNECTION_ESTABLISHED => Self::ConnectionEstablished,
            pusher_events::ERROR => Self::Error,
            pusher_events::PING => Self::Ping,
            pusher_events::PONG => Self::Pong,
            pusher_events::SUBSCRIBE => Self::Subscribe,
            pusher_events::UNSUBSCRIBE => Self::Unsubscribe,
            pusher_events::SUBSCRIPTION_SUCCEEDED => Self::SubscriptionSucceeded,
            pusher_events::SUBSCRIPTION_ERROR => Self::SubscriptionError,
            _ => return None,
        };
        Some(event)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionEstablished => pusher_events::CONNECTION_ESTABLISHED,
            Self::Error => pusher_events::ERROR,
            Self::Ping => pusher_events::PING,
            Self::Pong => pusher_events::PONG,
            Self::Subscribe => pusher_events::SUBSCRIBE,
            Self::Unsubscribe => pusher_events::UNSUBSCRIBE,
            Self::SubscriptionSucceeded => pusher_events::SUBSCRIPTION_SUCCEEDED,
            Self::SubscriptionError => pusher_events::SUBSCRIPTION_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pusher_event_parse() {
        assert_eq!(
            PusherEvent::parse("pusher:ping"),
            PusherEvent::System(SystemEvent::Ping)
        );
        assert_eq!(
            PusherEvent::parse("pusher_internal:subscription_succeeded"),
            PusherEvent::System(SystemEvent::SubscriptionSucceeded)
        );
        assert_eq!(
            PusherEvent::parse("MatchMapStarted"),
            PusherEvent::Custom("MatchMapStarted".to_string())
        );
    }

    #[test]
    fn test_unknown_pusher_prefixed_event_stays_custom() {
        // Presence member events are delivered to channel bindings untouched
        assert_eq!(
            PusherEvent::parse("pusher_internal:member_added"),
            PusherEvent::Custom("pusher_internal:member_added".to_string())
        );
    }

    #[test]
    fn test_system_event_round_trip() {
        let events = [
            SystemEvent::ConnectionEstablished,
            SystemEvent::Error,
            SystemEvent::Ping,
            SystemEvent::Pong,
            SystemEvent::Subscribe,
            SystemEvent::Unsubscribe,
            SystemEvent::SubscriptionSucceeded,
            SystemEvent::SubscriptionError,
        ];

        for event in events {
            assert_eq!(SystemEvent::parse(event.as_str()), Some(event));
        }
    }
}
