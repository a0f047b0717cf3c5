//! Client configuration.
//!
//! Everything is optional except the connection key. Without a key the client
//! is built in a permanent `disconnected` state and every operation is a no-op.

use crate::types::constants::{
    BACKGROUND_GRACE, CLIENT_NAME, DEFAULT_AUTH_ENDPOINT, DEFAULT_CLUSTER, HEARTBEAT_INTERVAL,
    MAX_RECONNECT_ATTEMPTS, PONG_TIMEOUT, PROTOCOL_VERSION, RECONNECT_BASE,
};
use crate::types::{RealtimeError, Result};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Environment variable names, each also accepted with a `NEXT_PUBLIC_` prefix.
pub mod env_vars {
    pub const KEY: &str = "PUSHER_KEY";
    pub const CLUSTER: &str = "PUSHER_CLUSTER";
    pub const HOST: &str = "PUSHER_HOST";
    pub const PORT: &str = "PUSHER_PORT";
    pub const AUTH_ENDPOINT: &str = "PUSHER_AUTH_ENDPOINT";
    pub const APP_URL: &str = "PUSHER_APP_URL";

    pub const PUBLIC_PREFIX: &str = "NEXT_PUBLIC_";
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// Provider credential. `None` or empty disables realtime entirely.
    pub key: Option<String>,
    /// Provider region selector
    pub cluster: String,
    /// Self-hosted gateway host
    pub host: Option<String>,
    /// Self-hosted gateway port. Setting it forces a plaintext `ws://` socket.
    pub port: Option<u16>,
    /// Endpoint authorizing private and presence channels
    pub auth_endpoint: String,
    /// Base URL a relative `auth_endpoint` is resolved against
    pub app_url: Option<String>,
    /// Keepalive period while connected (milliseconds)
    pub heartbeat_interval: u64,
    /// Time spent in background before the socket is released (milliseconds)
    pub background_grace: u64,
    /// First automatic reconnect delay; doubles per attempt (milliseconds)
    pub reconnect_base: u64,
    pub max_reconnect_attempts: u32,
    /// How long a keepalive ping may go unanswered (milliseconds)
    pub pong_timeout: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            key: None,
            cluster: DEFAULT_CLUSTER.to_string(),
            host: None,
            port: None,
            auth_endpoint: DEFAULT_AUTH_ENDPOINT.to_string(),
            app_url: None,
            heartbeat_interval: HEARTBEAT_INTERVAL,
            background_grace: BACKGROUND_GRACE,
            reconnect_base: RECONNECT_BASE,
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
            pong_timeout: PONG_TIMEOUT,
        }
    }
}

impl RealtimeConfig {
    /// Config with only the connection key set
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Default::default()
        }
    }

    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .or_else(|| lookup(&format!("{}{}", env_vars::PUBLIC_PREFIX, name)))
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self {
            key: get(env_vars::KEY),
            host: get(env_vars::HOST),
            app_url: get(env_vars::APP_URL),
            ..Default::default()
        };

        if let Some(cluster) = get(env_vars::CLUSTER) {
            config.cluster = cluster;
        }
        if let Some(endpoint) = get(env_vars::AUTH_ENDPOINT) {
            config.auth_endpoint = endpoint;
        }
        if let Some(port) = get(env_vars::PORT) {
            match port.parse::<u16>() {
                Ok(port) => config.port = Some(port),
                Err(e) => tracing::warn!("Ignoring invalid {} '{}': {}", env_vars::PORT, port, e),
            }
        }

        config
    }

    /// Whether a usable connection key is configured
    pub fn has_key(&self) -> bool {
        self.key.as_deref().is_some_and(|key| !key.is_empty())
    }

    /// Whether the socket runs without TLS (custom port configured)
    pub fn is_plaintext(&self) -> bool {
        self.port.is_some()
    }

    /// Host the socket connects to
    pub fn socket_host(&self) -> String {
        self.host
            .clone()
            .unwrap_or_else(|| format!("ws-{}.pusher.com", self.cluster))
    }

    /// Builds the WebSocket URL for the configured key and gateway
    pub fn socket_url(&self) -> Result<Url> {
        let key = self
            .key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| RealtimeError::Config("connection key is not set".to_string()))?;

        let (scheme, port) = match self.port {
            Some(port) => ("ws", port),
            None => ("wss", 443),
        };

        let mut url = Url::parse(&format!(
            "{}://{}:{}/app/{}",
            scheme,
            self.socket_host(),
            port,
            key
        ))?;
        url.query_pairs_mut()
            .append_pair("protocol", &PROTOCOL_VERSION.to_string())
            .append_pair("client", CLIENT_NAME)
            .append_pair("version", env!("CARGO_PKG_VERSION"))
            .append_pair("flash", "false");

        Ok(url)
    }

    /// Resolves the channel authorization endpoint to an absolute URL
    pub fn auth_url(&self) -> Result<Url> {
        match Url::parse(&self.auth_endpoint) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self.app_url.as_deref().ok_or_else(|| {
                    RealtimeError::Config(format!(
                        "auth endpoint '{}' is relative and no app url is configured",
                        self.auth_endpoint
                    ))
                })?;
                Ok(Url::parse(base)?.join(&self.auth_endpoint)?)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval)
    }

    pub fn background_grace(&self) -> Duration {
        Duration::from_millis(self.background_grace)
    }

    pub fn reconnect_base(&self) -> Duration {
        Duration::from_millis(self.reconnect_base)
    }

    pub fn pong_timeout(&self) -> Duration {
        Duration::from_millis(self.pong_timeout)
    }
}
