/// Pusher protocol event strings (magic strings layer)
pub mod pusher_events {
    pub const CONNECTION_ESTABLISHED: &str = "pusher:connection_established";
    pub const ERROR: &str = "pusher:error";
    pub const PING: &str = "pusher:ping";
    pub const PONG: &str = "pusher:pong";
    pub const SUBSCRIBE: &str = "pusher:subscribe";
    pub const UNSUBSCRIBE: &str = "pusher:unsubscribe";
    pub const SUBSCRIPTION_SUCCEEDED: &str = "pusher_internal:subscription_succeeded";
    pub const SUBSCRIPTION_ERROR: &str = "pusher:subscription_error";
}

/// Channel name prefixes that require authorization before subscribing
pub const PRIVATE_CHANNEL_PREFIX: &str = "private-";
pub const PRESENCE_CHANNEL_PREFIX: &str = "presence-";

/// Pusher wire protocol version
pub const PROTOCOL_VERSION: u8 = 7;

/// Client name reported in the socket URL
pub const CLIENT_NAME: &str = "rivals-realtime";

/// Default provider region
pub const DEFAULT_CLUSTER: &str = "us2";

/// Default channel authorization endpoint (relative to the app URL)
pub const DEFAULT_AUTH_ENDPOINT: &str = "/api/pusher/auth";

/// Default heartbeat interval (milliseconds)
pub const HEARTBEAT_INTERVAL: u64 = 30_000;

/// Default grace period before a backgrounded client drops its socket (milliseconds)
pub const BACKGROUND_GRACE: u64 = 30_000;

/// Base delay of the exponential reconnect backoff (milliseconds)
pub const RECONNECT_BASE: u64 = 1_000;

/// Automatic reconnect attempts before giving up until a manual reconnect
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Time a keepalive ping may go unanswered before the socket is declared dead (milliseconds)
pub const PONG_TIMEOUT: u64 = 6_000;

/// Time allowed for the close handshake before socket tasks are aborted (milliseconds)
pub const CLOSE_GRACE: u64 = 1_000;

/// Window in which the same match update under a second alias is treated as a duplicate (milliseconds)
pub const ALIAS_DEDUP_WINDOW: u64 = 1_000;

/// Buffer size of receivers handed out by `RealtimeChannel::on`
pub const LISTENER_BUFFER_SIZE: usize = 100;
