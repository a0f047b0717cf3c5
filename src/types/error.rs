use thiserror::Error;

/// Errors produced inside the realtime client.
///
/// The public lifecycle and subscription API never returns these; they are
/// logged and reflected in the connection state instead. They surface from
/// the transport, authorization and configuration layers.
#[derive(Error, Debug)]
pub enum RealtimeError {
    /// Socket handshake or frame failure
    #[error("websocket: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// The transport could not be built or reached
    #[error("connection: {0}")]
    Connection(String),

    /// The auth endpoint refused a private or presence channel
    #[error("channel authorization: {0}")]
    Auth(String),

    /// Missing key, relative auth endpoint without an app url, and the like
    #[error("config: {0}")]
    Config(String),

    #[error("invalid frame: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Auth endpoint request failed before a status was returned
    #[error("auth request: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    UrlParse(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, RealtimeError>;
