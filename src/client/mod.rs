// Module declarations
mod builder;
mod connection;
mod core;
mod state;

// Public API exports
pub use self::core::RealtimeClient;
pub use builder::RealtimeClientBuilder;
pub use connection::ConnectionState;

pub(crate) use self::core::ClientInner;
pub(crate) use state::ClientState;
