// Module declarations
mod core;
mod registry;
mod state;
mod subscription;

// Public API exports
pub use self::core::RealtimeChannel;
pub use registry::ChannelRegistry;
pub use state::{BindingId, Callback, ChannelStatus};
pub use subscription::ChannelSubscription;
