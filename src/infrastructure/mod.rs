// Infrastructure module - Timers, keepalive and HTTP helpers
pub mod backoff;
pub mod heartbeat;
pub mod http;
pub mod task_manager;
pub mod timer;

pub use backoff::Backoff;
pub use heartbeat::HeartbeatManager;
pub use http::{ChannelAuth, ChannelAuthorizer};
pub use task_manager::TaskManager;
pub use timer::Timer;
