// Messaging module - Pusher events and transport event routing
pub mod event;
pub mod router;

pub use event::{PusherEvent, SystemEvent};
pub use router::MessageRouter;
