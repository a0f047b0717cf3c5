pub mod constants;
pub mod error;
pub mod message;
pub mod payload;

pub use constants::*;
pub use error::{RealtimeError, Result};
pub use message::PusherMessage;
pub use payload::{
    ForumAction, ForumUpdateData, MatchStatus, MatchUpdateData, NotificationData,
    NotificationKind,
};
