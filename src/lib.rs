//! # Rivals Realtime
//!
//! Realtime update client for the Marvel Rivals esports site: live match
//! scores, map and round events, forum threads, user notifications and
//! tournament bracket changes, multiplexed over one Pusher channels socket.
//!
//! ## Example
//!
//! ```no_run
//! use rivals_realtime::{RealtimeClient, RealtimeConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = RealtimeClient::new(RealtimeConfig::from_env());
//!
//!     let scores = client
//!         .subscribe_match_updates("42", |data| println!("match 42: {}", data))
//!         .await;
//!
//!     if scores.is_none() {
//!         // No live updates available, poll instead
//!     }
//!
//!     client.cleanup().await;
//! }
//! ```

pub mod channel;
pub mod client;
pub mod config;
pub mod environment;
pub mod helpers;
pub mod infrastructure;
pub mod messaging;
pub mod transport;
pub mod types;

pub use channel::{BindingId, ChannelStatus, ChannelSubscription, RealtimeChannel};
pub use client::{ConnectionState, RealtimeClient, RealtimeClientBuilder};
pub use config::RealtimeConfig;
pub use environment::{EnvironmentPolicy, EnvironmentSignal, Lifecycle, Network, Visibility};
pub use helpers::LiveScoringCallbacks;
pub use messaging::{PusherEvent, SystemEvent};
pub use transport::{EventSink, PusherTransport, Transport, TransportEvent, TransportFactory};
pub use types::{
    ForumUpdateData, MatchUpdateData, NotificationData, PusherMessage, RealtimeError, Result,
};
