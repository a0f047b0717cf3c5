//! Typed channel helpers.
//!
//! Each helper derives a channel name from an identifier, subscribes through
//! the client's registry and binds a fixed set of event names. Every helper
//! returns `None` when realtime is unavailable; callers should fall back to
//! polling instead of treating that as an error.

pub mod events;
mod match_updates;

pub use match_updates::MatchUpdateFanIn;

use crate::channel::{BindingId, Callback, ChannelSubscription, RealtimeChannel};
use crate::client::RealtimeClient;
use crate::types::ALIAS_DEDUP_WINDOW;
use events::*;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Optional per-event callbacks for [`RealtimeClient::subscribe_live_scoring`]
#[derive(Default, Clone)]
pub struct LiveScoringCallbacks {
    pub on_score_update: Option<Callback>,
    pub on_player_stat_update: Option<Callback>,
    pub on_map_update: Option<Callback>,
    pub on_event_log: Option<Callback>,
}

impl LiveScoringCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_score_update(mut self, f: impl Fn(Value) + Send + Sync + 'static) -> Self {
        self.on_score_update = Some(Arc::new(f));
        self
    }

    pub fn on_player_stat_update(mut self, f: impl Fn(Value) + Send + Sync + 'static) -> Self {
        self.on_player_stat_update = Some(Arc::new(f));
        self
    }

    pub fn on_map_update(mut self, f: impl Fn(Value) + Send + Sync + 'static) -> Self {
        self.on_map_update = Some(Arc::new(f));
        self
    }

    pub fn on_event_log(mut self, f: impl Fn(Value) + Send + Sync + 'static) -> Self {
        self.on_event_log = Some(Arc::new(f));
        self
    }
}

fn bind_all(channel: &RealtimeChannel, names: &[&str], callback: Callback) -> Vec<BindingId> {
    names
        .iter()
        .map(|name| channel.bind_callback(*name, Arc::clone(&callback)))
        .collect()
}

impl RealtimeClient {
    async fn subscribe_with(
        &self,
        channel_name: &str,
        names: &[&str],
        callback: Callback,
    ) -> Option<ChannelSubscription> {
        let channel = self.subscribe(channel_name).await?;
        let bindings = bind_all(&channel, names, callback);
        Some(ChannelSubscription::new(channel, bindings))
    }

    /// `live-matches`: match-updated, match-started, match-ended
    pub async fn subscribe_live_matches<F>(&self, callback: F) -> Option<ChannelSubscription>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.subscribe_with(LIVE_MATCHES_CHANNEL, LIVE_MATCH_EVENTS, Arc::new(callback))
            .await
    }

    /// `match.{id}`: every name in [`MATCH_UPDATE_EVENTS`] routed to one
    /// callback, with alias duplicates of a single change suppressed.
    pub async fn subscribe_match_updates<F>(
        &self,
        match_id: &str,
        callback: F,
    ) -> Option<ChannelSubscription>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        let channel = self.subscribe(&match_channel(match_id)).await?;
        let fan_in = Arc::new(MatchUpdateFanIn::new(
            Arc::new(callback),
            Duration::from_millis(ALIAS_DEDUP_WINDOW),
        ));

        let bindings = MATCH_UPDATE_EVENTS
            .iter()
            .map(|(name, _)| {
                let fan_in = Arc::clone(&fan_in);
                channel.bind(*name, move |payload| {
                    fan_in.handle(name, payload);
                })
            })
            .collect();
        Some(ChannelSubscription::new(channel, bindings))
    }

    /// `match.{id}.map.{mapId}`: round, objective, elimination and composition events
    pub async fn subscribe_map_updates<F>(
        &self,
        match_id: &str,
        map_id: &str,
        callback: F,
    ) -> Option<ChannelSubscription>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.subscribe_with(
            &map_channel(match_id, map_id),
            MAP_UPDATE_EVENTS,
            Arc::new(callback),
        )
        .await
    }

    /// `match.{id}.live-scoring`: binds only the callbacks that are set
    pub async fn subscribe_live_scoring(
        &self,
        match_id: &str,
        callbacks: LiveScoringCallbacks,
    ) -> Option<ChannelSubscription> {
        let channel = self.subscribe(&live_scoring_channel(match_id)).await?;

        let LiveScoringCallbacks {
            on_score_update,
            on_player_stat_update,
            on_map_update,
            on_event_log,
        } = callbacks;
        let bindings = [
            (live_scoring::SCORE_UPDATE, on_score_update),
            (live_scoring::PLAYER_STAT_UPDATE, on_player_stat_update),
            (live_scoring::MAP_UPDATE, on_map_update),
            (live_scoring::EVENT_LOG, on_event_log),
        ]
        .into_iter()
        .filter_map(|(name, callback)| callback.map(|cb| channel.bind_callback(name, cb)))
        .collect();

        Some(ChannelSubscription::new(channel, bindings))
    }

    /// `thread.{id}`: new-post, post-updated, post-deleted
    pub async fn subscribe_forum_updates<F>(
        &self,
        thread_id: &str,
        callback: F,
    ) -> Option<ChannelSubscription>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.subscribe_with(&thread_channel(thread_id), FORUM_EVENTS, Arc::new(callback))
            .await
    }

    /// `user.{id}`: notification, mention, message
    pub async fn subscribe_user_notifications<F>(
        &self,
        user_id: &str,
        callback: F,
    ) -> Option<ChannelSubscription>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.subscribe_with(
            &user_channel(user_id),
            USER_NOTIFICATION_EVENTS,
            Arc::new(callback),
        )
        .await
    }

    /// `global`: announcement, system-message
    pub async fn subscribe_global_events<F>(&self, callback: F) -> Option<ChannelSubscription>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.subscribe_with(GLOBAL_CHANNEL, GLOBAL_EVENTS, Arc::new(callback))
            .await
    }

    /// `event.{id}`: bracket-updated, match-scheduled, event-updated
    pub async fn subscribe_event_updates<F>(
        &self,
        event_id: &str,
        callback: F,
    ) -> Option<ChannelSubscription>
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.subscribe_with(
            &event_channel(event_id),
            EVENT_UPDATE_EVENTS,
            Arc::new(callback),
        )
        .await
    }

    /// Unsubscribes every tracked channel. The connection itself stays up
    /// and later helpers reuse it.
    ///
    /// This does not tear the client down: timers keep running and the
    /// client is not terminated. Call [`cleanup`](Self::cleanup) for a full
    /// teardown, e.g. on logout or app shutdown.
    pub async fn unsubscribe_all(&self) {
        for name in self.channel_names().await {
            self.unsubscribe(&name).await;
        }
    }
}
