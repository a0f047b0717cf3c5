//! Channel names and the event names bound on each channel type.

/// Channel carrying every live match's start/update/end
pub const LIVE_MATCHES_CHANNEL: &str = "live-matches";
pub const GLOBAL_CHANNEL: &str = "global";

pub fn match_channel(match_id: &str) -> String {
    format!("match.{}", match_id)
}

pub fn map_channel(match_id: &str, map_id: &str) -> String {
    format!("match.{}.map.{}", match_id, map_id)
}

pub fn live_scoring_channel(match_id: &str) -> String {
    format!("match.{}.live-scoring", match_id)
}

pub fn thread_channel(thread_id: &str) -> String {
    format!("thread.{}", thread_id)
}

pub fn user_channel(user_id: &str) -> String {
    format!("user.{}", user_id)
}

pub fn event_channel(event_id: &str) -> String {
    format!("event.{}", event_id)
}

pub const LIVE_MATCH_EVENTS: &[&str] = &["match-updated", "match-started", "match-ended"];

pub const MAP_UPDATE_EVENTS: &[&str] = &[
    "round-update",
    "objective-progress",
    "player-eliminated",
    "ultimate-used",
    "payload-checkpoint",
    "capture-progress",
    "team-composition-changed",
];

pub const FORUM_EVENTS: &[&str] = &["new-post", "post-updated", "post-deleted"];

pub const USER_NOTIFICATION_EVENTS: &[&str] = &["notification", "mention", "message"];

pub const GLOBAL_EVENTS: &[&str] = &["announcement", "system-message"];

pub const EVENT_UPDATE_EVENTS: &[&str] = &["bracket-updated", "match-scheduled", "event-updated"];

/// Live scoring events, each routed to its own callback
pub mod live_scoring {
    pub const SCORE_UPDATE: &str = "score-update";
    pub const PLAYER_STAT_UPDATE: &str = "player-stat-update";
    pub const MAP_UPDATE: &str = "map-update";
    pub const EVENT_LOG: &str = "event-log";
}

/// Logical change a match-channel event name stands for.
///
/// Current backend names and their legacy equivalents map to the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchUpdateKind {
    Score,
    MapStarted,
    MapEnded,
    MapTransition,
    Kill,
    Objective,
    PlayerStats,
    Hero,
    RoundEnded,
    Overtime,
    Paused,
    Resumed,
    MatchStarted,
}

/// Every event name the match-updates helper binds, with its logical kind
pub const MATCH_UPDATE_EVENTS: &[(&str, MatchUpdateKind)] = &[
    // Current backend names
    ("hero.updated", MatchUpdateKind::Hero),
    ("MatchMapStarted", MatchUpdateKind::MapStarted),
    ("MatchMapEnded", MatchUpdateKind::MapEnded),
    ("MatchKillEvent", MatchUpdateKind::Kill),
    ("MatchObjectiveUpdate", MatchUpdateKind::Objective),
    ("MatchPaused", MatchUpdateKind::Paused),
    ("MatchResumed", MatchUpdateKind::Resumed),
    ("match.map.transition", MatchUpdateKind::MapTransition),
    ("match.started", MatchUpdateKind::MatchStarted),
    // Legacy names
    ("score-updated", MatchUpdateKind::Score),
    ("map-started", MatchUpdateKind::MapStarted),
    ("map-ended", MatchUpdateKind::MapEnded),
    ("player-stats-updated", MatchUpdateKind::PlayerStats),
    ("hero-swap", MatchUpdateKind::Hero),
    ("round-ended", MatchUpdateKind::RoundEnded),
    ("overtime-started", MatchUpdateKind::Overtime),
    ("match-paused", MatchUpdateKind::Paused),
    ("match-resumed", MatchUpdateKind::Resumed),
    ("tech-pause", MatchUpdateKind::Paused),
];

pub fn match_update_kind(event: &str) -> Option<MatchUpdateKind> {
    MATCH_UPDATE_EVENTS
        .iter()
        .find(|(name, _)| *name == event)
        .map(|(_, kind)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_channel_names() {
        assert_eq!(match_channel("42"), "match.42");
        assert_eq!(map_channel("42", "3"), "match.42.map.3");
        assert_eq!(live_scoring_channel("42"), "match.42.live-scoring");
        assert_eq!(thread_channel("9"), "thread.9");
        assert_eq!(user_channel("5"), "user.5");
        assert_eq!(event_channel("7"), "event.7");
    }

    #[test]
    fn test_match_update_table_has_unique_names() {
        let names: HashSet<&str> = MATCH_UPDATE_EVENTS.iter().map(|(name, _)| *name).collect();
        assert_eq!(names.len(), MATCH_UPDATE_EVENTS.len());
        assert_eq!(MATCH_UPDATE_EVENTS.len(), 19);
    }

    #[test]
    fn test_aliases_share_a_kind() {
        assert_eq!(
            match_update_kind("MatchMapStarted"),
            match_update_kind("map-started")
        );
        assert_eq!(match_update_kind("tech-pause"), Some(MatchUpdateKind::Paused));
        assert_eq!(match_update_kind("score-update"), None);
    }
}
