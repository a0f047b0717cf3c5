use rivals_realtime::{LiveScoringCallbacks, MatchUpdateData, RealtimeClient, RealtimeConfig};
use tracing_subscriber::EnvFilter;

/// Follows one match live against a real Pusher app
///
/// Usage: cargo run --example live_match -- <match-id>
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load PUSHER_* variables from .env
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let match_id = std::env::args().nth(1).unwrap_or_else(|| "1".to_string());

    let client = RealtimeClient::new(RealtimeConfig::from_env());
    println!("📡 Connection state: {}", client.connection_state());

    let updates = client
        .subscribe_match_updates(&match_id, |data| {
            match serde_json::from_value::<MatchUpdateData>(data.clone()) {
                Ok(update) => println!(
                    "🏆 {} - {} ({:?})",
                    update.team1_score, update.team2_score, update.status
                ),
                Err(_) => println!("🔔 Match update: {}", data),
            }
        })
        .await;

    let Some(updates) = updates else {
        println!("⚠️  Realtime unavailable (is PUSHER_KEY set?), a UI would poll instead");
        return Ok(());
    };
    println!("✅ Bound {} match events on {}", updates.binding_ids().len(), updates.name());

    let scoring = client
        .subscribe_live_scoring(
            &match_id,
            LiveScoringCallbacks::new()
                .on_score_update(|data| println!("📊 Score: {}", data))
                .on_event_log(|data| println!("📝 {}", data)),
        )
        .await;

    // Print state transitions as they happen
    let mut states = client.state_changes();
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            println!("🔌 State: {}", *states.borrow_and_update());
        }
    });

    println!("⏳ Listening, press Ctrl+C to stop\n");
    tokio::signal::ctrl_c().await?;

    updates.unbind();
    if let Some(scoring) = scoring {
        scoring.unsubscribe().await;
    }
    client.cleanup().await;
    println!("👋 Cleaned up");

    Ok(())
}
