use futures::StreamExt;
use rivals_realtime::{
    EnvironmentPolicy, EnvironmentSignal, Network, RealtimeClient, RealtimeConfig, Visibility,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Drives the environment policy with a scripted sequence of host signals:
/// a short tab switch, a network blip, then a long background stint.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let mut config = RealtimeConfig::from_env();
    // Shorter grace so the demo finishes quickly
    config.background_grace = 5_000;

    let client = RealtimeClient::new(config);
    client
        .subscribe_global_events(|data| println!("📣 {}", data))
        .await;

    let policy = Arc::new(EnvironmentPolicy::new(client.clone()));

    let script = vec![
        (Duration::from_secs(3), EnvironmentSignal::Visibility(Visibility::Hidden)),
        (Duration::from_secs(2), EnvironmentSignal::Visibility(Visibility::Visible)),
        (Duration::from_secs(3), EnvironmentSignal::Network(Network::Offline)),
        (Duration::from_secs(2), EnvironmentSignal::Network(Network::Online)),
        (Duration::from_secs(3), EnvironmentSignal::Visibility(Visibility::Hidden)),
        (Duration::from_secs(8), EnvironmentSignal::Visibility(Visibility::Visible)),
    ];
    let signals = futures::stream::iter(script).then(|(delay, signal)| async move {
        tokio::time::sleep(delay).await;
        println!("➡️  {:?}", signal);
        signal
    });

    Arc::clone(&policy).spawn(signals).await?;

    tokio::time::sleep(Duration::from_secs(3)).await;
    println!("🔌 Final state: {}", client.connection_state());
    client.cleanup().await;

    Ok(())
}
