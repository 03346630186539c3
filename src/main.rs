use std::sync::Arc;

use nutribot::channels::{ChannelManager, CliChannel, GatewayChannel};
use nutribot::classifier::{ClassifierConfig, FoodClassifier, GeminiClassifier};
use nutribot::config::BotConfig;
use nutribot::dispatcher::Dispatcher;
use nutribot::store::{JsonFileStore, ProfileStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export GEMINI_API_KEY=...");
        std::process::exit(1);
    });

    eprintln!("🍽  NutriBot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model);
    eprintln!("   Store: {}", config.db_path.display());

    // ── Store ───────────────────────────────────────────────────────
    let store = JsonFileStore::open(&config.db_path).await.unwrap_or_else(|e| {
        eprintln!(
            "Error: failed to open store at {}: {}",
            config.db_path.display(),
            e
        );
        std::process::exit(1);
    });

    // An unreadable existing document is not fatal to the process — turns
    // drop until it is repaired, and it must never be overwritten.
    if let Err(e) = store.load().await {
        tracing::warn!(error = %e, "existing store document does not parse; turns will drop until it is repaired");
    }

    // ── Classifier ──────────────────────────────────────────────────
    let classifier: Arc<dyn FoodClassifier> = Arc::new(GeminiClassifier::new(ClassifierConfig {
        api_key: config.api_key.clone(),
        model: config.model.clone(),
        personalized: config.personalized,
    })?);
    if config.personalized {
        eprintln!("   Prompt: personalized");
    }

    // ── Channels ────────────────────────────────────────────────────
    let mut channels = ChannelManager::new();
    let mut active = vec!["cli"];

    // Always add CLI
    channels.add(Box::new(CliChannel::new()));

    // Conditionally add the WhatsApp bridge if its URL is set
    if let Some(url) = &config.gateway_url {
        channels.add(Box::new(GatewayChannel::new(url.clone())));
        active.push("gateway");
        eprintln!("   Gateway: {url}");
    }

    eprintln!("   Channels: {}", active.join(", "));
    eprintln!("   Type a message and press Enter.\n");

    // ── Dispatcher ──────────────────────────────────────────────────
    let dispatcher = Dispatcher::new(Arc::new(store), classifier, Arc::new(channels));
    dispatcher.run().await?;

    Ok(())
}
