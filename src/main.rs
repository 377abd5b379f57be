use member_qa::api::{self, app_state::AppState};
use member_qa::config::{ConfigLoader, SourceMode};
use member_qa::observability::{AppMetrics, ObservabilityState, init_tracing};
use member_qa::services::{
    DirectoryFetcher, MessageSource, create_ask_service, create_directory_fetcher,
    create_message_source,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = ConfigLoader::load()?;

    // `--mock` serves the built-in sample members without touching the upstream
    if std::env::args().any(|arg| arg == "--mock") {
        config.source.mode = SourceMode::Mock;
    }
    ConfigLoader::validate(&config)?;

    let _guard = init_tracing(env!("CARGO_CRATE_NAME"), &config.logging);
    info!(
        "Starting {} ({} environment)...",
        config.app_name, config.environment
    );

    let metrics = Arc::new(AppMetrics::default());

    let source: Arc<dyn MessageSource> = Arc::from(create_message_source(&config.source)?);
    info!("Message source initialized: {}", source.describe());

    let fetcher: Arc<dyn DirectoryFetcher> = Arc::from(create_directory_fetcher(
        source,
        &config.cache,
        &config.directory,
        metrics.clone(),
    ));
    info!(
        "Directory fetcher initialized (cache enabled: {}, ttl: {}s)",
        config.cache.enabled, config.cache.ttl_secs
    );

    let ask_service = create_ask_service(
        fetcher.clone(),
        &config.resolver.known_members,
        config.extractor.max_snippet_chars,
        config.extractor.max_suggestions,
        metrics.clone(),
    );
    info!("Ask service initialized");

    let app_state = AppState::new(ask_service, fetcher, metrics.clone());
    let observability_state = Arc::new(ObservabilityState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        metrics,
    ));
    let router = api::create_app(app_state, observability_state);
    info!("API router created with observability endpoints");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
