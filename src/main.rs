use tracing_subscriber::EnvFilter;

use lexiscope::api;
use lexiscope::config::Config;
use lexiscope::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("LLM provider: {} ({}, model {})", config.llm.provider, config.llm.base_url, config.llm.chat_model);
    tracing::info!("Dictionary API: {}", config.dictionary.base_url);

    let state = AppState::new(config.clone())?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
