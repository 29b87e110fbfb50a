use adapter_config::Settings;
use tokio::net::TcpListener;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .compact()
        .init();
    let settings = Settings::from_env()?;
    let state = adapter_gate::AppState::from_settings(&settings)?;
    let listener = TcpListener::bind(settings.gate.bind).await?;
    info!(
        adapters = ?state.enabled(),
        default = ?state.default_adapter(),
        "listening on {}",
        listener.local_addr()?
    );
    axum::serve(listener, adapter_gate::app(state)).await?;
    Ok(())
}
