use tracing_subscriber::EnvFilter;

use marquee::{
    api::{create_router, AppState},
    config::Config,
    services::providers::FileProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("marquee=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // Populate the engine once; requests only read it afterwards
    let provider = FileProvider::new(&config.movies_path, config.users_path.as_deref());
    let state = AppState::from_provider(&provider, config.default_k).await?;

    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
