use ledger_core::api::{create_router, AppState};
use ledger_core::config::Config;
use ledger_core::db::open_store;
use ledger_core::seed::seed_demo_data;
use ledger_core::Session;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (reads .env when present)
    let config = Config::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(LevelFilter::INFO.into());

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    info!("Starting ledger server...");

    let store = open_store(&config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open document store: {}", e))?;
    let session = Session::new(store);

    if config.seed_demo_data {
        let created = seed_demo_data(&session).await;
        info!("Demo data: {} seller(s) created", created);
    }

    let app = create_router(AppState::new(session));

    let address = config.bind_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", address, e))?;

    info!("Server listening on {}", address);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
