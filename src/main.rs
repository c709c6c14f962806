use clap::Parser;
use habit_tracker::{
    AppState, Clock, JsonFileStore, MemoryStore, Store,
    config::{Args, StoreKind},
    router,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let args = Args::parse();

    let store: Arc<dyn Store> = match args.store {
        StoreKind::Json => {
            let store = JsonFileStore::open(&args.data_path).await?;
            info!(path = %store.path().display(), "using json store");
            Arc::new(store)
        }
        StoreKind::Memory => {
            info!("using in-memory store");
            Arc::new(MemoryStore::default())
        }
    };

    let app = router(AppState::new(store, Clock::System));

    let addr = args.listen_addr();
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
