use std::net::SocketAddr;
use std::sync::Arc;
use atelier_api::{app, metrics::Metrics, AppState};
use atelier_core::{CatalogRepository, Clock, SystemClock};
use atelier_store::{app_config::Config, DbClient, MemoryCatalogRepository, PgCatalogRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atelier_api=debug,atelier_store=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting Atelier API on port {}", config.server.port);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let repo: Arc<dyn CatalogRepository> = match &config.database.url {
        Some(url) => {
            let db = DbClient::new(url, config.database.max_connections).await?;
            db.migrate().await?;
            tracing::info!("Using Postgres catalog store");
            Arc::new(PgCatalogRepository::new(db.pool, clock))
        }
        None => {
            tracing::info!("No database configured, using in-memory catalog store");
            Arc::new(MemoryCatalogRepository::new(clock))
        }
    };

    let metrics = Arc::new(Metrics::new()?);
    let app = app(AppState::new(repo, &config.costing, metrics));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
