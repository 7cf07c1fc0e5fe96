use anyhow::Result;
use meter_service::{config::AppConfig, metrics_server, observability, routes, seed};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    let pool =
        customer_client::db::connect(&cfg.database.url, cfg.database.max_connections).await?;
    customer_client::db::init_schema(&pool).await?;
    seed::seed_accounts(&pool).await?;

    let app = routes::router(pool);
    let listener = tokio::net::TcpListener::bind(&cfg.http.bind_addr).await?;
    tracing::info!(addr = %cfg.http.bind_addr, "meter service listening");
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
