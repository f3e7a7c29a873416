use dotenvy::dotenv;
use tracing::{error, info, warn};

use nanapatha::logging::{init_tracing, shutdown_tracer};
use nanapatha::metrics::{init_metrics, metrics_app};
use nanapatha::router::init_router;
use nanapatha::shutdown::shutdown_signal;
use nanapatha::state::init_app_state;
use nanapatha_config::ServerConfig;
use nanapatha_db::run_migrations;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing()?;

    let config = ServerConfig::from_env();
    let state = init_app_state().await;

    if config.run_migrations {
        run_migrations(&state.db).await?;
    }

    match init_metrics() {
        Ok(Some(handle)) => {
            let metrics_addr = config.metrics_addr();
            let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr).await?;
            info!(addr = %metrics_addr, "Metrics endpoint listening");
            tokio::spawn(async move {
                if let Err(e) = axum::serve(metrics_listener, metrics_app(handle)).await {
                    error!(error = %e, "Metrics server stopped");
                }
            });
        }
        Ok(None) => info!("Observability disabled, metrics endpoint not started"),
        Err(e) => warn!(error = %e, "Failed to install metrics recorder"),
    }

    let app = init_router(state);
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(addr = %addr, "Server running");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Scalar UI available at http://{}/scalar", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_tracer().await;
    Ok(())
}
