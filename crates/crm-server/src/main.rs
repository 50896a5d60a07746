mod api;
mod graphql;
mod middleware;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};
use crate::graphql::{build_schema, IntakeLimits};

const HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(crm_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = crm_db::PoolConfig::from_app_config(&config);
    let pool = crm_db::connect_pool(&config.database_url, pool_config).await?;
    crm_db::run_migrations(&pool).await?;

    let _scheduler = if config.scheduler_enabled {
        let heartbeat = crm_jobs::HeartbeatClient::new(&config.graphql_url, HEARTBEAT_TIMEOUT)?;
        Some(scheduler::build_scheduler(pool.clone(), Arc::clone(&config), heartbeat).await?)
    } else {
        tracing::info!("scheduler disabled");
        None
    };

    let schema = build_schema(
        pool.clone(),
        IntakeLimits {
            max_batch: config.bulk_max_batch,
        },
    );
    let app = build_app(AppState { pool, schema });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "crm-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
