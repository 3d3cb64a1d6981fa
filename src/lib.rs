pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod core_state;
pub mod db;
pub mod flagging;
pub mod models;
pub mod report;
pub mod submission;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

/// Start the lab report service and block until Ctrl-C.
pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::from_env()?;

    {
        let conn = db::open_database(&config.db_path)
            .with_context(|| format!("opening database at {}", config.db_path.display()))?;
        match &config.admin {
            Some(admin) => {
                auth::ensure_admin(&conn, admin)?;
            }
            None if db::count_admin_users(&conn)? == 0 => {
                tracing::warn!(
                    "No admin account exists; set SUGARLAB_ADMIN_USER and SUGARLAB_ADMIN_PASSWORD to create one"
                );
            }
            None => {}
        }
    }

    let core = Arc::new(core_state::CoreState::from_config(&config));
    let mut server = api::start_api_server(core, config.bind_addr)
        .await
        .map_err(anyhow::Error::msg)?;
    tracing::info!(addr = %server.addr, db = %config.db_path.display(), "Ready");

    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    server.shutdown();
    // Let in-flight requests drain
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}
