use std::sync::Arc;

use tracing::info;

use opsbot_core::{config::Config, router::Router};
use opsbot_postgres::PostgresStore;
use opsbot_ssh::SshExecutor;

#[tokio::main]
async fn main() -> Result<(), opsbot_core::Error> {
    let cfg = Arc::new(Config::load()?);
    opsbot_core::logging::init("opsbot", cfg.log_file.as_deref())?;

    if cfg.replica.is_configured() {
        info!(host = ?cfg.replica.host, port = ?cfg.replica.port, "replica settings loaded");
    }

    let remote = Arc::new(SshExecutor::new(&cfg));
    let store = Arc::new(PostgresStore::new(&cfg));
    let router = Arc::new(Router::new(&cfg, remote, store));

    opsbot_telegram::router::run_polling(cfg, router)
        .await
        .map_err(|e| opsbot_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
