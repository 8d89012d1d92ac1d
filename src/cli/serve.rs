use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::core::bots::{BotStatus, LifecycleController, ProcessRegistry, RecordStore, UploadHandler};
use crate::core::config::{ConfigOverrides, ServiceConfig};
use crate::core::lifecycle::{BotSupervisor, LifecycleManager};
use crate::core::terminal::{print_banner, print_link, print_status};
use crate::interfaces::web::{ApiServer, ApiServerConfig};
use crate::logging;

pub async fn run_service(overrides: ConfigOverrides) -> Result<()> {
    let (log_tx, _) = tokio::sync::broadcast::channel::<String>(500);
    logging::init(log_tx.clone());

    let config = ServiceConfig::load(&overrides).await?;
    info!("Starting botherd (data dir: {})", config.data_dir.display());

    let store = Arc::new(RecordStore::open(config.records_path()).await?);
    tokio::fs::create_dir_all(config.uploads_dir()).await?;

    let stale = store
        .load()
        .await?
        .values()
        .filter(|r| r.status == BotStatus::Running)
        .count();
    if stale > 0 {
        warn!(
            "{} record(s) still claim to be running; no process survives a restart",
            stale
        );
    }

    let controller = Arc::new(LifecycleController::new(
        store.clone(),
        ProcessRegistry::new(),
        config.launchers.clone(),
    ));
    let uploads = Arc::new(UploadHandler::new(store, config.uploads_dir()));

    let mut lifecycle = LifecycleManager::new();
    lifecycle.attach(Arc::new(Mutex::new(BotSupervisor::new(controller.clone()))));
    lifecycle.attach(Arc::new(Mutex::new(ApiServer::new(ApiServerConfig {
        controller,
        uploads,
        log_tx,
        bind_addr: config.bind_addr(),
        max_upload_bytes: config.max_upload_bytes,
        cors_origins: config.cors_origins.clone(),
    }))));
    lifecycle.start().await?;

    print_banner();
    print_link("API", &format!("http://{}", config.bind_addr()));
    print_status("Records", &config.records_path().display().to_string());
    print_status("Uploads", &config.uploads_dir().display().to_string());
    print_status(
        "Launchers",
        &format!(
            "py -> {}, other -> {}",
            config.launchers.python, config.launchers.other
        ),
    );
    println!();

    tokio::signal::ctrl_c().await?;
    lifecycle.shutdown().await
}
