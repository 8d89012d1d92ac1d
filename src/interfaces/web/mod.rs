mod error;
mod handlers;
mod router;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_stream::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tracing::info;

use crate::core::bots::{LifecycleController, UploadHandler};
use crate::core::lifecycle::LifecycleComponent;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) controller: Arc<LifecycleController>,
    pub(crate) uploads: Arc<UploadHandler>,
    pub(crate) log_tx: tokio::sync::broadcast::Sender<String>,
    pub(crate) max_upload_bytes: usize,
    pub(crate) cors_origins: Vec<String>,
}

pub struct ApiServer {
    state: AppState,
    bind_addr: String,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

pub struct ApiServerConfig {
    pub controller: Arc<LifecycleController>,
    pub uploads: Arc<UploadHandler>,
    pub log_tx: tokio::sync::broadcast::Sender<String>,
    pub bind_addr: String,
    pub max_upload_bytes: usize,
    pub cors_origins: Vec<String>,
}

impl ApiServer {
    pub fn new(config: ApiServerConfig) -> Self {
        Self {
            state: AppState {
                controller: config.controller,
                uploads: config.uploads,
                log_tx: config.log_tx,
                max_upload_bytes: config.max_upload_bytes,
                cors_origins: config.cors_origins,
            },
            bind_addr: config.bind_addr,
            shutdown_tx: None,
        }
    }
}

// --- SSE Logs (used by router) ---

async fn sse_logs_endpoint(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.log_tx.subscribe();
    let stream = BroadcastStream::new(receiver).map(|msg| match msg {
        Ok(line) => Ok(Event::default().data(line)),
        Err(_) => Ok(Event::default().data("log stream lagged")),
    });

    Sse::new(stream)
}

// --- Lifecycle Implementation ---

#[async_trait]
impl LifecycleComponent for ApiServer {
    async fn on_init(&mut self) -> Result<()> {
        info!("API Server Interface initializing...");
        Ok(())
    }

    async fn on_start(&mut self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.bind_addr)
            .await
            .with_context(|| format!("binding API server to {}", self.bind_addr))?;
        let app = router::build_api_router(self.state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        info!("API Server running at http://{}", self.bind_addr);
        tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = serve.await {
                tracing::error!("API Server crashed: {}", e);
            }
        });
        Ok(())
    }

    async fn on_shutdown(&mut self) -> Result<()> {
        info!("API Server Interface shutting down...");
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        Ok(())
    }
}
