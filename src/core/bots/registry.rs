use std::collections::HashMap;
use std::sync::Arc;
use tokio::process::Child;
use tokio::sync::{Mutex, oneshot};
use tracing::{info, warn};
use uuid::Uuid;

use crate::platform::{NativePlatform, Platform};

/// Live process for one bot. `run_id` tells two spawns of the same bot apart.
#[derive(Debug)]
pub struct ProcessHandle {
    pub run_id: Uuid,
    pub pid: Option<u32>,
    stop_tx: oneshot::Sender<oneshot::Sender<()>>,
}

/// Receiving half of a [`ProcessHandle`], held by the task that owns the child.
#[derive(Debug)]
pub struct StopSignal(oneshot::Receiver<oneshot::Sender<()>>);

impl ProcessHandle {
    pub fn new(pid: Option<u32>) -> (Self, StopSignal) {
        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = Self {
            run_id: Uuid::new_v4(),
            pid,
            stop_tx,
        };
        (handle, StopSignal(stop_rx))
    }

    /// Asks the exit observer to send one termination signal and returns once it
    /// is sent, without waiting for the exit. A child that was already reaped is
    /// never signalled, so a recycled PID cannot be hit.
    pub async fn terminate(self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.stop_tx.send(ack_tx).is_err() {
            return;
        }
        let _ = ack_rx.await;
    }
}

async fn send_terminate(pid: u32) {
    match NativePlatform::terminate_command(pid).output().await {
        Ok(out) if out.status.success() => info!("Sent termination signal to PID {}", pid),
        Ok(out) => warn!(
            "Termination signal to PID {} failed: {}",
            pid,
            String::from_utf8_lossy(&out.stderr).trim()
        ),
        Err(e) => warn!("Could not signal PID {}: {}", pid, e),
    }
}

/// Volatile map from bot id to its live process. Never persisted.
#[derive(Clone, Debug, Default)]
pub struct ProcessRegistry {
    inner: Arc<Mutex<HashMap<String, ProcessHandle>>>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, bot_id: &str) -> bool {
        self.inner.lock().await.contains_key(bot_id)
    }

    pub async fn register(&self, bot_id: &str, handle: ProcessHandle) {
        self.inner.lock().await.insert(bot_id.to_string(), handle);
    }

    pub async fn deregister(&self, bot_id: &str) -> Option<ProcessHandle> {
        self.inner.lock().await.remove(bot_id)
    }

    /// Removes the entry only if it still belongs to `run_id`.
    pub async fn prune_exited(&self, bot_id: &str, run_id: Uuid) -> bool {
        let mut map = self.inner.lock().await;
        match map.get(bot_id) {
            Some(handle) if handle.run_id == run_id => {
                map.remove(bot_id);
                true
            }
            _ => false,
        }
    }

    #[cfg(test)]
    pub async fn running_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn drain(&self) -> Vec<(String, ProcessHandle)> {
        self.inner.lock().await.drain().collect()
    }

    /// Owns `child` in the background: signals it on request, reaps it, and
    /// prunes its entry once it exits.
    pub fn observe_exit(&self, bot_id: String, run_id: Uuid, mut child: Child, stop: StopSignal) {
        let registry = self.clone();
        tokio::spawn(async move {
            let status = tokio::select! {
                status = child.wait() => status,
                Ok(ack) = stop.0 => {
                    // Not reaped yet, so the PID still names this child.
                    if let Some(pid) = child.id() {
                        send_terminate(pid).await;
                    }
                    let _ = ack.send(());
                    child.wait().await
                }
            };
            match status {
                Ok(status) => info!(bot = %bot_id, "Bot process exited ({})", status),
                Err(e) => warn!(bot = %bot_id, "Waiting on bot process failed: {}", e),
            }
            if registry.prune_exited(&bot_id, run_id).await {
                info!(bot = %bot_id, "Removed exited bot from process registry");
            }
        });
    }
}
