use chrono::Utc;
use serde::Serialize;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{info, warn};

use super::error::{BotError, BotResult};
use super::record::{BotRecord, BotStatus};
use super::registry::{ProcessHandle, ProcessRegistry};
use super::store::RecordStore;
use crate::core::config::LauncherTable;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LivenessReport {
    pub status: BotStatus,
    pub cpu: f64,
    pub memory: f64,
}

/// Start/stop/delete/status over the record store and the process registry.
///
/// Liveness is always read from the registry. The persisted `status` is only
/// written by `start` and `stop`; a process that exits on its own leaves its
/// record saying `running`.
pub struct LifecycleController {
    store: Arc<RecordStore>,
    registry: ProcessRegistry,
    launchers: LauncherTable,
}

impl LifecycleController {
    pub fn new(store: Arc<RecordStore>, registry: ProcessRegistry, launchers: LauncherTable) -> Self {
        Self {
            store,
            registry,
            launchers,
        }
    }

    #[cfg(test)]
    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    pub async fn start(&self, bot_id: &str) -> BotResult<()> {
        let _txn = self.store.lock().await;
        let mut records = self.store.load().await?;
        let record = records
            .get_mut(bot_id)
            .ok_or_else(|| BotError::NotFound(bot_id.to_string()))?;
        if self.registry.contains(bot_id).await {
            return Err(BotError::AlreadyRunning(bot_id.to_string()));
        }

        let interpreter = self.launchers.command_for(record.script_kind());
        let mut child = Command::new(interpreter)
            .arg(&record.file_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| BotError::Spawn {
                interpreter: interpreter.to_string(),
                source,
            })?;

        if let Some(stdout) = child.stdout.take() {
            forward_lines(bot_id.to_string(), stdout, false);
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines(bot_id.to_string(), stderr, true);
        }

        let (handle, stop) = ProcessHandle::new(child.id());
        let run_id = handle.run_id;
        info!(
            bot = %bot_id,
            "Started '{}' with {} (PID {:?})",
            record.name,
            interpreter,
            handle.pid
        );
        self.registry.register(bot_id, handle).await;
        self.registry.observe_exit(bot_id.to_string(), run_id, child, stop);

        record.status = BotStatus::Running;
        record.started_at = Some(Utc::now());
        self.store.save(&records).await
    }

    pub async fn stop(&self, bot_id: &str) -> BotResult<()> {
        let _txn = self.store.lock().await;
        let mut records = self.store.load().await?;
        let record = records
            .get_mut(bot_id)
            .ok_or_else(|| BotError::NotFound(bot_id.to_string()))?;
        let handle = self
            .registry
            .deregister(bot_id)
            .await
            .ok_or_else(|| BotError::NotRunning(bot_id.to_string()))?;

        handle.terminate().await;
        info!(bot = %bot_id, "Stopped '{}'", record.name);

        record.status = BotStatus::Stopped;
        record.stopped_at = Some(Utc::now());
        self.store.save(&records).await
    }

    pub async fn delete(&self, bot_id: &str) -> BotResult<()> {
        let _txn = self.store.lock().await;
        let mut records = self.store.load().await?;
        let record = records
            .remove(bot_id)
            .ok_or_else(|| BotError::NotFound(bot_id.to_string()))?;

        if let Some(handle) = self.registry.deregister(bot_id).await {
            handle.terminate().await;
        }

        match tokio::fs::remove_file(&record.file_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(bot = %bot_id, "Script file already gone: {:?}", record.file_path);
            }
            Err(e) => return Err(e.into()),
        }

        self.store.save(&records).await?;
        info!(bot = %bot_id, "Deleted '{}'", record.name);
        Ok(())
    }

    pub async fn status(&self, bot_id: &str) -> BotResult<LivenessReport> {
        let record = self.find(bot_id).await?;
        Ok(LivenessReport {
            status: BotStatus::from_liveness(self.registry.contains(bot_id).await),
            cpu: record.cpu,
            memory: record.memory,
        })
    }

    /// Synthesized summary. Process output only goes to the service log.
    pub async fn logs(&self, bot_id: &str) -> BotResult<String> {
        let record = self.find(bot_id).await?;
        let liveness = BotStatus::from_liveness(self.registry.contains(bot_id).await);
        let started = record
            .started_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "Never".to_string());
        Ok(format!(
            "Bot: {}\nStatus: {}\nCreated: {}\nStarted: {}\n",
            record.name,
            liveness,
            record.created_at.to_rfc3339(),
            started
        ))
    }

    pub async fn list_for_owner(&self, owner: &str) -> BotResult<Vec<BotRecord>> {
        let records = self.store.load().await?;
        let mut owned: Vec<&BotRecord> = records.values().filter(|r| r.owner == owner).collect();
        owned.sort_by_key(|r| r.created_at);

        let mut bots = Vec::with_capacity(owned.len());
        for record in owned {
            bots.push(record.with_liveness(self.registry.contains(&record.id).await));
        }
        Ok(bots)
    }

    /// Signals every registered process. Records are left as they are.
    pub async fn terminate_all(&self) -> usize {
        let running = self.registry.drain().await;
        let count = running.len();
        for (bot_id, handle) in running {
            info!(bot = %bot_id, "Terminating bot on shutdown");
            handle.terminate().await;
        }
        count
    }

    async fn find(&self, bot_id: &str) -> BotResult<BotRecord> {
        self.store
            .load()
            .await?
            .remove(bot_id)
            .ok_or_else(|| BotError::NotFound(bot_id.to_string()))
    }
}

fn forward_lines<R>(bot_id: String, stream: R, is_stderr: bool)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if is_stderr {
                warn!(bot = %bot_id, "{}", line);
            } else {
                info!(bot = %bot_id, "{}", line);
            }
        }
    });
}
