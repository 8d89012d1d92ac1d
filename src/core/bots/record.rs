use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persisted status claim. Liveness comes from the process registry, not from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotStatus {
    Stopped,
    Running,
}

impl BotStatus {
    pub fn from_liveness(alive: bool) -> Self {
        if alive {
            BotStatus::Running
        } else {
            BotStatus::Stopped
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BotStatus::Stopped => "stopped",
            BotStatus::Running => "running",
        }
    }
}

impl std::fmt::Display for BotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which launcher runs a script. Only `py` is special-cased.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Python,
    Other,
}

impl ScriptKind {
    pub fn from_file_type(file_type: &str) -> Self {
        if file_type.eq_ignore_ascii_case("py") {
            ScriptKind::Python
        } else {
            ScriptKind::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotRecord {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub file_path: PathBuf,
    pub file_type: String,
    pub status: BotStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stopped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cpu: f64,
    #[serde(default)]
    pub memory: f64,
}

impl BotRecord {
    pub fn new(
        id: String,
        name: String,
        owner: String,
        file_path: PathBuf,
        file_type: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            owner,
            file_path,
            file_type,
            status: BotStatus::Stopped,
            created_at,
            started_at: None,
            stopped_at: None,
            cpu: 0.0,
            memory: 0.0,
        }
    }

    pub fn script_kind(&self) -> ScriptKind {
        ScriptKind::from_file_type(&self.file_type)
    }

    /// Copy of the record whose `status` reflects observed liveness.
    pub fn with_liveness(&self, alive: bool) -> Self {
        let mut view = self.clone();
        view.status = BotStatus::from_liveness(alive);
        view
    }
}

/// `{owner}_{name}_{millis}` with every whitespace run collapsed to `_`.
pub fn derive_bot_id(owner: &str, name: &str, created_at: DateTime<Utc>) -> String {
    let raw = format!("{}_{}_{}", owner, name, created_at.timestamp_millis());
    raw.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Lowercased extension without the dot, or an empty string.
pub fn file_type_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_123).unwrap()
    }

    #[test]
    fn bot_id_embeds_owner_name_and_millis() {
        let id = derive_bot_id("alice", "echoBot", ts());
        assert_eq!(id, "alice_echoBot_1700000000123");
    }

    #[test]
    fn bot_id_collapses_whitespace_runs() {
        let id = derive_bot_id("alice", "my  echo\tbot", ts());
        assert_eq!(id, "alice_my_echo_bot_1700000000123");
        assert!(!id.chars().any(char::is_whitespace));
    }

    #[test]
    fn file_type_is_lowercased_extension() {
        assert_eq!(file_type_of("bot.PY"), "py");
        assert_eq!(file_type_of("index.js"), "js");
        assert_eq!(file_type_of("archive.tar.gz"), "gz");
        assert_eq!(file_type_of("Makefile"), "");
    }

    #[test]
    fn only_py_selects_python_kind() {
        assert_eq!(ScriptKind::from_file_type("py"), ScriptKind::Python);
        assert_eq!(ScriptKind::from_file_type("js"), ScriptKind::Other);
        assert_eq!(ScriptKind::from_file_type("pyc"), ScriptKind::Other);
        assert_eq!(ScriptKind::from_file_type(""), ScriptKind::Other);
    }

    #[test]
    fn new_record_is_stopped_with_zeroed_usage() {
        let record = BotRecord::new(
            "a_b_1".into(),
            "b".into(),
            "a".into(),
            PathBuf::from("/tmp/a_b_1.py"),
            "py".into(),
            ts(),
        );
        assert_eq!(record.status, BotStatus::Stopped);
        assert!(record.started_at.is_none());
        assert_eq!(record.cpu, 0.0);
        assert_eq!(record.memory, 0.0);
    }

    #[test]
    fn liveness_view_overrides_persisted_status() {
        let mut record = BotRecord::new(
            "a_b_1".into(),
            "b".into(),
            "a".into(),
            PathBuf::from("/tmp/a_b_1.py"),
            "py".into(),
            ts(),
        );
        record.status = BotStatus::Running;
        assert_eq!(record.with_liveness(false).status, BotStatus::Stopped);
        assert_eq!(record.status, BotStatus::Running);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&BotStatus::Running).unwrap();
        assert_eq!(json, "\"running\"");
    }
}
