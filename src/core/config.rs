use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::bots::ScriptKind;
use crate::platform::{NativePlatform, Platform};

pub const CONFIG_FILE_NAME: &str = "botherd.toml";
pub const RECORDS_FILE_NAME: &str = "bots.json";
pub const UPLOADS_DIR_NAME: &str = "uploads";

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default)]
    pub launchers: LauncherTable,
}

/// Interpreter command per [`ScriptKind`].
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LauncherTable {
    #[serde(default = "default_python_launcher")]
    pub python: String,

    #[serde(default = "default_other_launcher")]
    pub other: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    10000
}
fn default_data_dir() -> PathBuf {
    NativePlatform::data_dir()
}
fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}
fn default_python_launcher() -> String {
    NativePlatform::default_python_launcher().to_string()
}
fn default_other_launcher() -> String {
    NativePlatform::default_other_launcher().to_string()
}

impl Default for LauncherTable {
    fn default() -> Self {
        Self {
            python: default_python_launcher(),
            other: default_other_launcher(),
        }
    }
}

impl LauncherTable {
    pub fn command_for(&self, kind: ScriptKind) -> &str {
        match kind {
            ScriptKind::Python => &self.python,
            ScriptKind::Other => &self.other,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            cors_origins: Vec::new(),
            launchers: LauncherTable::default(),
        }
    }
}

/// Values taken from the command line. They win over the file and the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
}

impl ServiceConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// defaults < TOML file < `PORT` < command line.
    pub async fn load(overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = match &overrides.config_path {
            Some(path) => Self::read_file(path)
                .await
                .with_context(|| format!("reading config file {}", path.display()))?,
            None => {
                let dir = overrides.data_dir.clone().unwrap_or_else(default_data_dir);
                let path = dir.join(CONFIG_FILE_NAME);
                if path.exists() {
                    Self::read_file(&path)
                        .await
                        .with_context(|| format!("reading config file {}", path.display()))?
                } else {
                    info!("No {} found, using defaults.", CONFIG_FILE_NAME);
                    Self::default()
                }
            }
        };

        config.apply_port_env(std::env::var("PORT").ok().as_deref());
        config.apply_overrides(overrides);
        Ok(config)
    }

    async fn read_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded service config from {}", path.display());
        Ok(config)
    }

    pub fn apply_port_env(&mut self, value: Option<&str>) {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return;
        };
        match raw.parse() {
            Ok(port) => self.port = port,
            Err(_) => warn!("Ignoring invalid PORT value '{}'", raw),
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(host) = &overrides.host {
            self.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(dir) = &overrides.data_dir {
            self.data_dir = dir.clone();
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join(RECORDS_FILE_NAME)
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join(UPLOADS_DIR_NAME)
    }
}
