use std::path::PathBuf;

use super::{Platform, resolve_data_dir};

pub struct NativePlatform;

impl Platform for NativePlatform {
    fn default_python_launcher() -> &'static str {
        "python"
    }

    fn default_other_launcher() -> &'static str {
        "node"
    }

    fn terminate_command(pid: u32) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new("taskkill");
        cmd.args(["/PID", &pid.to_string()]);
        cmd
    }

    fn data_dir() -> PathBuf {
        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        resolve_data_dir(base.join("botherd"))
    }
}
