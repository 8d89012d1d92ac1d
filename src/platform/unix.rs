use std::path::PathBuf;

use super::{Platform, resolve_data_dir};

pub struct NativePlatform;

impl Platform for NativePlatform {
    fn default_python_launcher() -> &'static str {
        "python3"
    }

    fn default_other_launcher() -> &'static str {
        "node"
    }

    fn terminate_command(pid: u32) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new("kill");
        cmd.arg("-15").arg(pid.to_string());
        cmd
    }

    fn data_dir() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        resolve_data_dir(home.join(".botherd"))
    }
}
