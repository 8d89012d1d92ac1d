use std::path::PathBuf;

/// Platform-specific operations abstracted behind a common interface.
/// Each OS provides its own `NativePlatform` implementation so call sites
/// remain free of `#[cfg]` blocks.
pub trait Platform {
    /// Interpreter used for `.py` scripts when none is configured.
    fn default_python_launcher() -> &'static str;

    /// Interpreter used for every other script when none is configured.
    fn default_other_launcher() -> &'static str;

    /// Build a **tokio** `Command` that sends a single termination request to `pid`.
    fn terminate_command(pid: u32) -> tokio::process::Command;

    /// Root data directory for botherd.
    /// Unix: `~/.botherd`, Windows: `%APPDATA%\botherd`.
    fn data_dir() -> PathBuf;
}

/// `BOTHERD_HOME` wins over the platform default.
pub(crate) fn resolve_data_dir(default: PathBuf) -> PathBuf {
    match std::env::var_os("BOTHERD_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => default,
    }
}

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::NativePlatform;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::NativePlatform;
