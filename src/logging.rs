use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Writes each formatted log line to stdout and to a broadcast channel that
/// backs the `/api/logs` event stream.
#[derive(Clone)]
pub(crate) struct TeeMakeWriter {
    pub sender: broadcast::Sender<String>,
}

impl<'a> MakeWriter<'a> for TeeMakeWriter {
    type Writer = TeeWriter;

    fn make_writer(&'a self) -> Self::Writer {
        TeeWriter {
            sender: self.sender.clone(),
        }
    }
}

pub(crate) struct TeeWriter {
    sender: broadcast::Sender<String>,
}

impl std::io::Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let msg = String::from_utf8_lossy(buf).trim_end().to_string();
        let _ = self.sender.send(msg); // no subscribers is fine
        std::io::stdout().write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stdout().flush()
    }
}

/// Installs the global subscriber. `RUST_LOG` controls the filter, default `info`.
pub(crate) fn init(sender: broadcast::Sender<String>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(TeeMakeWriter { sender })
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}
