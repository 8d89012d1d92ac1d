use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    TooLarge(String),
    #[error("Bot not found: {0}")]
    NotFound(String),
    #[error("Bot is already running: {0}")]
    AlreadyRunning(String),
    #[error("Bot is not running: {0}")]
    NotRunning(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Bot record store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("Failed to launch '{interpreter}': {source}")]
    Spawn {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },
}

pub type BotResult<T> = std::result::Result<T, BotError>;
