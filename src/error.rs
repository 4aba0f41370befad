use crate::config::ConfigError;
use crate::runtime::RuntimeError;

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Runtime error: {0}")]
    RuntimeError(#[from] RuntimeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(anyhow::Error),
}

impl From<anyhow::Error> for BotError {
    fn from(error: anyhow::Error) -> Self {
        BotError::Other(error)
    }
}

pub type HandlerResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub type BotResult<T> = Result<T, BotError>;
