#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("failed to start extractor: {0}")]
    Spawn(std::io::Error),
    #[error("extractor exited with {code:?}: {stderr}")]
    ExitStatus { code: Option<i32>, stderr: String },
    #[error("extractor timed out after {0}s")]
    Timeout(u64),
    #[error("parsing error: {0}")]
    ParsingError(#[from] serde_json::Error),
    #[error("unexpected extractor output: {0}")]
    UnexpectedOutput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
