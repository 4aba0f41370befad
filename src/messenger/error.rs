use teloxide::RequestError;

#[derive(Debug, thiserror::Error)]
pub enum MessengerError {
    #[error("telegram request failed: {0}")]
    Telegram(#[from] RequestError),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("upload returned no token: {0}")]
    MissingUploadToken(String),
    #[error("invalid api url: {0}")]
    Url(#[from] url::ParseError),
    #[error("parsing error: {0}")]
    ParsingError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
