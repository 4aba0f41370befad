use std::{fmt::Display, path::PathBuf, str::FromStr};

use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing {0}")]
    MissingKey(String),
    #[error("Invalid {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bot: BotConfig,
    pub rate_limit: RateLimitConfig,
    pub download: DownloadConfig,
    pub max: MaxConfig,
    pub selection: SelectionConfig,
    pub background_tasks: BackgroundTasksConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Telegram,
    Max,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "telegram" => Ok(Self::Telegram),
            "max" => Ok(Self::Max),
            other => Err(ConfigError::InvalidValue {
                key: "BOT_BACKEND".into(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct BotConfig {
    pub token: String,
    pub backend: BackendKind,
    pub locale: String,
}

#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub cooldown_minutes: u64,
}

#[derive(Clone, Debug)]
pub struct DownloadConfig {
    pub dir: PathBuf,
    /// Substrings that mark a message as a supported video link.
    pub domains: Vec<String>,
    pub ytdlp_path: PathBuf,
    pub extract_timeout_secs: u64,
    pub download_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct MaxConfig {
    pub api_url: Url,
    pub send_retries: u32,
    pub send_retry_delay_secs: u64,
    pub upload_settle_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SelectionConfig {
    /// 0 keeps tokens until their download finishes or the process exits.
    pub ttl_minutes: u64,
}

#[derive(Clone, Debug)]
pub struct BackgroundTasksConfig {
    pub cleanup_interval_secs: u64,
}

pub const DEFAULT_MAX_API_URL: &str = "https://botapi.max.ru";

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        build_config(|key| std::env::var(key).ok())
    }
}

pub fn build_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    info!("Building AppConfig...");

    let token = get(&lookup, "BOT_TOKEN").ok_or_else(|| ConfigError::MissingKey("BOT_TOKEN".into()))?;

    let backend = match get(&lookup, "BOT_BACKEND") {
        Some(value) => value.parse::<BackendKind>()?,
        None => BackendKind::Telegram,
    };

    let domains = get(&lookup, "VIDEO_DOMAINS")
        .map(|value| {
            value
                .split(',')
                .map(|d| d.trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_else(|| vec!["youtube.com".to_string(), "youtu.be".to_string()]);

    let api_url = get(&lookup, "MAX_API_URL").unwrap_or_else(|| DEFAULT_MAX_API_URL.to_string());
    let mut api_url = Url::parse(&api_url).map_err(|_| ConfigError::InvalidValue {
        key: "MAX_API_URL".into(),
        value: api_url.clone(),
    })?;
    // endpoints are joined onto the base, which would replace a last segment without `/`
    if !api_url.path().ends_with('/') {
        let path = format!("{}/", api_url.path());
        api_url.set_path(&path);
    }

    let config = AppConfig {
        bot: BotConfig {
            token,
            backend,
            locale: get(&lookup, "BOT_LOCALE").unwrap_or_else(|| "en".to_string()),
        },
        rate_limit: RateLimitConfig {
            cooldown_minutes: parse_minutes_or(&lookup, "COOLDOWN_MINUTES", 3)?,
        },
        download: DownloadConfig {
            dir: PathBuf::from(get(&lookup, "DOWNLOAD_DIR").unwrap_or_else(|| "downloads".to_string())),
            domains,
            ytdlp_path: PathBuf::from(get(&lookup, "YTDLP_PATH").unwrap_or_else(|| "yt-dlp".to_string())),
            extract_timeout_secs: parse_or(&lookup, "EXTRACT_TIMEOUT_SECS", 120)?,
            download_timeout_secs: parse_or(&lookup, "DOWNLOAD_TIMEOUT_SECS", 1800)?,
        },
        max: MaxConfig {
            api_url,
            send_retries: parse_or(&lookup, "MAX_SEND_RETRIES", 3)?,
            send_retry_delay_secs: parse_or(&lookup, "MAX_SEND_RETRY_DELAY_SECS", 2)?,
            upload_settle_secs: parse_or(&lookup, "MAX_UPLOAD_SETTLE_SECS", 1)?,
        },
        selection: SelectionConfig {
            ttl_minutes: parse_minutes_or(&lookup, "SELECTION_TTL_MINUTES", 0)?,
        },
        background_tasks: BackgroundTasksConfig {
            cleanup_interval_secs: parse_or(&lookup, "CLEANUP_INTERVAL_SECS", 300)?,
        },
    };

    info!("AppConfig built");

    Ok(config)
}

// empty values count as unset
fn get<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match get(lookup, key) {
        Some(value) => value.parse::<T>().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

/// A minute count as a span that still fits on the calendar when added to the current time.
pub fn minutes_span(minutes: u64) -> Option<chrono::Duration> {
    let span = i64::try_from(minutes).ok().and_then(chrono::Duration::try_minutes)?;
    chrono::Utc::now().checked_add_signed(span).map(|_| span)
}

fn parse_minutes_or<F>(lookup: &F, key: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let minutes = parse_or(lookup, key, default)?;
    match minutes_span(minutes) {
        Some(_) => Ok(minutes),
        None => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: minutes.to_string(),
        }),
    }
}
