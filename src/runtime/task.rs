use std::fmt::{self, Display};

use crate::service::WaitTime;

pub const PAYLOAD_PREFIX: &str = "yt";

/// Upper bound for button payloads; the stricter of the two backends.
pub const MAX_CALLBACK_PAYLOAD_BYTES: usize = 64;

/// What a format button carries: `yt|<token>|<format_id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPayload {
    pub token: String,
    pub format_id: String,
}

impl SelectionPayload {
    pub fn new(token: impl Into<String>, format_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            format_id: format_id.into(),
        }
    }

    pub fn encode(&self) -> String {
        format!("{}|{}|{}", PAYLOAD_PREFIX, self.token, self.format_id)
    }

    /// Format ids may themselves contain `|`, so only the first two separators split.
    pub fn parse(payload: &str) -> Option<Self> {
        let mut parts = payload.splitn(3, '|');
        let prefix = parts.next()?;
        let token = parts.next()?;
        let format_id = parts.next()?;

        if prefix != PAYLOAD_PREFIX || token.is_empty() || format_id.is_empty() {
            return None;
        }

        Some(Self::new(token, format_id))
    }
}

/// Where a request currently is in the delivery flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Offering,
    Downloading,
    Delivering,
    Cleanup,
}

impl Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetching => "fetching",
            Stage::Offering => "offering",
            Stage::Downloading => "downloading",
            Stage::Delivering => "delivering",
            Stage::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

/// How a text message ended.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkOutcome {
    /// Not a supported link; nothing was sent.
    Ignored,
    RateLimited(WaitTime),
    ExtractionFailed,
    NoUsableFormats,
    /// The menu could not be sent; its tokens were dropped again.
    MenuFailed,
    Offered { options: usize },
}

/// How a button press ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Malformed,
    UnknownToken,
    /// Another download for the same user is still running; the token stays valid.
    Busy,
    DownloadFailed,
    DeliveryFailed,
    Delivered,
}
