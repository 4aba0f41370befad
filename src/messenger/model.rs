use std::fmt::{self, Display};

/// Stable per-user identity used for cooldowns and scratch directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserKey(pub i64);

impl Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a reply goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatTarget {
    Chat(i64),
    User(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardOption {
    pub text: String,
    pub payload: String,
}

/// A platform update reduced to what the delivery flow understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// The user opened the bot for the first time.
    Started {
        user: UserKey,
        target: ChatTarget,
        first_name: Option<String>,
    },
    Command {
        user: UserKey,
        target: ChatTarget,
        command: String,
        first_name: Option<String>,
    },
    Text {
        user: UserKey,
        target: ChatTarget,
        text: String,
    },
    Callback {
        user: UserKey,
        target: ChatTarget,
        callback_id: String,
        payload: String,
    },
}

impl InboundEvent {
    pub fn user(&self) -> UserKey {
        match self {
            Self::Started { user, .. }
            | Self::Command { user, .. }
            | Self::Text { user, .. }
            | Self::Callback { user, .. } => *user,
        }
    }
}

/// Splits `/cmd@bot args` into the lowercased command name.
pub fn parse_command(text: &str) -> Option<String> {
    let head = text.trim().strip_prefix('/')?.split_whitespace().next()?;
    let name = head.split('@').next().unwrap_or(head);
    (!name.is_empty()).then(|| name.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("/start").as_deref(), Some("start"));
        assert_eq!(parse_command(" /Help me").as_deref(), Some("help"));
        assert_eq!(parse_command("/start@clipdrop_bot").as_deref(), Some("start"));
        assert_eq!(parse_command("/"), None);
        assert_eq!(parse_command("start"), None);
    }
}
