//! Chat identity types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// Numeric chat identifier assigned by the chat source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChatId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ChatId)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        ChatId(id)
    }
}

/// Kind of a chat. Only supergroups (which include broadcast channels) have a
/// public identity that messages can link to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    Private,
    BasicGroup,
    Supergroup,
    Secret,
}

impl fmt::Display for ChatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatKind::Private => write!(f, "private"),
            ChatKind::BasicGroup => write!(f, "basic_group"),
            ChatKind::Supergroup => write!(f, "supergroup"),
            ChatKind::Secret => write!(f, "secret"),
        }
    }
}

/// A chat as known to the chat directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    #[serde(default)]
    pub title: String,
    pub kind: ChatKind,
    /// Active public usernames, most preferred first.
    #[serde(default)]
    pub usernames: Vec<String>,
}

impl Chat {
    /// Public name used in message links.
    ///
    /// Supergroups resolve to their first active username, or to the numeric
    /// chat id when they have none. Every other kind is unsupported.
    pub fn public_name(&self) -> Result<String, ResolveError> {
        match self.kind {
            ChatKind::Supergroup => Ok(self
                .usernames
                .first()
                .cloned()
                .unwrap_or_else(|| self.id.to_string())),
            other => Err(ResolveError::UnsupportedChatKind(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(kind: ChatKind, usernames: &[&str]) -> Chat {
        Chat {
            id: ChatId(-100123),
            title: "news".to_string(),
            kind,
            usernames: usernames.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn supergroup_uses_first_username() {
        let c = chat(ChatKind::Supergroup, &["daily_news", "dn_backup"]);
        assert_eq!(c.public_name().unwrap(), "daily_news");
    }

    #[test]
    fn supergroup_without_username_falls_back_to_id() {
        let c = chat(ChatKind::Supergroup, &[]);
        assert_eq!(c.public_name().unwrap(), "-100123");
    }

    #[test]
    fn private_chat_is_unsupported() {
        let c = chat(ChatKind::Private, &["someone"]);
        assert!(matches!(
            c.public_name(),
            Err(ResolveError::UnsupportedChatKind(ChatKind::Private))
        ));
    }

    #[test]
    fn chat_id_parses_negative_ids() {
        assert_eq!("-1001".parse::<ChatId>().unwrap(), ChatId(-1001));
        assert!("abc".parse::<ChatId>().is_err());
    }
}
