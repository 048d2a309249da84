//! Formatted text as delivered by the chat source.
//!
//! Entity offsets and lengths are measured in UTF-16 code units, which is what
//! the upstream protocol uses. Nothing in this module converts them; see
//! `inbrief_core::sanitize` for the code that slices text by these spans.

use serde::{Deserialize, Serialize};

/// Kind of a formatting span.
///
/// Unknown kinds deserialize to [`EntityKind::Other`] so that new upstream
/// entity types never break ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    BotCommand,
    Hashtag,
    Mention,
    Cashtag,
    MentionName,
    Url,
    TextUrl,
    EmailAddress,
    PhoneNumber,
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Spoiler,
    Code,
    Pre,
    PreCode,
    BlockQuote,
    CustomEmoji,
    #[serde(other)]
    Other,
}

impl EntityKind {
    /// Kinds whose underlying text is cut out of a message before it is stored.
    pub const STRIPPED: [EntityKind; 7] = [
        EntityKind::BotCommand,
        EntityKind::Hashtag,
        EntityKind::Mention,
        EntityKind::Cashtag,
        EntityKind::MentionName,
        EntityKind::Url,
        EntityKind::TextUrl,
    ];

    /// Whether spans of this kind are removed by sanitization.
    pub fn is_stripped(self) -> bool {
        Self::STRIPPED.contains(&self)
    }
}

/// A tagged region of text addressed by UTF-16 offset and length.
///
/// Offsets are signed because the upstream protocol uses signed 32-bit
/// integers and nothing prevents it from sending garbage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEntity {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub offset: i32,
    pub length: i32,
}

impl TextEntity {
    pub fn new(kind: EntityKind, offset: i32, length: i32) -> Self {
        Self {
            kind,
            offset,
            length,
        }
    }
}

/// Text plus its formatting spans. Entity order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedText {
    pub text: String,
    #[serde(default)]
    pub entities: Vec<TextEntity>,
}

impl FormattedText {
    /// Text with no entities.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            entities: Vec::new(),
        }
    }

    /// Builder-style helper for attaching an entity.
    pub fn with_entity(mut self, kind: EntityKind, offset: i32, length: i32) -> Self {
        self.entities.push(TextEntity::new(kind, offset, length));
        self
    }
}
