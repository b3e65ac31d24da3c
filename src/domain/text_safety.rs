//! Length limits for outgoing text, so content can be rejected or cut before the platform refuses it

use super::lookup::NameTable;

/// Kind of outgoing text field, each with a maximum length in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextKind {
    Title,
    Author,
    Value,
    Description,
    Footer,
    Url,
    /// Whole rich-content payload
    Embed,
    /// Plain message body
    Content,
}

const TEXT_KINDS: NameTable<TextKind> = NameTable::new(&[
    ("TITLE", TextKind::Title),
    ("AUTHOR", TextKind::Author),
    ("VALUE", TextKind::Value),
    ("DESCRIPTION", TextKind::Description),
    ("FOOTER", TextKind::Footer),
    ("URL", TextKind::Url),
    ("EMBED", TextKind::Embed),
    ("CONTENT", TextKind::Content),
]);

impl TextKind {
    pub const fn max_len(self) -> usize {
        match self {
            TextKind::Title | TextKind::Author => 256,
            TextKind::Value => 1024,
            TextKind::Description => 4096,
            TextKind::Footer => 2048,
            TextKind::Url | TextKind::Content => 2000,
            TextKind::Embed => 6000,
        }
    }

    /// Resolves a kind from a loosely written name ("footer", "Description").
    pub fn from_name(name: &str) -> Option<Self> {
        TEXT_KINDS.lookup(name)
    }

    pub fn is_safe(self, text: &str) -> bool {
        text.chars().count() <= self.max_len()
    }
}

/// Checks whether `text` fits `kind`. Absent text is never safe.
pub fn is_safe(text: Option<&str>, kind: TextKind) -> bool {
    match text {
        Some(text) => kind.is_safe(text),
        None => false,
    }
}

/// Cuts `text` down to the limit of `kind` on a character boundary.
pub fn truncate(text: &str, kind: TextKind) -> &str {
    match text.char_indices().nth(kind.max_len()) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
