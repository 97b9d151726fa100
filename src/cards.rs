//! Card codec: composing and parsing board, thread, and post cards.
//!
//! A card is the entire text body of one transport message, framed
//! line-by-line:
//!
//! ```text
//! <type-tag>
//! <permanent-id>
//! parent:<parent-id>     (thread and post cards only)
//! <JSON payload>
//! ```
//!
//! The payload is always "all remaining lines joined by newline". It is
//! never split per field, so embedded newlines inside a JSON string (or a
//! pretty-printed payload from another client) parse the same way.
//!
//! Parsing is defensive throughout. The message stream interleaves cards
//! with arbitrary chat messages, so a wrong tag, too few lines, a malformed
//! `parent:` prefix, bad JSON, or a missing required payload field all
//! yield `None` ("not a card of this type") and never an error.

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_CARD_TAG, PARENT_LINE_PREFIX, POST_CARD_TAG, THREAD_CARD_TAG};
use crate::escape::{escape, unescape};

/// JSON payload of a board metadata card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardPayload {
    /// Display title. Required; a payload without it is not a board card.
    pub title: String,
    /// Free-text description, empty when the creator provided none.
    #[serde(default)]
    pub description: String,
}

/// JSON payload of a thread metadata card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadPayload {
    /// Display title. Required.
    pub title: String,
}

/// JSON payload of a post card. `content` holds the *escaped* form; the
/// unescaped form is never persisted to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPayload {
    /// Escaped post body. Required.
    pub content: String,
}

/// A parsed board card: permanent ID plus payload fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardCard {
    pub id: String,
    pub title: String,
    pub description: String,
}

/// A parsed thread card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadCard {
    pub id: String,
    pub parent_board_id: String,
    pub title: String,
}

/// A parsed post card. `content` is already unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCard {
    pub id: String,
    pub parent_thread_id: String,
    pub content: String,
}

/// Composes the message text of a board metadata card.
pub fn compose_board_card(id: &str, title: &str, description: &str) -> String {
    let payload = serde_json::json!({ "title": title, "description": description });
    format!("{BOARD_CARD_TAG}\n{id}\n{payload}")
}

/// Composes the message text of a thread metadata card.
pub fn compose_thread_card(id: &str, parent_board_id: &str, title: &str) -> String {
    let payload = serde_json::json!({ "title": title });
    format!("{THREAD_CARD_TAG}\n{id}\n{PARENT_LINE_PREFIX}{parent_board_id}\n{payload}")
}

/// Composes the message text of a post card.
///
/// The content is escaped here; [`parse_post_card`] is the only place that
/// undoes it.
pub fn compose_post_card(id: &str, parent_thread_id: &str, content: &str) -> String {
    let payload = serde_json::json!({ "content": escape(content) });
    format!("{POST_CARD_TAG}\n{id}\n{PARENT_LINE_PREFIX}{parent_thread_id}\n{payload}")
}

/// Parses a board metadata card, or returns `None` if the text is not one.
pub fn parse_board_card(text: &str) -> Option<BoardCard> {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() < 3 || lines[0] != BOARD_CARD_TAG {
        return None;
    }
    let id = lines[1].trim();
    let payload: BoardPayload = serde_json::from_str(&lines[2..].join("\n")).ok()?;
    Some(BoardCard {
        id: id.to_string(),
        title: payload.title,
        description: payload.description,
    })
}

/// Parses a thread metadata card, or returns `None` if the text is not one.
pub fn parse_thread_card(text: &str) -> Option<ThreadCard> {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() < 4 || lines[0] != THREAD_CARD_TAG {
        return None;
    }
    let id = lines[1].trim();
    let parent_board_id = lines[2].strip_prefix(PARENT_LINE_PREFIX)?.trim();
    let payload: ThreadPayload = serde_json::from_str(&lines[3..].join("\n")).ok()?;
    Some(ThreadCard {
        id: id.to_string(),
        parent_board_id: parent_board_id.to_string(),
        title: payload.title,
    })
}

/// Parses a post card, or returns `None` if the text is not one.
///
/// The returned `content` is unescaped and ready to render.
pub fn parse_post_card(text: &str) -> Option<PostCard> {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() < 4 || lines[0] != POST_CARD_TAG {
        return None;
    }
    let id = lines[1].trim();
    let parent_thread_id = lines[2].strip_prefix(PARENT_LINE_PREFIX)?.trim();
    let payload: PostPayload = serde_json::from_str(&lines[3..].join("\n")).ok()?;
    Some(PostCard {
        id: id.to_string(),
        parent_thread_id: parent_thread_id.to_string(),
        content: unescape(&payload.content),
    })
}
