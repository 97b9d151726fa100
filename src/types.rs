//! Forum entity types.
//!
//! Entities are *virtual*: each one lives entirely in the text body of a
//! single transport message, and the permanent string ID is its only
//! portable identity. The numeric `message_id` is a peer-local handle used
//! for editing and deleting that one message; it changes whenever a board
//! or thread is edited (send-new-then-delete-old) and must never be used
//! to refer to the entity itself.
//!
//! Relationships (board 1-* thread 1-* post) exist only as matching
//! `parent_*_id` fields checked at read time. The transport provides no
//! referential integrity: a parent can be deleted while children remain,
//! and such zombie entities still parse and list; rendering them under a
//! placeholder parent is the UI's concern.

use serde::{Deserialize, Serialize};

use crate::cards::{BoardCard, PostCard, ThreadCard};
use crate::transport::{MediaRef, Message};

/// A discussion board, reconstructed from its metadata card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    /// Permanent identifier, stable across edits.
    pub id: String,
    /// Handle of the message currently carrying this board's card.
    pub message_id: i64,
    /// Creator's user ID, from message metadata (not the card payload).
    pub creator_user_id: Option<i64>,
    /// Card message's send time, epoch seconds. Doubles as the board's
    /// nominal created/updated timestamp.
    pub date: i64,
    pub title: String,
    /// Free-text description; empty when none was provided.
    pub description: String,
}

/// A thread within a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    /// Permanent ID of the owning board.
    pub parent_board_id: String,
    pub message_id: i64,
    pub creator_user_id: Option<i64>,
    pub date: i64,
    pub title: String,
}

/// A post within a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    /// Permanent ID of the owning thread.
    pub parent_thread_id: String,
    pub message_id: i64,
    /// Author's user ID, from message metadata.
    pub from_user_id: Option<i64>,
    pub date: i64,
    /// Unescaped, render-ready content.
    pub content: String,
    /// Media attached to the carrying message, kept for edit reuse.
    pub media: Option<MediaRef>,
    /// Album grouping key shared with sibling media messages.
    pub grouped_id: Option<String>,
}

impl Board {
    /// Combines a parsed card with its carrying message's metadata.
    pub fn from_message(card: BoardCard, message: &Message) -> Self {
        Self {
            id: card.id,
            message_id: message.id,
            creator_user_id: message.from_user_id,
            date: message.date,
            title: card.title,
            description: card.description,
        }
    }
}

impl Thread {
    /// Combines a parsed card with its carrying message's metadata.
    pub fn from_message(card: ThreadCard, message: &Message) -> Self {
        Self {
            id: card.id,
            parent_board_id: card.parent_board_id,
            message_id: message.id,
            creator_user_id: message.from_user_id,
            date: message.date,
            title: card.title,
        }
    }
}

impl Post {
    /// Combines a parsed card with its carrying message's metadata.
    pub fn from_message(card: PostCard, message: &Message) -> Self {
        Self {
            id: card.id,
            parent_thread_id: card.parent_thread_id,
            message_id: message.id,
            from_user_id: message.from_user_id,
            date: message.date,
            content: card.content,
            media: message.media.clone(),
            grouped_id: message.grouped_id.clone(),
        }
    }
}
