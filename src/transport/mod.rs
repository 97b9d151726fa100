//! Transport abstraction: the peer-addressed message store this protocol
//! rides on.
//!
//! The transport is treated as a black box offering five capabilities:
//! send a plain message, edit a message's text in place, delete messages,
//! keyword full-text search, and reverse-chronological history pages. It is
//! the sole source of truth: there is no local write buffer and no durable
//! storage in this crate.
//!
//! Everything above this module consumes one canonical [`Message`] record.
//! Implementations adapt their client library's own response shapes through
//! [`wire::normalize_message`] at this boundary, so alias-juggling never
//! leaks into the protocol core.

pub mod connection;
pub mod wire;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use connection::{Connect, ConnectionManager};

/// Address of the group chat hosting a forum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Peer {
    /// A channel/supergroup, addressed by ID plus its access hash.
    Channel { channel_id: i64, access_hash: i64 },
    /// A basic group chat.
    Chat { chat_id: i64 },
}

impl Peer {
    /// Creates a channel peer address.
    pub fn channel(channel_id: i64, access_hash: i64) -> Self {
        Self::Channel {
            channel_id,
            access_hash,
        }
    }

    /// Creates a basic-group peer address.
    pub fn chat(chat_id: i64) -> Self {
        Self::Chat { chat_id }
    }
}

/// Opaque reference to binary media attached to a message, kept verbatim
/// for reuse when editing or re-sending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRef(pub serde_json::Value);

/// Canonical message record produced at the transport boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Peer-local numeric message ID. Used for editing and deleting the
    /// message carrying a card, never as an entity's identity.
    pub id: i64,
    /// Raw message text (the card body, for card messages).
    pub text: String,
    /// Author's user ID, when the transport exposes one.
    pub from_user_id: Option<i64>,
    /// Send time in epoch seconds.
    pub date: i64,
    /// Attached media reference, if any.
    pub media: Option<MediaRef>,
    /// Album grouping key, if the message belongs to a media group.
    pub grouped_id: Option<String>,
}

/// One page of full-text search results.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    /// Matching messages, newest first.
    pub messages: Vec<Message>,
    /// Server-side count of all matches. Keyword search counts substring
    /// matches, so this is an upper bound, not an exact figure.
    pub approx_count: usize,
}

/// Capability set consumed from the transport.
///
/// All operations are plain request/response; timeouts and backoff are the
/// implementation's concern. Reads are side-effect-free and safe to discard
/// mid-flight; writes must not be blindly retried on ambiguous failure.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Publishes a composed card (or any plain text) and returns the
    /// resulting message record.
    async fn send_plain_message(&self, peer: &Peer, text: &str) -> Result<Message>;

    /// Replaces the text of an existing message in place.
    ///
    /// Fails with [`crate::ForumError::EditWindowExpired`] when the
    /// transport's edit window for this message has elapsed.
    async fn edit_message_text(&self, peer: &Peer, message_id: i64, new_text: &str) -> Result<()>;

    /// Deletes the given messages for all participants.
    async fn delete_messages(&self, peer: &Peer, message_ids: &[i64]) -> Result<()>;

    /// Keyword full-text search over the peer's history.
    ///
    /// `add_offset` is measured in messages from the newest matching end;
    /// the query string is always a card type tag, optionally followed by a
    /// parent ID as a second keyword.
    async fn search_messages(
        &self,
        peer: &Peer,
        query: &str,
        limit: usize,
        add_offset: usize,
    ) -> Result<SearchPage>;

    /// Fetches one reverse-chronological page of raw history.
    ///
    /// `anchor_message_id = 0` starts at the newest message; otherwise the
    /// page contains messages strictly older than the anchor.
    async fn fetch_history(
        &self,
        peer: &Peer,
        anchor_message_id: i64,
        page_size: usize,
    ) -> Result<Vec<Message>>;
}

/// Issues a lightweight count query: a search with a single-message result
/// budget, read only for its count metadata.
pub(crate) async fn count_matching<T: Transport + ?Sized>(
    transport: &T,
    peer: &Peer,
    query: &str,
) -> Result<usize> {
    let page = transport.search_messages(peer, query, 1, 0).await?;
    Ok(page.approx_count)
}
