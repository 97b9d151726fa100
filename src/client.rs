//! High-level forum client: write operations and managed reads.
//!
//! `ForumClient` bundles the card codec, the search/reconciliation layer,
//! and the pagination engine behind one connection-managed facade. The
//! connection manager is injected at construction; nothing here touches
//! global state.
//!
//! Write semantics follow the entity lifecycle rules:
//! - Boards and threads are edited by sending a replacement card and then
//!   deleting the superseded message. The permanent ID carries over; the
//!   message ID is reassigned.
//! - Posts are edited strictly in place, reusing both message ID and card
//!   ID. When the transport's edit window has expired the typed failure is
//!   surfaced as-is; the edit is never downgraded to delete+recreate.
//! - A send that fails after the request went out is reported as
//!   [`ForumError::AmbiguousSend`] and never retried here: the transport
//!   may already hold the card, and a blind retry could publish the same
//!   entity twice.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cards::{compose_board_card, compose_post_card, compose_thread_card};
use crate::constants::{
    ALBUM_LOOKUP_HISTORY_LIMIT, DEFAULT_BOARD_QUERY_LIMIT, DEFAULT_LAST_POST_THREAD_SCAN_CAP,
    DEFAULT_PAGE_SIZE, DEFAULT_POST_QUERY_LIMIT, DEFAULT_THREAD_QUERY_LIMIT, MAX_DESCRIPTION_SIZE,
    MAX_POST_CONTENT_SIZE, MAX_TITLE_SIZE,
};
use crate::error::{ForumError, Result};
use crate::ids::generate_entity_id;
use crate::pagination::{fetch_page, PostPage};
use crate::search::{
    last_post_for_board, last_post_for_thread, last_posts_by_thread, search_boards_with,
    search_posts_with, search_threads_with, ScanConfig,
};
use crate::transport::{Connect, ConnectionManager, Peer, Transport};
use crate::types::{Board, Post, Thread};

/// Tunables for a [`ForumClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Result limit when listing boards.
    pub board_query_limit: usize,
    /// Result limit when listing one board's threads.
    pub thread_query_limit: usize,
    /// Result limit when listing one thread's posts outside pagination.
    pub post_query_limit: usize,
    /// Posts per page in paginated thread views.
    pub page_size: usize,
    /// Newest threads consulted for a board's last-activity lookup.
    pub last_post_thread_scan_cap: usize,
    /// Bounds for the reconciliation history scan.
    pub scan: ScanConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            board_query_limit: DEFAULT_BOARD_QUERY_LIMIT,
            thread_query_limit: DEFAULT_THREAD_QUERY_LIMIT,
            post_query_limit: DEFAULT_POST_QUERY_LIMIT,
            page_size: DEFAULT_PAGE_SIZE,
            last_post_thread_scan_cap: DEFAULT_LAST_POST_THREAD_SCAN_CAP,
            scan: ScanConfig::default(),
        }
    }
}

/// Forum operations over a lazily connected transport.
pub struct ForumClient<C: Connect> {
    connection: ConnectionManager<C>,
    config: ClientConfig,
}

impl<C: Connect> ForumClient<C> {
    /// Creates a client with default tunables.
    pub fn new(connector: C) -> Self {
        Self::with_config(connector, ClientConfig::default())
    }

    /// Creates a client with explicit tunables.
    pub fn with_config(connector: C, config: ClientConfig) -> Self {
        Self {
            connection: ConnectionManager::new(connector),
            config,
        }
    }

    /// Returns the active tunables.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the managed connection, for operations outside this facade.
    pub fn connection(&self) -> &ConnectionManager<C> {
        &self.connection
    }

    async fn transport(&self) -> Result<Arc<C::Transport>> {
        self.connection.get().await
    }

    // =========================================================================
    // Write operations
    // =========================================================================

    /// Creates a board: fresh permanent ID, composed card, one send.
    pub async fn create_board(&self, peer: &Peer, title: &str, description: &str) -> Result<Board> {
        validate_title(title)?;
        validate_description(description)?;
        let id = generate_entity_id();
        let text = compose_board_card(&id, title, description);
        let transport = self.transport().await?;
        let message = send_card(transport.as_ref(), peer, &text, "board").await?;
        debug!(board_id = %id, message_id = message.id, "board card published");
        Ok(Board {
            id,
            message_id: message.id,
            creator_user_id: message.from_user_id,
            date: message.date,
            title: title.to_string(),
            description: description.to_string(),
        })
    }

    /// Creates a thread under a board.
    pub async fn create_thread(&self, peer: &Peer, board_id: &str, title: &str) -> Result<Thread> {
        validate_title(title)?;
        let id = generate_entity_id();
        let text = compose_thread_card(&id, board_id, title);
        let transport = self.transport().await?;
        let message = send_card(transport.as_ref(), peer, &text, "thread").await?;
        debug!(thread_id = %id, message_id = message.id, "thread card published");
        Ok(Thread {
            id,
            parent_board_id: board_id.to_string(),
            message_id: message.id,
            creator_user_id: message.from_user_id,
            date: message.date,
            title: title.to_string(),
        })
    }

    /// Publishes a post in a thread.
    pub async fn send_post(&self, peer: &Peer, thread_id: &str, content: &str) -> Result<Post> {
        validate_post_content(content)?;
        let id = generate_entity_id();
        let text = compose_post_card(&id, thread_id, content);
        let transport = self.transport().await?;
        let message = send_card(transport.as_ref(), peer, &text, "post").await?;
        Ok(Post {
            id,
            parent_thread_id: thread_id.to_string(),
            message_id: message.id,
            from_user_id: message.from_user_id,
            date: message.date,
            content: content.to_string(),
            media: message.media,
            grouped_id: message.grouped_id,
        })
    }

    /// Edits a board by replacing its card message.
    ///
    /// The replacement is sent first; only after that send succeeds is the
    /// superseded message deleted, so at no point is the board without a
    /// live card. The permanent ID is preserved.
    pub async fn edit_board(
        &self,
        peer: &Peer,
        board: &Board,
        title: &str,
        description: &str,
    ) -> Result<Board> {
        validate_title(title)?;
        validate_description(description)?;
        let text = compose_board_card(&board.id, title, description);
        let transport = self.transport().await?;
        let message = send_card(transport.as_ref(), peer, &text, "board").await?;
        retire_message(transport.as_ref(), peer, board.message_id, "board").await;
        Ok(Board {
            id: board.id.clone(),
            message_id: message.id,
            creator_user_id: message.from_user_id,
            date: message.date,
            title: title.to_string(),
            description: description.to_string(),
        })
    }

    /// Edits a thread by replacing its card message. Same pattern as
    /// [`edit_board`](Self::edit_board).
    pub async fn edit_thread(&self, peer: &Peer, thread: &Thread, title: &str) -> Result<Thread> {
        validate_title(title)?;
        let text = compose_thread_card(&thread.id, &thread.parent_board_id, title);
        let transport = self.transport().await?;
        let message = send_card(transport.as_ref(), peer, &text, "thread").await?;
        retire_message(transport.as_ref(), peer, thread.message_id, "thread").await;
        Ok(Thread {
            id: thread.id.clone(),
            parent_board_id: thread.parent_board_id.clone(),
            message_id: message.id,
            creator_user_id: message.from_user_id,
            date: message.date,
            title: title.to_string(),
        })
    }

    /// Edits a post in place, preserving both message ID and card ID.
    ///
    /// Fails with [`ForumError::EditWindowExpired`] once the transport's
    /// edit window has elapsed; the caller keeps its composer state and
    /// decides what to tell the user. No delete+recreate fallback exists
    /// here on purpose.
    pub async fn edit_post(&self, peer: &Peer, post: &Post, content: &str) -> Result<Post> {
        validate_post_content(content)?;
        let text = compose_post_card(&post.id, &post.parent_thread_id, content);
        let transport = self.transport().await?;
        transport
            .edit_message_text(peer, post.message_id, &text)
            .await?;
        Ok(Post {
            content: content.to_string(),
            ..post.clone()
        })
    }

    /// Deletes a board's card message. Threads under it become zombies by
    /// design; they are not repaired or cascaded here.
    pub async fn delete_board(&self, peer: &Peer, board: &Board) -> Result<()> {
        let transport = self.transport().await?;
        transport.delete_messages(peer, &[board.message_id]).await
    }

    /// Deletes a thread's card message. Its posts remain as zombies.
    pub async fn delete_thread(&self, peer: &Peer, thread: &Thread) -> Result<()> {
        let transport = self.transport().await?;
        transport.delete_messages(peer, &[thread.message_id]).await
    }

    /// Deletes a post, album-aware.
    ///
    /// A post carrying a `grouped_id` was sent alongside sibling media
    /// messages; a recent-history window is consulted to delete the whole
    /// group in one call. The sibling lookup is best effort; when it
    /// fails, the post message alone is deleted.
    pub async fn delete_post(&self, peer: &Peer, post: &Post) -> Result<()> {
        let transport = self.transport().await?;
        let mut message_ids = vec![post.message_id];
        if let Some(grouped_id) = &post.grouped_id {
            match transport
                .fetch_history(peer, 0, ALBUM_LOOKUP_HISTORY_LIMIT)
                .await
            {
                Ok(recent) => {
                    for sibling in recent {
                        if sibling.grouped_id.as_deref() == Some(grouped_id.as_str())
                            && !message_ids.contains(&sibling.id)
                        {
                            message_ids.push(sibling.id);
                        }
                    }
                }
                Err(err) => {
                    warn!(error = %err, "album sibling lookup failed, deleting post message only");
                }
            }
        }
        transport.delete_messages(peer, &message_ids).await
    }

    // =========================================================================
    // Read operations
    // =========================================================================

    /// Lists boards, in discovery order.
    pub async fn boards(&self, peer: &Peer) -> Result<Vec<Board>> {
        let transport = self.transport().await?;
        search_boards_with(
            transport.as_ref(),
            peer,
            self.config.board_query_limit,
            self.config.scan,
        )
        .await
    }

    /// Lists a board's threads, newest first.
    pub async fn threads(&self, peer: &Peer, board_id: &str) -> Result<Vec<Thread>> {
        let transport = self.transport().await?;
        let mut threads = search_threads_with(
            transport.as_ref(),
            peer,
            board_id,
            self.config.thread_query_limit,
            self.config.scan,
        )
        .await?;
        threads.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(threads)
    }

    /// Lists a thread's posts in discovery order, up to the configured
    /// limit. For chronological page views use
    /// [`posts_page`](Self::posts_page).
    pub async fn posts(&self, peer: &Peer, thread_id: &str) -> Result<Vec<Post>> {
        let transport = self.transport().await?;
        search_posts_with(
            transport.as_ref(),
            peer,
            thread_id,
            self.config.post_query_limit,
            self.config.scan,
        )
        .await
    }

    /// Fetches one page of a thread's posts (oldest-first numbering).
    pub async fn posts_page(
        &self,
        peer: &Peer,
        thread_id: &str,
        page_number: usize,
    ) -> Result<PostPage> {
        let transport = self.transport().await?;
        fetch_page(
            transport.as_ref(),
            peer,
            thread_id,
            page_number,
            self.config.page_size,
        )
        .await
    }

    /// Most recent post in one thread.
    pub async fn last_post_for_thread(&self, peer: &Peer, thread_id: &str) -> Result<Option<Post>> {
        let transport = self.transport().await?;
        last_post_for_thread(transport.as_ref(), peer, thread_id).await
    }

    /// Most recent post per thread, fetched concurrently.
    pub async fn last_posts_by_thread(
        &self,
        peer: &Peer,
        thread_ids: &[String],
    ) -> Result<std::collections::HashMap<String, Post>> {
        let transport = self.transport().await?;
        last_posts_by_thread(transport.as_ref(), peer, thread_ids).await
    }

    /// Most recent post in a board, bounded by the configured thread cap.
    pub async fn last_post_for_board(&self, peer: &Peer, board_id: &str) -> Result<Option<Post>> {
        let transport = self.transport().await?;
        last_post_for_board(
            transport.as_ref(),
            peer,
            board_id,
            self.config.last_post_thread_scan_cap,
        )
        .await
    }
}

/// Sends a composed card, converting a transport failure into the
/// ambiguous-send error: once the request is out, the server may already
/// hold the message, so the caller must not blindly retry.
async fn send_card<T: Transport + ?Sized>(
    transport: &T,
    peer: &Peer,
    text: &str,
    kind: &str,
) -> Result<crate::transport::Message> {
    transport
        .send_plain_message(peer, text)
        .await
        .map_err(|err| match err {
            ForumError::Transport(msg) => {
                ForumError::ambiguous_send(format!("{kind} card send failed: {msg}"))
            }
            other => other,
        })
}

/// Deletes a superseded card message after its replacement is live. A
/// failure leaves a duplicate card behind; listings key on message IDs so
/// the stale copy only costs one extra row until it is cleaned up manually.
async fn retire_message<T: Transport + ?Sized>(
    transport: &T,
    peer: &Peer,
    message_id: i64,
    kind: &str,
) {
    if let Err(err) = transport.delete_messages(peer, &[message_id]).await {
        warn!(message_id, kind, error = %err, "failed to retire superseded card message");
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(ForumError::invalid_input("title cannot be empty"));
    }
    if title.len() > MAX_TITLE_SIZE {
        return Err(ForumError::invalid_input(format!(
            "title exceeds maximum length of {MAX_TITLE_SIZE} bytes"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<()> {
    if description.len() > MAX_DESCRIPTION_SIZE {
        return Err(ForumError::invalid_input(format!(
            "description exceeds maximum length of {MAX_DESCRIPTION_SIZE} bytes"
        )));
    }
    Ok(())
}

fn validate_post_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(ForumError::invalid_input("post content cannot be empty"));
    }
    if content.len() > MAX_POST_CONTENT_SIZE {
        return Err(ForumError::invalid_input(format!(
            "post content exceeds maximum length of {MAX_POST_CONTENT_SIZE} bytes"
        )));
    }
    Ok(())
}
