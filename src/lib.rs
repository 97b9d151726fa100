//! # ForumGram: a forum protocol over a plain chat transport
//!
//! This crate overlays a lightweight forum data model (boards → threads →
//! posts) on a generic peer-addressed group-chat transport that has no
//! native concept of boards or threads. Every entity is a **card**: a
//! structured text body carried by one ordinary chat message. The
//! transport *is* the database. This crate stores nothing locally and
//! guarantees only eventual discoverability of a written card, through
//! either the transport's search index or a raw history scan.
//!
//! ## Hierarchy
//!
//! ```text
//! Peer (group chat)
//!     └── Board card        fg.metadata.board
//!             └── Thread card   fg.metadata.thread  (parent: board ID)
//!                     └── Post card   fg.post       (parent: thread ID)
//! ```
//!
//! ## Layers
//!
//! - [`ids`]: random URL-safe permanent identifiers.
//! - [`escape`]: reversible escaping so the transport's rich-text layer
//!   cannot corrupt stored content.
//! - [`cards`]: the line-oriented card codec (compose/parse, defensive).
//! - [`transport`]: the consumed capability set, the canonical message
//!   record with its wire normalization adapter, and lazy connection
//!   management.
//! - [`search`]: index search with a bounded reverse history-scan fallback
//!   that papers over search-index lag.
//! - [`pagination`]: stable oldest-first pages over a newest-anchored
//!   stream.
//! - [`client`]: a connection-managed facade with the full write
//!   lifecycle (create, edit, delete for all three entity types).
//!
//! ## Usage
//!
//! ```ignore
//! use forumgram::{ForumClient, Peer};
//!
//! let client = ForumClient::new(my_connector);
//! let peer = Peer::channel(channel_id, access_hash);
//!
//! let board = client.create_board(&peer, "General", "Anything goes").await?;
//! let thread = client.create_thread(&peer, &board.id, "Hello").await?;
//! client.send_post(&peer, &thread.id, "First!").await?;
//!
//! // Freshly written cards are visible immediately, even before the
//! // transport's search index catches up.
//! let page = client.posts_page(&peer, &thread.id, 1).await?;
//! ```

pub mod cards;
pub mod client;
pub mod constants;
pub mod error;
pub mod escape;
pub mod ids;
pub mod pagination;
pub mod search;
pub mod transport;
pub mod types;

pub use cards::{
    compose_board_card, compose_post_card, compose_thread_card, parse_board_card, parse_post_card,
    parse_thread_card, BoardCard, PostCard, ThreadCard,
};
pub use client::{ClientConfig, ForumClient};
pub use error::{ForumError, Result};
pub use escape::{escape, unescape};
pub use ids::{generate_entity_id, generate_id, generate_short_id};
pub use pagination::{fetch_page, PostPage};
pub use search::{
    last_post_for_board, last_post_for_thread, last_posts_by_thread, search_boards, search_posts,
    search_threads, ScanConfig,
};
pub use transport::{Connect, ConnectionManager, MediaRef, Message, Peer, SearchPage, Transport};
pub use types::{Board, Post, Thread};
