//! Shared constants for card framing, query limits, and scan bounds.
//!
//! These values are shared between the codec, the search/reconciliation
//! layer, and the pagination engine so every component frames and discovers
//! cards the same way.

// =============================================================================
// Card Framing
// =============================================================================

/// Type tag on the first line of a board metadata card.
pub const BOARD_CARD_TAG: &str = "fg.metadata.board";

/// Type tag on the first line of a thread metadata card.
pub const THREAD_CARD_TAG: &str = "fg.metadata.thread";

/// Type tag on the first line of a post card.
pub const POST_CARD_TAG: &str = "fg.post";

/// Prefix of the parent-reference line on thread and post cards.
pub const PARENT_LINE_PREFIX: &str = "parent:";

// =============================================================================
// Identifier Lengths
// =============================================================================

/// Random bytes in a permanent entity identifier (board, thread, post).
pub const ENTITY_ID_BYTES: usize = 16;

/// Random bytes in a short-lived identifier (attachment placeholders).
pub const SHORT_ID_BYTES: usize = 8;

// =============================================================================
// Content Size Limits
// =============================================================================

/// Maximum board/thread title size (512 bytes).
pub const MAX_TITLE_SIZE: usize = 512;

/// Maximum board description size (10KB).
pub const MAX_DESCRIPTION_SIZE: usize = 10 * 1024;

/// Maximum post content size before escaping (100KB).
pub const MAX_POST_CONTENT_SIZE: usize = 100 * 1024;

// =============================================================================
// Search / Reconciliation Limits
// =============================================================================

/// Default result limit when listing board cards.
pub const DEFAULT_BOARD_QUERY_LIMIT: usize = 100;

/// Default result limit when listing thread cards of one board.
pub const DEFAULT_THREAD_QUERY_LIMIT: usize = 200;

/// Default result limit when listing post cards of one thread.
pub const DEFAULT_POST_QUERY_LIMIT: usize = 500;

/// Messages per page during the reverse history scan fallback.
pub const HISTORY_SCAN_PAGE_SIZE: usize = 100;

/// Maximum history pages fetched by one reconciliation scan. Bounds worst
/// case latency on chats with heavy unrelated traffic.
pub const HISTORY_SCAN_MAX_PAGES: usize = 30;

/// Newest threads consulted when deriving a board's most recent post.
/// Boards with more threads may report stale activity; this is an accepted
/// trade of completeness for latency.
pub const DEFAULT_LAST_POST_THREAD_SCAN_CAP: usize = 8;

// =============================================================================
// Pagination
// =============================================================================

/// Default posts per page in thread views.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Recent-history window consulted when deleting a grouped-media post, to
/// pick up the sibling messages of the album.
pub const ALBUM_LOOKUP_HISTORY_LIMIT: usize = 100;
