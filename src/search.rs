//! Entity search and reconciliation.
//!
//! Listing a board's threads or a thread's posts means recovering structure
//! from an unordered, partially-indexed message stream. The transport's
//! full-text index is built asynchronously and can lag writes by seconds to
//! minutes, so a lookup that trusted it alone would make freshly created
//! entities invisible right after creation. Every lookup therefore runs as
//! a two-phase state machine:
//!
//! 1. **Indexed**: one keyword search for the card type's tag (plus the
//!    parent ID, for threads and posts), parsed and exact-parent filtered.
//! 2. **Scanning**: if fewer than `limit` confirmed matches came back, a
//!    bounded reverse history scan walks raw pages from the newest message
//!    backward, applying the same parse-and-filter and deduplicating by
//!    message ID against phase 1's results.
//!
//! The scan stops on any of: the desired count reached, a short page
//! (history exhausted), or the page ceiling hit. Results come back in
//! discovery order, NOT chronological; callers that need chronology sort
//! by the entity's `date` explicitly.
//!
//! Server-side keyword search matches substrings, so a thread ID that is a
//! prefix of another thread ID produces false-positive hits; the exact
//! parent comparison here is what makes listings trustworthy.

use std::collections::{HashMap, HashSet};

use futures::future::join_all;
use tracing::{debug, warn};

use crate::cards::{parse_board_card, parse_post_card, parse_thread_card};
use crate::constants::{
    BOARD_CARD_TAG, DEFAULT_POST_QUERY_LIMIT, DEFAULT_THREAD_QUERY_LIMIT, HISTORY_SCAN_MAX_PAGES,
    HISTORY_SCAN_PAGE_SIZE, POST_CARD_TAG, THREAD_CARD_TAG,
};
use crate::error::Result;
use crate::transport::{Message, Peer, Transport};
use crate::types::{Board, Post, Thread};

/// Bounds for the reverse history scan fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Messages requested per history page.
    pub page_size: usize,
    /// Ceiling on history pages fetched by one reconciliation pass.
    pub max_pages: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            page_size: HISTORY_SCAN_PAGE_SIZE,
            max_pages: HISTORY_SCAN_MAX_PAGES,
        }
    }
}

/// Phase of the two-phase lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanPhase {
    /// Querying the full-text index.
    Indexed,
    /// Walking raw history backward from `anchor` (0 = newest).
    Scanning { anchor: i64, pages_fetched: usize },
    /// Enough results, history exhausted, or ceiling hit.
    Done,
}

/// Runs the two-phase lookup, decoding each message with `decode`.
///
/// `decode` returns `None` for anything that is not a confirmed card of the
/// target type with the requested parent; such messages still count as seen
/// so the scan never re-parses them. A failed index query degrades to the
/// scan phase, and a failed history fetch ends the scan with whatever has
/// been found; a listing never dies because one request did.
async fn collect_cards<T, E, F>(
    transport: &T,
    peer: &Peer,
    query: &str,
    limit: usize,
    config: ScanConfig,
    decode: F,
) -> Result<Vec<E>>
where
    T: Transport + ?Sized,
    F: Fn(&Message) -> Option<E>,
{
    let mut items = Vec::new();
    let mut seen_message_ids: HashSet<i64> = HashSet::new();
    let mut phase = ScanPhase::Indexed;

    while phase != ScanPhase::Done {
        match phase {
            ScanPhase::Indexed => {
                match transport.search_messages(peer, query, limit, 0).await {
                    Ok(page) => {
                        for message in &page.messages {
                            if !seen_message_ids.insert(message.id) {
                                continue;
                            }
                            if let Some(item) = decode(message) {
                                items.push(item);
                            }
                        }
                    }
                    Err(err) => {
                        warn!(%query, error = %err, "index search failed, falling back to history scan");
                    }
                }
                phase = if items.len() >= limit {
                    ScanPhase::Done
                } else {
                    debug!(
                        %query,
                        indexed = items.len(),
                        limit,
                        "below limit after index phase, scanning history"
                    );
                    ScanPhase::Scanning {
                        anchor: 0,
                        pages_fetched: 0,
                    }
                };
            }
            ScanPhase::Scanning {
                anchor,
                pages_fetched,
            } => {
                if pages_fetched >= config.max_pages {
                    debug!(%query, pages = pages_fetched, "history scan ceiling reached");
                    phase = ScanPhase::Done;
                    continue;
                }
                let page = match transport.fetch_history(peer, anchor, config.page_size).await {
                    Ok(page) => page,
                    Err(err) => {
                        warn!(%query, error = %err, "history fetch failed, returning partial results");
                        phase = ScanPhase::Done;
                        continue;
                    }
                };
                if page.is_empty() {
                    phase = ScanPhase::Done;
                    continue;
                }
                for message in &page {
                    if !seen_message_ids.insert(message.id) {
                        continue;
                    }
                    if let Some(item) = decode(message) {
                        items.push(item);
                    }
                }
                let oldest_id = page.iter().map(|m| m.id).min().unwrap_or(0);
                phase = if items.len() >= limit || page.len() < config.page_size {
                    ScanPhase::Done
                } else {
                    ScanPhase::Scanning {
                        anchor: oldest_id,
                        pages_fetched: pages_fetched + 1,
                    }
                };
            }
            ScanPhase::Done => unreachable!(),
        }
    }

    Ok(items)
}

/// Lists board cards in the peer's history, in discovery order.
pub async fn search_boards<T: Transport + ?Sized>(
    transport: &T,
    peer: &Peer,
    limit: usize,
) -> Result<Vec<Board>> {
    search_boards_with(transport, peer, limit, ScanConfig::default()).await
}

/// [`search_boards`] with explicit scan bounds.
pub async fn search_boards_with<T: Transport + ?Sized>(
    transport: &T,
    peer: &Peer,
    limit: usize,
    config: ScanConfig,
) -> Result<Vec<Board>> {
    collect_cards(transport, peer, BOARD_CARD_TAG, limit, config, |message| {
        parse_board_card(&message.text).map(|card| Board::from_message(card, message))
    })
    .await
}

/// Lists the thread cards of one board, in discovery order.
///
/// Only threads whose parent exactly equals `parent_board_id` are returned;
/// substring matches from the keyword search are discarded.
pub async fn search_threads<T: Transport + ?Sized>(
    transport: &T,
    peer: &Peer,
    parent_board_id: &str,
    limit: usize,
) -> Result<Vec<Thread>> {
    search_threads_with(transport, peer, parent_board_id, limit, ScanConfig::default()).await
}

/// [`search_threads`] with explicit scan bounds.
pub async fn search_threads_with<T: Transport + ?Sized>(
    transport: &T,
    peer: &Peer,
    parent_board_id: &str,
    limit: usize,
    config: ScanConfig,
) -> Result<Vec<Thread>> {
    let query = format!("{THREAD_CARD_TAG} {parent_board_id}");
    collect_cards(transport, peer, &query, limit, config, |message| {
        parse_thread_card(&message.text)
            .filter(|card| card.parent_board_id == parent_board_id)
            .map(|card| Thread::from_message(card, message))
    })
    .await
}

/// Lists the post cards of one thread, in discovery order.
pub async fn search_posts<T: Transport + ?Sized>(
    transport: &T,
    peer: &Peer,
    parent_thread_id: &str,
    limit: usize,
) -> Result<Vec<Post>> {
    search_posts_with(transport, peer, parent_thread_id, limit, ScanConfig::default()).await
}

/// [`search_posts`] with explicit scan bounds.
pub async fn search_posts_with<T: Transport + ?Sized>(
    transport: &T,
    peer: &Peer,
    parent_thread_id: &str,
    limit: usize,
    config: ScanConfig,
) -> Result<Vec<Post>> {
    let query = format!("{POST_CARD_TAG} {parent_thread_id}");
    collect_cards(transport, peer, &query, limit, config, |message| {
        parse_post_card(&message.text)
            .filter(|card| card.parent_thread_id == parent_thread_id)
            .map(|card| Post::from_message(card, message))
    })
    .await
}

/// Returns the most recent post in a thread, by card `date`.
///
/// Ties are broken arbitrarily; dates have second resolution and display
/// order tolerates sub-second jitter.
pub async fn last_post_for_thread<T: Transport + ?Sized>(
    transport: &T,
    peer: &Peer,
    thread_id: &str,
) -> Result<Option<Post>> {
    let posts = search_posts(transport, peer, thread_id, DEFAULT_POST_QUERY_LIMIT).await?;
    Ok(posts.into_iter().max_by_key(|post| post.date))
}

/// Returns the most recent post of each listed thread, keyed by thread ID.
///
/// The per-thread lookups are independent round-trips with no shared state
/// beyond the result map, so they are dispatched concurrently: fire all,
/// await all. Threads with no posts (or whose lookup failed) are absent
/// from the map.
pub async fn last_posts_by_thread<T: Transport + ?Sized>(
    transport: &T,
    peer: &Peer,
    thread_ids: &[String],
) -> Result<HashMap<String, Post>> {
    let lookups = thread_ids.iter().map(|thread_id| async move {
        let result = last_post_for_thread(transport, peer, thread_id).await;
        (thread_id.clone(), result)
    });
    let mut by_thread = HashMap::new();
    for (thread_id, result) in join_all(lookups).await {
        match result {
            Ok(Some(post)) => {
                by_thread.insert(thread_id, post);
            }
            Ok(None) => {}
            Err(err) => {
                warn!(thread_id = %thread_id, error = %err, "last-post lookup failed for thread");
            }
        }
    }
    Ok(by_thread)
}

/// Returns the most recent post anywhere in a board, scanning only the
/// newest `thread_scan_cap` threads by creation date.
///
/// The cap bounds total search calls. A board with more threads than the
/// cap may report a stale result when its true most recent post sits in an
/// older, unscanned thread. This is an accepted approximation.
pub async fn last_post_for_board<T: Transport + ?Sized>(
    transport: &T,
    peer: &Peer,
    board_id: &str,
    thread_scan_cap: usize,
) -> Result<Option<Post>> {
    let mut threads =
        search_threads(transport, peer, board_id, DEFAULT_THREAD_QUERY_LIMIT).await?;
    threads.sort_by(|a, b| b.date.cmp(&a.date));
    threads.truncate(thread_scan_cap);

    let thread_ids: Vec<String> = threads.into_iter().map(|thread| thread.id).collect();
    let by_thread = last_posts_by_thread(transport, peer, &thread_ids).await?;
    Ok(by_thread.into_values().max_by_key(|post| post.date))
}
