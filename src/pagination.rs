//! Stable page boundaries over a newest-anchored message stream.
//!
//! The transport offers only two addressing primitives: "count matching
//! messages" and "fetch K matches starting `add_offset` messages from the
//! newest end". There is no native "page P of size S" and no stable
//! forward-from-oldest cursor, so oldest-first page numbers have to be
//! translated into distances from the newest end on every fetch.
//!
//! Page 1 is the *oldest* `page_size` posts; the final page is the newest
//! and may be shorter. The offset math accounts for that shorter tail
//! exactly: measured from the newest end, page `p` of `n` starts
//! `total_count - p * page_size` in (clamped at zero for the final page).
//! Getting this wrong by one silently drops or duplicates the boundary
//! item between adjacent pages.
//!
//! `total_count` comes from the search index's count metadata, which
//! counts keyword substring matches, an upper bound callers must
//! tolerate. A failed count degrades to a single empty page; pagination
//! never propagates an error into the listing and never produces a zero
//! or negative page count.

use tracing::warn;

use crate::cards::parse_post_card;
use crate::constants::POST_CARD_TAG;
use crate::error::{ForumError, Result};
use crate::transport::{count_matching, Peer, Transport};
use crate::types::Post;

/// One page of a thread's posts plus the navigation totals the UI derives
/// first/prev/next/last from.
#[derive(Debug, Clone, PartialEq)]
pub struct PostPage {
    /// Posts on this page, ascending by `date`.
    pub items: Vec<Post>,
    /// Matching-message count from the search index; may overestimate.
    pub total_count: usize,
    /// Always at least 1, even for an empty thread.
    pub total_pages: usize,
    /// The page actually served, after clamping the request into
    /// `[1, total_pages]`. Deep links to out-of-range pages land here.
    pub page_number: usize,
}

impl PostPage {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            total_pages: 1,
            page_number: 1,
        }
    }
}

/// Fetches one page of a thread's posts, oldest-first page numbering.
pub async fn fetch_page<T: Transport + ?Sized>(
    transport: &T,
    peer: &Peer,
    parent_thread_id: &str,
    page_number: usize,
    page_size: usize,
) -> Result<PostPage> {
    if page_size == 0 {
        return Err(ForumError::invalid_input("page_size must be at least 1"));
    }

    let query = format!("{POST_CARD_TAG} {parent_thread_id}");
    let total_count = match count_matching(transport, peer, &query).await {
        Ok(count) => count,
        Err(err) => {
            warn!(%query, error = %err, "count query failed, serving a single empty page");
            return Ok(PostPage::empty());
        }
    };
    if total_count == 0 {
        return Ok(PostPage::empty());
    }

    let total_pages = (total_count + page_size - 1) / page_size;
    let page_number = page_number.clamp(1, total_pages);

    // Distance of this page's newest item from the newest end, and the
    // page's exact length (the final page carries the shorter tail).
    let add_offset = total_count.saturating_sub(page_number * page_size);
    let fetch_limit = page_size.min(total_count - (page_number - 1) * page_size);

    let page = match transport
        .search_messages(peer, &query, fetch_limit, add_offset)
        .await
    {
        Ok(page) => page,
        Err(err) => {
            warn!(%query, error = %err, "page fetch failed, serving empty items");
            return Ok(PostPage {
                items: Vec::new(),
                total_count,
                total_pages,
                page_number,
            });
        }
    };

    let mut items: Vec<Post> = page
        .messages
        .iter()
        .filter_map(|message| {
            parse_post_card(&message.text)
                .filter(|card| card.parent_thread_id == parent_thread_id)
                .map(|card| Post::from_message(card, message))
        })
        .collect();
    // The transport does not guarantee intra-page order.
    items.sort_by_key(|post| post.date);

    Ok(PostPage {
        items,
        total_count,
        total_pages,
        page_number,
    })
}
