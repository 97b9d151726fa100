//! In-memory mock transport shared by the integration suites.
//!
//! Models the behaviors the protocol has to survive: an asynchronously
//! built search index that can lag behind sends, keyword search that
//! matches substrings (so parent IDs collide as prefixes), unordered
//! newest-anchored result pages, an edit-time window, and individually
//! failing requests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use forumgram::{Connect, ForumError, MediaRef, Message, Peer, Result, SearchPage, Transport};

const BASE_EPOCH: i64 = 1_700_000_000;

struct State {
    messages: Vec<Message>,
    indexed: HashSet<i64>,
    indexing_enabled: bool,
    next_id: i64,
    now: i64,
    edit_window_secs: i64,
    sender_user_id: Option<i64>,
    fail_sends: usize,
    fail_searches: usize,
    fail_history: usize,
    search_calls: usize,
    history_calls: usize,
}

/// Clonable handle over shared mock state; the test keeps one clone for
/// control and inspection while the client connects through another.
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                messages: Vec::new(),
                indexed: HashSet::new(),
                indexing_enabled: true,
                next_id: 1,
                now: BASE_EPOCH,
                edit_window_secs: i64::MAX,
                sender_user_id: Some(777),
                fail_sends: 0,
                fail_searches: 0,
                fail_history: 0,
                search_calls: 0,
                history_calls: 0,
            })),
        }
    }

    // -------------------------------------------------------------------------
    // Test controls
    // -------------------------------------------------------------------------

    /// When disabled, newly stored messages stay out of the search index
    /// (visible only to history) until `index_all` runs.
    pub fn set_indexing(&self, enabled: bool) {
        self.state.lock().unwrap().indexing_enabled = enabled;
    }

    /// Adds every stored message to the search index.
    pub fn index_all(&self) {
        let mut state = self.state.lock().unwrap();
        let ids: Vec<i64> = state.messages.iter().map(|m| m.id).collect();
        state.indexed.extend(ids);
    }

    pub fn set_edit_window_secs(&self, secs: i64) {
        self.state.lock().unwrap().edit_window_secs = secs;
    }

    pub fn advance_time(&self, secs: i64) {
        self.state.lock().unwrap().now += secs;
    }

    pub fn fail_next_sends(&self, count: usize) {
        self.state.lock().unwrap().fail_sends = count;
    }

    pub fn fail_next_searches(&self, count: usize) {
        self.state.lock().unwrap().fail_searches = count;
    }

    pub fn fail_next_history(&self, count: usize) {
        self.state.lock().unwrap().fail_history = count;
    }

    /// Stores a plain chat message directly (noise traffic).
    pub fn insert_chat_message(&self, text: &str) -> i64 {
        self.store(text.to_string(), None, None)
    }

    /// Stores a media message belonging to an album group.
    pub fn insert_media_message(&self, grouped_id: &str) -> i64 {
        self.store(
            String::new(),
            Some(MediaRef(serde_json::json!({"kind": "photo"}))),
            Some(grouped_id.to_string()),
        )
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    pub fn contains_message(&self, message_id: i64) -> bool {
        self.state
            .lock()
            .unwrap()
            .messages
            .iter()
            .any(|m| m.id == message_id)
    }

    pub fn message_text(&self, message_id: i64) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .messages
            .iter()
            .find(|m| m.id == message_id)
            .map(|m| m.text.clone())
    }

    pub fn message_count(&self) -> usize {
        self.state.lock().unwrap().messages.len()
    }

    pub fn search_calls(&self) -> usize {
        self.state.lock().unwrap().search_calls
    }

    pub fn history_calls(&self) -> usize {
        self.state.lock().unwrap().history_calls
    }

    fn store(&self, text: String, media: Option<MediaRef>, grouped_id: Option<String>) -> i64 {
        let mut state = self.state.lock().unwrap();
        state.now += 1;
        let id = state.next_id;
        state.next_id += 1;
        let message = Message {
            id,
            text,
            from_user_id: state.sender_user_id,
            date: state.now,
            media,
            grouped_id,
        };
        state.messages.push(message);
        if state.indexing_enabled {
            state.indexed.insert(id);
        }
        id
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_plain_message(&self, _peer: &Peer, text: &str) -> Result<Message> {
        {
            let mut state = self.state.lock().unwrap();
            if state.fail_sends > 0 {
                state.fail_sends -= 1;
                return Err(ForumError::transport("simulated send failure"));
            }
        }
        let id = self.store(text.to_string(), None, None);
        let state = self.state.lock().unwrap();
        Ok(state
            .messages
            .iter()
            .find(|m| m.id == id)
            .expect("just stored")
            .clone())
    }

    async fn edit_message_text(&self, _peer: &Peer, message_id: i64, new_text: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let now = state.now;
        let window = state.edit_window_secs;
        let message = state
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| ForumError::transport("no such message"))?;
        if now - message.date > window {
            return Err(ForumError::EditWindowExpired);
        }
        message.text = new_text.to_string();
        Ok(())
    }

    async fn delete_messages(&self, _peer: &Peer, message_ids: &[i64]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.messages.retain(|m| !message_ids.contains(&m.id));
        for id in message_ids {
            state.indexed.remove(id);
        }
        Ok(())
    }

    async fn search_messages(
        &self,
        _peer: &Peer,
        query: &str,
        limit: usize,
        add_offset: usize,
    ) -> Result<SearchPage> {
        let mut state = self.state.lock().unwrap();
        state.search_calls += 1;
        if state.fail_searches > 0 {
            state.fail_searches -= 1;
            return Err(ForumError::transport("simulated search failure"));
        }
        // Keyword search: every term must occur as a substring, exactly the
        // false-positive-prone behavior real servers exhibit.
        let terms: Vec<&str> = query.split_whitespace().collect();
        let mut matching: Vec<Message> = state
            .messages
            .iter()
            .filter(|m| state.indexed.contains(&m.id))
            .filter(|m| terms.iter().all(|term| m.text.contains(term)))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.id.cmp(&a.id));
        let approx_count = matching.len();
        let messages = matching
            .into_iter()
            .skip(add_offset)
            .take(limit)
            .collect();
        Ok(SearchPage {
            messages,
            approx_count,
        })
    }

    async fn fetch_history(
        &self,
        _peer: &Peer,
        anchor_message_id: i64,
        page_size: usize,
    ) -> Result<Vec<Message>> {
        let mut state = self.state.lock().unwrap();
        state.history_calls += 1;
        if state.fail_history > 0 {
            state.fail_history -= 1;
            return Err(ForumError::transport("simulated history failure"));
        }
        // History sees everything, indexed or not.
        let mut page: Vec<Message> = state
            .messages
            .iter()
            .filter(|m| anchor_message_id == 0 || m.id < anchor_message_id)
            .cloned()
            .collect();
        page.sort_by(|a, b| b.id.cmp(&a.id));
        page.truncate(page_size);
        Ok(page)
    }
}

/// Connector handing the client a clone of the shared mock.
pub struct MockConnector {
    transport: MockTransport,
    fail_connects: Mutex<usize>,
}

impl MockConnector {
    pub fn new(transport: MockTransport) -> Self {
        Self {
            transport,
            fail_connects: Mutex::new(0),
        }
    }

    pub fn failing_first(transport: MockTransport, count: usize) -> Self {
        Self {
            transport,
            fail_connects: Mutex::new(count),
        }
    }
}

#[async_trait]
impl Connect for MockConnector {
    type Transport = MockTransport;

    async fn connect(&self) -> Result<MockTransport> {
        let mut remaining = self.fail_connects.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(ForumError::connection("simulated connect failure"));
        }
        Ok(self.transport.clone())
    }
}
