//! End-to-end tests for the high-level forum client.
//!
//! These drive complete workflows (create, list, edit, delete) through
//! the connection-managed facade against the mock transport.

mod common;

use common::{MockConnector, MockTransport};
use forumgram::{parse_board_card, parse_post_card, ForumClient, ForumError, Peer};

fn peer() -> Peer {
    Peer::channel(99, 1234)
}

fn client(transport: &MockTransport) -> ForumClient<MockConnector> {
    ForumClient::new(MockConnector::new(transport.clone()))
}

// =============================================================================
// Create / List Workflow
// =============================================================================

#[tokio::test]
async fn test_full_hierarchy_workflow() {
    let transport = MockTransport::new();
    let client = client(&transport);

    let board = client
        .create_board(&peer(), "General", "Anything goes")
        .await
        .unwrap();
    let thread = client
        .create_thread(&peer(), &board.id, "First thread")
        .await
        .unwrap();
    let post = client
        .send_post(&peer(), &thread.id, "Hello *world*")
        .await
        .unwrap();

    assert_eq!(thread.parent_board_id, board.id);
    assert_eq!(post.parent_thread_id, thread.id);
    assert_eq!(post.from_user_id, Some(777));

    let boards = client.boards(&peer()).await.unwrap();
    assert_eq!(boards.len(), 1);
    assert_eq!(boards[0], board);

    let threads = client.threads(&peer(), &board.id).await.unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].title, "First thread");

    let page = client.posts_page(&peer(), &thread.id, 1).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].content, "Hello *world*");

    // The stored card body holds the escaped form, never the raw content.
    let stored = transport.message_text(post.message_id).unwrap();
    assert!(!stored.contains('*'));
    assert!(stored.contains("\\ast"));
}

#[tokio::test]
async fn test_created_entities_visible_before_indexing() {
    let transport = MockTransport::new();
    transport.set_indexing(false);
    let client = client(&transport);

    let board = client.create_board(&peer(), "Fresh", "").await.unwrap();
    let thread = client
        .create_thread(&peer(), &board.id, "Hi")
        .await
        .unwrap();

    let threads = client.threads(&peer(), &board.id).await.unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].id, thread.id);
    assert_eq!(threads[0].title, "Hi");
}

#[tokio::test]
async fn test_threads_sorted_newest_first() {
    let transport = MockTransport::new();
    let client = client(&transport);
    let board = client.create_board(&peer(), "B", "").await.unwrap();
    for title in ["first", "second", "third"] {
        client.create_thread(&peer(), &board.id, title).await.unwrap();
    }
    let threads = client.threads(&peer(), &board.id).await.unwrap();
    let titles: Vec<&str> = threads.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_invalid_input_rejected_before_any_send() {
    let transport = MockTransport::new();
    let client = client(&transport);
    assert!(matches!(
        client.create_board(&peer(), "  ", "").await,
        Err(ForumError::InvalidInput(_))
    ));
    assert!(matches!(
        client.send_post(&peer(), "t1", "").await,
        Err(ForumError::InvalidInput(_))
    ));
    assert_eq!(transport.message_count(), 0);
}

// =============================================================================
// Edit Lifecycle
// =============================================================================

#[tokio::test]
async fn test_edit_board_replaces_message_and_keeps_id() {
    let transport = MockTransport::new();
    let client = client(&transport);
    let board = client.create_board(&peer(), "Before", "old").await.unwrap();

    let edited = client
        .edit_board(&peer(), &board, "After", "new")
        .await
        .unwrap();

    assert_eq!(edited.id, board.id, "permanent ID survives the edit");
    assert_ne!(edited.message_id, board.message_id, "message reassigned");
    assert!(!transport.contains_message(board.message_id), "old retired");

    let card = parse_board_card(&transport.message_text(edited.message_id).unwrap()).unwrap();
    assert_eq!(card.id, board.id);
    assert_eq!(card.title, "After");

    // Exactly one live card encodes the board.
    let boards = client.boards(&peer()).await.unwrap();
    assert_eq!(boards.len(), 1);
    assert_eq!(boards[0].title, "After");
}

#[tokio::test]
async fn test_edit_thread_replaces_message_and_keeps_id() {
    let transport = MockTransport::new();
    let client = client(&transport);
    let board = client.create_board(&peer(), "B", "").await.unwrap();
    let thread = client
        .create_thread(&peer(), &board.id, "Draft title")
        .await
        .unwrap();

    let edited = client
        .edit_thread(&peer(), &thread, "Final title")
        .await
        .unwrap();
    assert_eq!(edited.id, thread.id);
    assert_ne!(edited.message_id, thread.message_id);

    let threads = client.threads(&peer(), &board.id).await.unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].title, "Final title");
}

#[tokio::test]
async fn test_edit_post_in_place() {
    let transport = MockTransport::new();
    let client = client(&transport);
    let post = client.send_post(&peer(), "t1", "tpyo").await.unwrap();

    let edited = client.edit_post(&peer(), &post, "typo").await.unwrap();
    assert_eq!(edited.message_id, post.message_id, "same message");
    assert_eq!(edited.id, post.id, "same card ID");

    let card = parse_post_card(&transport.message_text(post.message_id).unwrap()).unwrap();
    assert_eq!(card.id, post.id);
    assert_eq!(card.content, "typo");
}

#[tokio::test]
async fn test_edit_post_after_window_fails_typed_and_leaves_message() {
    let transport = MockTransport::new();
    transport.set_edit_window_secs(600);
    let client = client(&transport);
    let post = client.send_post(&peer(), "t1", "original").await.unwrap();
    transport.advance_time(601);

    let err = client
        .edit_post(&peer(), &post, "too late")
        .await
        .unwrap_err();
    assert!(err.is_edit_window_expired());

    // Not silently converted to delete+recreate: the message still exists
    // with its original content.
    let card = parse_post_card(&transport.message_text(post.message_id).unwrap()).unwrap();
    assert_eq!(card.content, "original");
    assert_eq!(transport.message_count(), 1);
}

// =============================================================================
// Delete Lifecycle
// =============================================================================

#[tokio::test]
async fn test_delete_thread_leaves_zombie_posts() {
    let transport = MockTransport::new();
    let client = client(&transport);
    let board = client.create_board(&peer(), "B", "").await.unwrap();
    let thread = client.create_thread(&peer(), &board.id, "T").await.unwrap();
    let post = client.send_post(&peer(), &thread.id, "still here").await.unwrap();

    client.delete_thread(&peer(), &thread).await.unwrap();

    assert!(transport.contains_message(post.message_id));
    let threads = client.threads(&peer(), &board.id).await.unwrap();
    assert!(threads.is_empty());
    let page = client.posts_page(&peer(), &thread.id, 1).await.unwrap();
    assert_eq!(page.items.len(), 1, "zombie post still renders");
}

#[tokio::test]
async fn test_delete_post_removes_album_siblings() {
    let transport = MockTransport::new();
    let client = client(&transport);

    let sibling_a = transport.insert_media_message("album9");
    let sibling_b = transport.insert_media_message("album9");
    let unrelated = transport.insert_media_message("other");
    let mut post = client.send_post(&peer(), "t1", "with media").await.unwrap();
    post.grouped_id = Some("album9".to_string());

    client.delete_post(&peer(), &post).await.unwrap();

    assert!(!transport.contains_message(post.message_id));
    assert!(!transport.contains_message(sibling_a));
    assert!(!transport.contains_message(sibling_b));
    assert!(transport.contains_message(unrelated));
}

#[tokio::test]
async fn test_delete_post_without_group_touches_one_message() {
    let transport = MockTransport::new();
    let client = client(&transport);
    let keep = client.send_post(&peer(), "t1", "keep me").await.unwrap();
    let gone = client.send_post(&peer(), "t1", "delete me").await.unwrap();

    client.delete_post(&peer(), &gone).await.unwrap();
    assert!(transport.contains_message(keep.message_id));
    assert!(!transport.contains_message(gone.message_id));
}

// =============================================================================
// Failure Semantics
// =============================================================================

#[tokio::test]
async fn test_failed_send_surfaces_as_ambiguous() {
    let transport = MockTransport::new();
    let client = client(&transport);
    transport.fail_next_sends(1);

    let err = client
        .create_board(&peer(), "Board", "")
        .await
        .unwrap_err();
    assert!(matches!(err, ForumError::AmbiguousSend(_)));

    // Not retried: a second explicit call is the caller's decision.
    assert_eq!(transport.message_count(), 0);
    assert!(client.create_board(&peer(), "Board", "").await.is_ok());
}

#[tokio::test]
async fn test_connect_failure_then_recovery() {
    let transport = MockTransport::new();
    let client = ForumClient::new(MockConnector::failing_first(transport.clone(), 1));

    let err = client.boards(&peer()).await.unwrap_err();
    assert!(matches!(err, ForumError::Connection(_)));

    // The connection manager retries on the next call.
    assert!(client.boards(&peer()).await.is_ok());
}
