//! Feed and social-interaction tests against the mock backend
//!
//! Run with: cargo test -p integration-tests --test feed_tests

use std::time::Duration;

use integration_tests::{comment_model, post_model, tally, MockBackend, TestServer};
use market_common::FailurePolicy;
use market_core::{Id, MutationKind, ReactionSymbol, StoreEvent};
use market_feed::{LoadOutcome, MutationOutcome};

fn posts(n: i64) -> Vec<market_api::models::PostModel> {
    (1..=n).map(post_model).collect()
}

// ============================================================================
// Feed Loading
// ============================================================================

#[tokio::test]
async fn test_feed_pagination() {
    let server = TestServer::start_with(MockBackend::new().with_posts(posts(5)))
        .await
        .unwrap();
    let client = server.client_with(2, FailurePolicy::Revert).unwrap();

    assert_eq!(client.feed().refresh().await.unwrap(), LoadOutcome::Loaded(2));
    assert_eq!(client.feed().load_more().await.unwrap(), LoadOutcome::Loaded(2));
    assert_eq!(client.feed().load_more().await.unwrap(), LoadOutcome::Loaded(1));
    assert_eq!(client.feed().load_more().await.unwrap(), LoadOutcome::Exhausted);

    let ids: Vec<i64> = client.feed().posts().iter().map(|p| p.id.into_inner()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(server.backend.count_requests("GET /api/posts/feed"), 3);
}

#[tokio::test]
async fn test_unauthorized_clears_token() {
    let server = TestServer::start_with(MockBackend::new().with_posts(posts(1)))
        .await
        .unwrap();
    let client = server.client().unwrap();
    server.backend.reject_credentials(true);

    let err = client.feed().refresh().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(!client.tokens().is_present());

    // no token left: the next call fails before reaching the server
    server.backend.reject_credentials(false);
    let err = client.feed().refresh().await.unwrap_err();
    assert_eq!(err.error_code(), "MISSING_SESSION");
    assert!(server.backend.requests().is_empty());
}

// ============================================================================
// Likes
// ============================================================================

#[tokio::test]
async fn test_like_is_optimistic_and_confirmed() {
    let mut seed = post_model(1);
    seed.likes_count = 4;
    let backend = MockBackend::new().with_posts(vec![seed]);
    backend.delay_mutations(Duration::from_millis(100));
    let server = TestServer::start_with(backend).await.unwrap();
    let client = server.client().unwrap();
    client.feed().refresh().await.unwrap();

    let handle = client.social().toggle_like(Id::new(1)).unwrap();
    // visible before the server answers
    let local = client.feed().post(Id::new(1)).unwrap();
    assert_eq!((local.likes_count, local.is_liked), (5, true));

    assert_eq!(handle.outcome().await.unwrap(), MutationOutcome::Confirmed);
    let remote = server.backend.post(1).unwrap();
    assert_eq!((remote.likes_count, remote.is_liked), (5, true));
    assert!(client.context().pending().is_empty());
}

#[tokio::test]
async fn test_like_twice_restores_original() {
    let mut seed = post_model(1);
    seed.likes_count = 4;
    let server = TestServer::start_with(MockBackend::new().with_posts(vec![seed]))
        .await
        .unwrap();
    let client = server.client().unwrap();
    client.feed().refresh().await.unwrap();

    let first = client.social().toggle_like(Id::new(1)).unwrap();
    let second = client.social().toggle_like(Id::new(1)).unwrap();
    assert!(first.outcome().await.unwrap().is_confirmed());
    assert!(second.outcome().await.unwrap().is_confirmed());

    let local = client.feed().post(Id::new(1)).unwrap();
    assert_eq!((local.likes_count, local.is_liked), (4, false));
    let remote = server.backend.post(1).unwrap();
    assert_eq!((remote.likes_count, remote.is_liked), (4, false));
}

#[tokio::test]
async fn test_failed_like_reverts_with_toast() {
    let mut seed = post_model(1);
    seed.likes_count = 4;
    let server = TestServer::start_with(MockBackend::new().with_posts(vec![seed]))
        .await
        .unwrap();
    let client = server.client().unwrap();
    client.feed().refresh().await.unwrap();
    let mut events = client.events();
    server.backend.fail_mutations(true);

    let outcome = client
        .social()
        .toggle_like(Id::new(1))
        .unwrap()
        .outcome()
        .await
        .unwrap();
    assert!(matches!(outcome, MutationOutcome::Reverted { .. }));

    let local = client.feed().post(Id::new(1)).unwrap();
    assert_eq!((local.likes_count, local.is_liked), (4, false));

    let mut saw_toast = false;
    while let Ok(event) = events.try_recv() {
        if let StoreEvent::MutationReverted { post_id, kind, .. } = event {
            assert_eq!(post_id, Id::new(1));
            assert_eq!(kind, MutationKind::PostLike);
            saw_toast = true;
        }
    }
    assert!(saw_toast);
}

#[tokio::test]
async fn test_failed_like_kept_under_keep_policy() {
    let server = TestServer::start_with(MockBackend::new().with_posts(posts(1)))
        .await
        .unwrap();
    let client = server.client_with(20, FailurePolicy::Keep).unwrap();
    client.feed().refresh().await.unwrap();
    server.backend.fail_mutations(true);

    let outcome = client
        .social()
        .toggle_like(Id::new(1))
        .unwrap()
        .outcome()
        .await
        .unwrap();
    assert!(matches!(outcome, MutationOutcome::Kept { .. }));
    let local = client.feed().post(Id::new(1)).unwrap();
    assert_eq!((local.likes_count, local.is_liked), (1, true));
}

// ============================================================================
// Reactions
// ============================================================================

#[tokio::test]
async fn test_reaction_replace_matches_server() {
    let mut seed = post_model(1);
    seed.reactions = vec![tally("👍", 2)];
    let server = TestServer::start_with(MockBackend::new().with_posts(vec![seed]))
        .await
        .unwrap();
    let client = server.client().unwrap();
    client.feed().refresh().await.unwrap();

    let heart = client.social().set_reaction(Id::new(1), ReactionSymbol::Heart).unwrap();
    let local = client.feed().post(Id::new(1)).unwrap();
    assert_eq!(local.my_reaction, Some(ReactionSymbol::Heart));
    assert_eq!(local.reactions.count_of(ReactionSymbol::ThumbsUp), 2);
    assert_eq!(local.reactions.count_of(ReactionSymbol::Heart), 1);
    assert!(heart.outcome().await.unwrap().is_confirmed());

    let thumbs = client
        .social()
        .set_reaction(Id::new(1), ReactionSymbol::ThumbsUp)
        .unwrap();
    assert!(thumbs.outcome().await.unwrap().is_confirmed());

    let local = client.feed().post(Id::new(1)).unwrap();
    assert_eq!(local.my_reaction, Some(ReactionSymbol::ThumbsUp));
    assert_eq!(local.reactions.count_of(ReactionSymbol::ThumbsUp), 3);
    assert_eq!(local.reactions.count_of(ReactionSymbol::Heart), 0);

    // a fresh page agrees with the local state
    client.feed().refresh().await.unwrap();
    let reloaded = client.feed().post(Id::new(1)).unwrap();
    assert_eq!(reloaded.my_reaction, local.my_reaction);
    assert_eq!(reloaded.reactions.count_of(ReactionSymbol::ThumbsUp), 3);
    assert_eq!(reloaded.reactions.count_of(ReactionSymbol::Heart), 0);
}

#[tokio::test]
async fn test_same_reaction_twice_removes() {
    let server = TestServer::start_with(MockBackend::new().with_posts(posts(1)))
        .await
        .unwrap();
    let client = server.client().unwrap();
    client.feed().refresh().await.unwrap();

    for _ in 0..2 {
        let handle = client.social().set_reaction(Id::new(1), ReactionSymbol::Laugh).unwrap();
        assert!(handle.outcome().await.unwrap().is_confirmed());
    }

    let local = client.feed().post(Id::new(1)).unwrap();
    assert_eq!(local.my_reaction, None);
    assert_eq!(local.reactions.count_of(ReactionSymbol::Laugh), 0);
    assert_eq!(server.backend.post(1).unwrap().my_reaction, None);
}

// ============================================================================
// Comments
// ============================================================================

#[tokio::test]
async fn test_submit_comment() {
    let server = TestServer::start_with(MockBackend::new().with_posts(posts(1)))
        .await
        .unwrap();
    let client = server.client().unwrap();
    client.feed().refresh().await.unwrap();

    let mut draft = "   ".to_string();
    assert!(client.social().submit_comment(Id::new(1), &mut draft).await.unwrap().is_none());
    assert_eq!(server.backend.count_requests("POST /api/posts/comment"), 0);

    let mut draft = "  Happy to help with this  ".to_string();
    let comment = client
        .social()
        .submit_comment(Id::new(1), &mut draft)
        .await
        .unwrap()
        .unwrap();
    assert!(draft.is_empty());
    assert_eq!(comment.content, "Happy to help with this");

    let local = client.feed().post(Id::new(1)).unwrap();
    assert_eq!(local.comment_count(), 1);
    assert_eq!(server.backend.post(1).unwrap().comments.len(), 1);
}

#[tokio::test]
async fn test_failed_comment_keeps_draft() {
    let server = TestServer::start_with(MockBackend::new().with_posts(posts(1)))
        .await
        .unwrap();
    let client = server.client().unwrap();
    client.feed().refresh().await.unwrap();
    let mut events = client.events();
    server.backend.fail_mutations(true);

    let mut draft = "Interested".to_string();
    let err = client
        .social()
        .submit_comment(Id::new(1), &mut draft)
        .await
        .unwrap_err();
    assert!(err.is_remote());
    assert_eq!(draft, "Interested");
    assert_eq!(client.feed().post(Id::new(1)).unwrap().comment_count(), 0);
    assert!(matches!(
        events.try_recv(),
        Ok(StoreEvent::CommentFailed { post_id, .. }) if post_id == Id::new(1)
    ));
}

#[tokio::test]
async fn test_comment_like_on_active_post() {
    let mut seed = post_model(1);
    seed.comments = vec![comment_model(10, 1)];
    let server = TestServer::start_with(MockBackend::new().with_posts(vec![seed]))
        .await
        .unwrap();
    let client = server.client().unwrap();
    client.feed().refresh().await.unwrap();

    assert!(client.social().toggle_comment_like(Id::new(10)).is_err());

    client.social().open_comments(Id::new(1)).unwrap();
    let handle = client.social().toggle_comment_like(Id::new(10)).unwrap();
    assert!(handle.outcome().await.unwrap().is_confirmed());

    let comment = client.feed().post(Id::new(1)).unwrap().comment(Id::new(10)).cloned().unwrap();
    assert_eq!((comment.likes_count, comment.is_liked), (1, true));
    assert_eq!(server.backend.count_requests("POST /api/comments/10/like"), 1);
}
