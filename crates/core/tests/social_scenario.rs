//! End-to-end behaviour of the services over the in-memory store.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use murmur_common::AppError;
use murmur_core::{
    AccountService, Actor, AuthOutcome, AuthenticateInput, CommentInput, CreatePostInput,
    DualWrite, InteractionService, JwtTokenService, SocialGraphService,
};
use murmur_db::{MemoryStore, PostStore, UserStore};

struct Harness {
    store: MemoryStore,
    accounts: AccountService,
    graph: SocialGraphService,
    interactions: InteractionService,
}

impl Harness {
    fn new() -> Self {
        let store = MemoryStore::new();
        let dual_write = DualWrite::new(3, Duration::ZERO, true);
        Self {
            accounts: AccountService::new(
                Arc::new(store.clone()),
                Arc::new(JwtTokenService::new("scenario-secret", 3600)),
            ),
            graph: SocialGraphService::new(Arc::new(store.clone()), dual_write.clone()),
            interactions: InteractionService::new(
                Arc::new(store.clone()),
                Arc::new(store.clone()),
                dual_write,
            ),
            store,
        }
    }

    /// Register, then log in, and return the identity behind the token.
    async fn sign_up(&self, username: &str, email: &str) -> Actor {
        let input = || AuthenticateInput {
            username: username.to_string(),
            email: email.to_string(),
            password: "correct horse".to_string(),
        };

        let registered = self.accounts.register_or_authenticate(input()).await.unwrap();
        assert!(matches!(registered, AuthOutcome::Registered { .. }));

        let AuthOutcome::Authenticated { token, .. } =
            self.accounts.register_or_authenticate(input()).await.unwrap()
        else {
            panic!("second call should authenticate");
        };
        self.accounts.resolve_token(&token).unwrap()
    }
}

#[tokio::test]
async fn test_alice_and_bob() {
    let h = Harness::new();
    let alice = h.sign_up("alice", "a@x.com").await;
    let bob = h.sign_up("bob", "b@x.com").await;

    let post = h
        .interactions
        .create_post(
            &alice,
            CreatePostInput {
                title: "T".to_string(),
                description: "D".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(post.likes.is_empty());
    assert!(post.comments.is_empty());

    h.graph.follow(&bob, &alice.user_id).await.unwrap();
    let alice_doc = UserStore::find_by_id(&h.store, &alice.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        alice_doc.followers.into_iter().collect::<Vec<_>>(),
        vec![bob.user_id.clone()]
    );

    h.interactions.like(&bob, &post.id).await.unwrap();
    let liked = PostStore::find_by_id(&h.store, &post.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        liked.likes.into_iter().collect::<Vec<_>>(),
        vec![bob.user_id.clone()]
    );

    assert!(matches!(
        h.interactions.like(&bob, &post.id).await,
        Err(AppError::AlreadyLiked(_))
    ));

    h.interactions
        .comment(
            &bob,
            &post.id,
            CommentInput {
                text: "hi".to_string(),
            },
        )
        .await
        .unwrap();
    let engagement = h.interactions.get_engagement(&post.id).await.unwrap();
    assert_eq!(engagement.likes, 1);
    assert_eq!(engagement.comments, 1);

    assert!(matches!(
        h.interactions.delete_post(&bob, &post.id).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(h.interactions.get_engagement(&post.id).await.is_ok());
}

#[tokio::test]
async fn test_follow_graph_stays_symmetric() {
    let h = Harness::new();
    let users = [
        h.sign_up("a", "a@x.com").await,
        h.sign_up("b", "b@x.com").await,
        h.sign_up("c", "c@x.com").await,
    ];

    for follower in &users {
        for target in &users {
            if follower == target {
                assert!(matches!(
                    h.graph.follow(follower, &target.user_id).await,
                    Err(AppError::SelfReference(_))
                ));
            } else {
                h.graph.follow(follower, &target.user_id).await.unwrap();
            }
        }
    }
    h.graph.unfollow(&users[0], &users[1].user_id).await.unwrap();

    for x in &users {
        let doc = UserStore::find_by_id(&h.store, &x.user_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!doc.followers.contains(&x.user_id));
        assert!(!doc.following.contains(&x.user_id));

        for followed in &doc.following {
            let other = UserStore::find_by_id(&h.store, followed)
                .await
                .unwrap()
                .unwrap();
            assert!(other.followers.contains(&x.user_id));
        }
    }

    let profile = h.graph.get_profile(&users[1].user_id).await.unwrap();
    assert_eq!(profile.followers_count, 1);
    assert_eq!(profile.following_count, 2);
}

#[tokio::test]
async fn test_concurrent_duplicate_follow() {
    let h = Harness::new();
    let alice = h.sign_up("alice", "a@x.com").await;
    let bob = h.sign_up("bob", "b@x.com").await;

    let (first, second) = futures::join!(
        h.graph.follow(&bob, &alice.user_id),
        h.graph.follow(&bob, &alice.user_id),
    );

    // One request wins; the other reports the existing edge.
    assert!(first.is_ok() ^ second.is_ok());
    for result in [first, second] {
        if let Err(e) = result {
            assert!(matches!(e, AppError::AlreadyFollowing(_)));
        }
    }

    let alice_doc = UserStore::find_by_id(&h.store, &alice.user_id)
        .await
        .unwrap()
        .unwrap();
    let bob_doc = UserStore::find_by_id(&h.store, &bob.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(alice_doc.followers.len(), 1);
    assert_eq!(bob_doc.following.len(), 1);
}

#[tokio::test]
async fn test_concurrent_duplicate_like() {
    let h = Harness::new();
    let alice = h.sign_up("alice", "a@x.com").await;
    let bob = h.sign_up("bob", "b@x.com").await;
    let post = h
        .interactions
        .create_post(
            &alice,
            CreatePostInput {
                title: "T".to_string(),
                description: "D".to_string(),
            },
        )
        .await
        .unwrap();

    let results = futures::future::join_all(
        (0..8).map(|_| h.interactions.like(&bob, &post.id)),
    )
    .await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(h.interactions.get_engagement(&post.id).await.unwrap().likes, 1);
}
