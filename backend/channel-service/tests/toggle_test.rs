//! Integration Tests: like and subscription toggling
//!
//! Coverage:
//! - Toggle twice returns to the pre-toggle state for every relation kind
//! - Create / remove / recreate with a fresh id
//! - Concurrent toggles on one key never leave two relations
//! - Missing targets and anonymous callers

mod common;

use channel_service::domain::{Comment, LikeKey, LikeTarget, SubscriptionKey, Tweet};
use channel_service::middleware::Principal;
use channel_service::repository::RelationRepository;
use channel_service::services::Toggled;
use channel_service::AppError;
use common::fixtures::{seed_user, seed_video};
use common::TestContext;
use futures::future::join_all;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn test_video_like_create_remove_recreate() {
    let ctx = TestContext::new();
    let owner = seed_user(&ctx.repos, "owner").await;
    let fan = seed_user(&ctx.repos, "fan").await;
    let video = seed_video(&ctx.repos, owner.id, "Intro").await;
    let principal = Principal::user(fan.id);
    let key = LikeKey {
        liked_by: fan.id,
        target: LikeTarget::Video(video.id),
    };

    let first = ctx
        .services
        .likes
        .toggle_video_like(principal, video.id)
        .await
        .unwrap();
    assert!(first.is_created());
    let stored = ctx.repos.likes.find_by_key(&key).await.unwrap().unwrap();
    assert_eq!(stored.id, first.relation().id);

    let second = ctx
        .services
        .likes
        .toggle_video_like(principal, video.id)
        .await
        .unwrap();
    assert!(matches!(&second, Toggled::Removed(like) if like.id == first.relation().id));
    assert!(ctx.repos.likes.find_by_key(&key).await.unwrap().is_none());

    let third = ctx
        .services
        .likes
        .toggle_video_like(principal, video.id)
        .await
        .unwrap();
    assert!(third.is_created());
    assert_ne!(third.relation().id, first.relation().id);
}

#[tokio::test]
async fn test_comment_and_tweet_likes_toggle_back() {
    let ctx = TestContext::new();
    let owner = seed_user(&ctx.repos, "owner").await;
    let fan = seed_user(&ctx.repos, "fan").await;
    let video = seed_video(&ctx.repos, owner.id, "Intro").await;
    let comment = ctx
        .repos
        .comments
        .insert(Comment::new(video.id, owner.id, "first!"))
        .await
        .unwrap();
    let tweet = ctx
        .repos
        .tweets
        .insert(Tweet::new(owner.id, "new upload"))
        .await
        .unwrap();
    let principal = Principal::user(fan.id);

    for _ in 0..2 {
        ctx.services
            .likes
            .toggle_comment_like(principal, comment.id)
            .await
            .unwrap();
        ctx.services
            .likes
            .toggle_tweet_like(principal, tweet.id)
            .await
            .unwrap();
    }

    let comment_key = LikeKey {
        liked_by: fan.id,
        target: LikeTarget::Comment(comment.id),
    };
    let tweet_key = LikeKey {
        liked_by: fan.id,
        target: LikeTarget::Tweet(tweet.id),
    };
    assert!(ctx.repos.likes.find_by_key(&comment_key).await.unwrap().is_none());
    assert!(ctx.repos.likes.find_by_key(&tweet_key).await.unwrap().is_none());
}

#[tokio::test]
async fn test_like_targets_must_exist() {
    let ctx = TestContext::new();
    let fan = seed_user(&ctx.repos, "fan").await;
    let principal = Principal::user(fan.id);

    let err = ctx
        .services
        .likes
        .toggle_comment_like(principal, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = ctx
        .services
        .likes
        .toggle_tweet_like(principal, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_anonymous_cannot_toggle() {
    let ctx = TestContext::new();
    let owner = seed_user(&ctx.repos, "owner").await;
    let video = seed_video(&ctx.repos, owner.id, "Intro").await;

    let err = ctx
        .services
        .likes
        .toggle_video_like(Principal::anonymous(), video.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = ctx
        .services
        .subscriptions
        .toggle(Principal::anonymous(), owner.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_concurrent_toggles_leave_at_most_one_like() {
    let ctx = TestContext::new();
    let owner = seed_user(&ctx.repos, "owner").await;
    let fan = seed_user(&ctx.repos, "fan").await;
    let video = seed_video(&ctx.repos, owner.id, "Intro").await;
    let likes = Arc::clone(&ctx.services.likes);
    let (fan_id, video_id) = (fan.id, video.id);

    let tasks = (0..9).map(|_| {
        let likes = Arc::clone(&likes);
        tokio::spawn(async move {
            likes
                .toggle_video_like(Principal::user(fan_id), video_id)
                .await
        })
    });
    let results = join_all(tasks).await;

    let created = results
        .into_iter()
        .map(|r| r.expect("toggle task panicked").expect("toggle failed"))
        .filter(Toggled::is_created)
        .count();
    // Nine serialized toggles: five creates, four removes
    assert_eq!(created, 5);

    let liked = ctx
        .services
        .likes
        .liked_videos(Principal::user(fan.id))
        .await
        .unwrap();
    assert_eq!(liked.len(), 1);
}

#[tokio::test]
async fn test_subscription_toggle_and_listing() {
    let ctx = TestContext::new();
    let channel = seed_user(&ctx.repos, "channel").await;
    let viewer = seed_user(&ctx.repos, "viewer").await;
    let principal = Principal::user(viewer.id);

    let created = ctx
        .services
        .subscriptions
        .toggle(principal, channel.id)
        .await
        .unwrap();
    assert!(created.is_created());

    let subscribers = ctx
        .services
        .subscriptions
        .channel_subscribers(channel.id)
        .await
        .unwrap();
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].subscriber.id, viewer.id);

    let channels = ctx
        .services
        .subscriptions
        .subscribed_channels(viewer.id)
        .await
        .unwrap();
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].channel.username, "channel");

    let removed = ctx
        .services
        .subscriptions
        .toggle(principal, channel.id)
        .await
        .unwrap();
    assert!(!removed.is_created());

    let key = SubscriptionKey {
        subscriber: viewer.id,
        channel: channel.id,
    };
    assert!(ctx
        .repos
        .subscriptions
        .find_by_key(&key)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_self_subscription_is_rejected() {
    let ctx = TestContext::new();
    let user = seed_user(&ctx.repos, "solo").await;

    let err = ctx
        .services
        .subscriptions
        .toggle(Principal::user(user.id), user.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let subscribers = ctx
        .services
        .subscriptions
        .channel_subscribers(user.id)
        .await
        .unwrap();
    assert!(subscribers.is_empty());
}

#[tokio::test]
async fn test_subscribing_to_unknown_channel() {
    let ctx = TestContext::new();
    let viewer = seed_user(&ctx.repos, "viewer").await;

    let err = ctx
        .services
        .subscriptions
        .toggle(Principal::user(viewer.id), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
