//! Integration Tests: channel dashboard aggregates

mod common;

use channel_service::domain::{ChannelStats, Video};
use channel_service::middleware::Principal;
use common::fixtures::{seed_user, seed_video};
use common::TestContext;

#[tokio::test]
async fn test_empty_channel_has_zero_stats() {
    let ctx = TestContext::new();
    let user = seed_user(&ctx.repos, "newcomer").await;

    let stats = ctx
        .services
        .dashboard
        .channel_stats(Principal::user(user.id))
        .await
        .unwrap();
    assert_eq!(stats, ChannelStats::default());

    let json = serde_json::to_value(stats).unwrap();
    assert_eq!(json["totalVideos"], 0);
    assert_eq!(json["totalViews"], 0);
}

#[tokio::test]
async fn test_stats_count_videos_views_subscribers_and_likes() {
    let ctx = TestContext::new();
    let creator = seed_user(&ctx.repos, "creator").await;
    let fan = seed_user(&ctx.repos, "fan").await;
    let other = seed_user(&ctx.repos, "other").await;

    let first = seed_video(&ctx.repos, creator.id, "First").await;
    let second = seed_video(&ctx.repos, creator.id, "Second").await;
    for (video, views) in [(&first, 10), (&second, 5)] {
        let watched = Video {
            views,
            ..video.clone()
        };
        ctx.repos.videos.update(&watched).await.unwrap();
    }
    // Someone else's video does not count
    let foreign = seed_video(&ctx.repos, other.id, "Foreign").await;

    let fan_p = Principal::user(fan.id);
    ctx.services.subscriptions.toggle(fan_p, creator.id).await.unwrap();
    ctx.services.subscriptions.toggle(Principal::user(other.id), creator.id).await.unwrap();

    ctx.services.likes.toggle_video_like(fan_p, first.id).await.unwrap();
    ctx.services.likes.toggle_video_like(fan_p, foreign.id).await.unwrap();
    let tweet = ctx
        .services
        .tweets
        .create(Principal::user(creator.id), "behind the scenes")
        .await
        .unwrap();
    ctx.services.likes.toggle_tweet_like(fan_p, tweet.id).await.unwrap();
    let comment = ctx
        .services
        .comments
        .add(Principal::user(creator.id), foreign.id, "great work")
        .await
        .unwrap();
    ctx.services.likes.toggle_comment_like(fan_p, comment.id).await.unwrap();

    let stats = ctx
        .services
        .dashboard
        .channel_stats(Principal::user(creator.id))
        .await
        .unwrap();
    assert_eq!(
        stats,
        ChannelStats {
            total_videos: 2,
            total_views: 15,
            total_subscribers: 2,
            total_likes: 3,
        }
    );
}

#[tokio::test]
async fn test_channel_videos_are_the_callers_own() {
    let ctx = TestContext::new();
    let creator = seed_user(&ctx.repos, "creator").await;
    let other = seed_user(&ctx.repos, "other").await;
    seed_video(&ctx.repos, creator.id, "Mine").await;
    seed_video(&ctx.repos, other.id, "Theirs").await;

    let videos = ctx
        .services
        .dashboard
        .channel_videos(Principal::user(creator.id))
        .await
        .unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].title, "Mine");
    assert_eq!(videos[0].owner, creator.id);
}
