//! Integration Tests: playlist membership and views

mod common;

use channel_service::middleware::Principal;
use async_trait::async_trait;
use channel_service::domain::Playlist;
use channel_service::repository::{Membership, PlaylistRepository, StoreResult};
use channel_service::AppError;
use common::fixtures::{seed_user, seed_video};
use common::TestContext;
use std::sync::Arc;
use uuid::Uuid;

/// Deletes the playlist right before appending, as a concurrent delete would
struct VanishingPlaylists(Arc<dyn PlaylistRepository>);

#[async_trait]
impl PlaylistRepository for VanishingPlaylists {
    async fn insert(&self, playlist: Playlist) -> StoreResult<Playlist> {
        self.0.insert(playlist).await
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Playlist>> {
        self.0.find_by_id(id).await
    }

    async fn list_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Playlist>> {
        self.0.list_by_owner(owner).await
    }

    async fn update(&self, playlist: &Playlist) -> StoreResult<bool> {
        self.0.update(playlist).await
    }

    async fn add_video(&self, playlist: Uuid, video: Uuid) -> StoreResult<Membership> {
        self.0.delete(playlist).await?;
        self.0.add_video(playlist, video).await
    }

    async fn remove_video(&self, playlist: Uuid, video: Uuid) -> StoreResult<Option<Playlist>> {
        self.0.remove_video(playlist, video).await
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        self.0.delete(id).await
    }
}

#[tokio::test]
async fn test_add_existing_member_is_rejected_without_duplicate() {
    let ctx = TestContext::new();
    let owner = seed_user(&ctx.repos, "curator").await;
    let video = seed_video(&ctx.repos, owner.id, "Clip").await;
    let me = Principal::user(owner.id);

    let playlist = ctx.services.playlists.create(me, "Best of", "Highlights").await.unwrap();
    let added = ctx
        .services
        .playlists
        .add_video(me, video.id, playlist.id)
        .await
        .unwrap();
    assert_eq!(added.videos, vec![video.id]);

    let err = ctx
        .services
        .playlists
        .add_video(me, video.id, playlist.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let stored = ctx.repos.playlists.find_by_id(playlist.id).await.unwrap().unwrap();
    assert_eq!(stored.videos, vec![video.id]);
}

#[tokio::test]
async fn test_remove_keeps_order_and_ignores_non_members() {
    let ctx = TestContext::new();
    let owner = seed_user(&ctx.repos, "curator").await;
    let a = seed_video(&ctx.repos, owner.id, "A").await;
    let b = seed_video(&ctx.repos, owner.id, "B").await;
    let c = seed_video(&ctx.repos, owner.id, "C").await;
    let outsider = seed_video(&ctx.repos, owner.id, "Outsider").await;
    let me = Principal::user(owner.id);

    let playlist = ctx.services.playlists.create(me, "Ordered", "A then B then C").await.unwrap();
    for video in [&a, &b, &c] {
        ctx.services
            .playlists
            .add_video(me, video.id, playlist.id)
            .await
            .unwrap();
    }

    let unchanged = ctx
        .services
        .playlists
        .remove_video(me, outsider.id, playlist.id)
        .await
        .unwrap();
    assert_eq!(unchanged.videos, vec![a.id, b.id, c.id]);

    let trimmed = ctx
        .services
        .playlists
        .remove_video(me, b.id, playlist.id)
        .await
        .unwrap();
    assert_eq!(trimmed.videos, vec![a.id, c.id]);
}

#[tokio::test]
async fn test_add_checks_playlist_then_video() {
    let ctx = TestContext::new();
    let owner = seed_user(&ctx.repos, "curator").await;
    let video = seed_video(&ctx.repos, owner.id, "Clip").await;
    let me = Principal::user(owner.id);
    let playlist = ctx.services.playlists.create(me, "List", "Desc").await.unwrap();

    let err = ctx
        .services
        .playlists
        .add_video(me, video.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(msg) if msg.contains("Playlist")));

    let err = ctx
        .services
        .playlists
        .add_video(me, Uuid::new_v4(), playlist.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(msg) if msg.contains("Video")));
}

#[tokio::test]
async fn test_create_and_update_validation() {
    let ctx = TestContext::new();
    let owner = seed_user(&ctx.repos, "curator").await;
    let me = Principal::user(owner.id);

    let err = ctx.services.playlists.create(me, "  ", "Desc").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let playlist = ctx.services.playlists.create(me, "Name", "Desc").await.unwrap();
    let err = ctx
        .services
        .playlists
        .update(me, playlist.id, None, Some(""))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let renamed = ctx
        .services
        .playlists
        .update(me, playlist.id, Some("Renamed"), None)
        .await
        .unwrap();
    assert_eq!(renamed.name, "Renamed");
    assert_eq!(renamed.description, "Desc");
}

#[tokio::test]
async fn test_playlist_views_join_videos_and_owner() {
    let ctx = TestContext::new();
    let curator = seed_user(&ctx.repos, "curator").await;
    let artist = seed_user(&ctx.repos, "artist").await;
    let song = seed_video(&ctx.repos, artist.id, "Song").await;
    let me = Principal::user(curator.id);

    let playlist = ctx.services.playlists.create(me, "Mix", "Songs I like").await.unwrap();
    ctx.services
        .playlists
        .add_video(me, song.id, playlist.id)
        .await
        .unwrap();

    let detail = ctx.services.playlists.get(playlist.id).await.unwrap();
    assert_eq!(detail.name, "Mix");
    assert_eq!(
        detail.created_by.as_ref().map(|u| u.username.as_str()),
        Some("curator")
    );
    assert_eq!(detail.videos.len(), 1);
    assert_eq!(
        detail.videos[0].owner.as_ref().map(|u| u.username.as_str()),
        Some("artist")
    );

    let listed = ctx.services.playlists.user_playlists(curator.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].videos.len(), 1);
    assert_eq!(listed[0].videos[0].title, "Song");

    let err = ctx.services.playlists.get(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_playlist() {
    let ctx = TestContext::new();
    let owner = seed_user(&ctx.repos, "curator").await;
    let me = Principal::user(owner.id);
    let playlist = ctx.services.playlists.create(me, "Temp", "Gone soon").await.unwrap();

    let deleted = ctx.services.playlists.delete(me, playlist.id).await.unwrap();
    assert_eq!(deleted.id, playlist.id);
    assert!(ctx.repos.playlists.find_by_id(playlist.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_store_tells_duplicate_from_vanished_playlist() {
    let ctx = TestContext::new();
    let owner = seed_user(&ctx.repos, "curator").await;
    let video = seed_video(&ctx.repos, owner.id, "Clip").await;
    let me = Principal::user(owner.id);
    let playlist = ctx.services.playlists.create(me, "List", "Desc").await.unwrap();

    let first = ctx.repos.playlists.add_video(playlist.id, video.id).await.unwrap();
    assert!(matches!(first, Membership::Added(ref p) if p.videos == vec![video.id]));
    assert_eq!(
        ctx.repos.playlists.add_video(playlist.id, video.id).await.unwrap(),
        Membership::AlreadyMember
    );

    ctx.repos.playlists.delete(playlist.id).await.unwrap();
    assert_eq!(
        ctx.repos.playlists.add_video(playlist.id, video.id).await.unwrap(),
        Membership::Missing
    );
}

#[tokio::test]
async fn test_playlist_deleted_mid_add_is_not_found() {
    let ctx = TestContext::new();
    let owner = seed_user(&ctx.repos, "curator").await;
    let video = seed_video(&ctx.repos, owner.id, "Clip").await;
    let me = Principal::user(owner.id);
    let playlist = ctx.services.playlists.create(me, "List", "Desc").await.unwrap();

    let mut repos = ctx.repos.clone();
    repos.playlists = Arc::new(VanishingPlaylists(ctx.repos.playlists.clone()));
    let services = channel_service::Services::new(repos, ctx.assets.clone(), Default::default());

    let err = services
        .playlists
        .add_video(me, video.id, playlist.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(msg) if msg.contains("Playlist")));
}
