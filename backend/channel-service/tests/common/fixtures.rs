/// Test fixtures: seeded users, videos and scratch uploads
use channel_service::domain::{User, Video};
use channel_service::storage::LocalAsset;
use channel_service::Repositories;
use chrono::{Duration, Utc};
use std::path::Path;
use uuid::Uuid;

pub async fn seed_user(repos: &Repositories, username: &str) -> User {
    let user = User::new(
        username,
        format!("{} Test", username),
        format!("https://cdn.example.com/avatars/{}.png", username),
    );
    repos.users.insert(user).await.expect("Failed to seed user")
}

/// Insert a published video whose assets already exist in the object store
pub async fn seed_video(repos: &Repositories, owner: Uuid, title: &str) -> Video {
    seed_video_at(repos, owner, title, 0).await
}

/// Like [`seed_video`], created `offset_secs` seconds after a fixed base time
pub async fn seed_video_at(repos: &Repositories, owner: Uuid, title: &str, offset_secs: i64) -> Video {
    let created_at = Utc::now() - Duration::days(1) + Duration::seconds(offset_secs);
    let id = Uuid::new_v4();
    let video = Video {
        id,
        owner,
        video_file: format!("https://assets.test/video/{}.mp4", id),
        thumbnail: format!("https://assets.test/image/{}.png", id),
        title: title.to_string(),
        description: format!("About {}", title),
        duration: 42.0,
        views: 0,
        is_published: true,
        created_at,
        updated_at: created_at,
    };
    repos.videos.insert(video).await.expect("Failed to seed video")
}

/// Write a scratch upload, as the multipart reader would
pub async fn scratch_file(dir: &Path, original_name: &str) -> LocalAsset {
    let path = dir.join(Uuid::new_v4().to_string());
    tokio::fs::write(&path, b"test asset bytes")
        .await
        .expect("Failed to write scratch file");
    LocalAsset::new(path, original_name)
}
