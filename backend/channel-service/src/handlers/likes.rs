/// Like handlers
use actix_web::{web, HttpResponse};

use super::{ok, parse_id};
use crate::error::Result;
use crate::middleware::Principal;
use crate::services::Services;

/// POST /api/v1/likes/toggle/v/{videoId}
pub async fn toggle_video_like(
    services: web::Data<Services>,
    principal: Principal,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&path, "video")?;
    let toggled = services.likes.toggle_video_like(principal, video_id).await?;
    let message = if toggled.is_created() { "Liked video" } else { "Unliked video" };
    Ok(ok(toggled, message))
}

/// POST /api/v1/likes/toggle/c/{commentId}
pub async fn toggle_comment_like(
    services: web::Data<Services>,
    principal: Principal,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let comment_id = parse_id(&path, "comment")?;
    let toggled = services.likes.toggle_comment_like(principal, comment_id).await?;
    let message = if toggled.is_created() { "Liked comment" } else { "Unliked comment" };
    Ok(ok(toggled, message))
}

/// POST /api/v1/likes/toggle/t/{tweetId}
pub async fn toggle_tweet_like(
    services: web::Data<Services>,
    principal: Principal,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let tweet_id = parse_id(&path, "tweet")?;
    let toggled = services.likes.toggle_tweet_like(principal, tweet_id).await?;
    let message = if toggled.is_created() { "Liked tweet" } else { "Unliked tweet" };
    Ok(ok(toggled, message))
}

/// GET /api/v1/likes/videos
pub async fn liked_videos(services: web::Data<Services>, principal: Principal) -> Result<HttpResponse> {
    let videos = services.likes.liked_videos(principal).await?;
    Ok(ok(videos, "Liked videos fetched"))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/likes")
            .route("/toggle/v/{video_id}", web::post().to(toggle_video_like))
            .route("/toggle/c/{comment_id}", web::post().to(toggle_comment_like))
            .route("/toggle/t/{tweet_id}", web::post().to(toggle_tweet_like))
            .route("/videos", web::get().to(liked_videos)),
    );
}
