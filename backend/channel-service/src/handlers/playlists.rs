/// Playlist handlers
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use super::{ok, parse_id};
use crate::error::Result;
use crate::middleware::Principal;
use crate::services::Services;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlaylistPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
}

/// Length rules are enforced by the service once ownership is established
#[derive(Debug, Deserialize)]
pub struct UpdatePlaylistPayload {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// POST /api/v1/playlist
pub async fn create_playlist(
    services: web::Data<Services>,
    principal: Principal,
    payload: web::Json<CreatePlaylistPayload>,
) -> Result<HttpResponse> {
    principal.require()?;
    payload.validate()?;
    let playlist = services
        .playlists
        .create(principal, &payload.name, &payload.description)
        .await?;
    Ok(ok(playlist, "Playlist created"))
}

/// GET /api/v1/playlist/user/{userId}
pub async fn user_playlists(services: web::Data<Services>, path: web::Path<String>) -> Result<HttpResponse> {
    let user_id = parse_id(&path, "user")?;
    let playlists = services.playlists.user_playlists(user_id).await?;
    Ok(ok(playlists, "Playlists fetched"))
}

/// GET /api/v1/playlist/{playlistId}
pub async fn get_playlist(services: web::Data<Services>, path: web::Path<String>) -> Result<HttpResponse> {
    let playlist_id = parse_id(&path, "playlist")?;
    let playlist = services.playlists.get(playlist_id).await?;
    Ok(ok(playlist, "Playlist fetched"))
}

/// PATCH /api/v1/playlist/{playlistId}
pub async fn update_playlist(
    services: web::Data<Services>,
    principal: Principal,
    path: web::Path<String>,
    payload: web::Json<UpdatePlaylistPayload>,
) -> Result<HttpResponse> {
    let playlist_id = parse_id(&path, "playlist")?;
    let playlist = services
        .playlists
        .update(
            principal,
            playlist_id,
            payload.name.as_deref(),
            payload.description.as_deref(),
        )
        .await?;
    Ok(ok(playlist, "Playlist updated"))
}

/// DELETE /api/v1/playlist/{playlistId}
pub async fn delete_playlist(
    services: web::Data<Services>,
    principal: Principal,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let playlist_id = parse_id(&path, "playlist")?;
    let playlist = services.playlists.delete(principal, playlist_id).await?;
    Ok(ok(playlist, "Playlist deleted"))
}

/// PATCH /api/v1/playlist/add/{videoId}/{playlistId}
pub async fn add_video(
    services: web::Data<Services>,
    principal: Principal,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (video, playlist) = path.into_inner();
    let video_id = parse_id(&video, "video")?;
    let playlist_id = parse_id(&playlist, "playlist")?;
    let playlist = services
        .playlists
        .add_video(principal, video_id, playlist_id)
        .await?;
    Ok(ok(playlist, "Video added to playlist"))
}

/// PATCH /api/v1/playlist/remove/{videoId}/{playlistId}
pub async fn remove_video(
    services: web::Data<Services>,
    principal: Principal,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (video, playlist) = path.into_inner();
    let video_id = parse_id(&video, "video")?;
    let playlist_id = parse_id(&playlist, "playlist")?;
    let playlist = services
        .playlists
        .remove_video(principal, video_id, playlist_id)
        .await?;
    Ok(ok(playlist, "Video removed from playlist"))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/playlist")
            .route("", web::post().to(create_playlist))
            .route("/user/{user_id}", web::get().to(user_playlists))
            .route("/add/{video_id}/{playlist_id}", web::patch().to(add_video))
            .route("/remove/{video_id}/{playlist_id}", web::patch().to(remove_video))
            .route("/{playlist_id}", web::get().to(get_playlist))
            .route("/{playlist_id}", web::patch().to(update_playlist))
            .route("/{playlist_id}", web::delete().to(delete_playlist)),
    );
}
