/// Video handlers
use actix_multipart::Multipart;
use actix_web::{http::StatusCode, web, HttpResponse};
use serde::Deserialize;

use super::upload::{read_multipart, UploadSettings};
use super::{ok, parse_id, respond};
use crate::error::Result;
use crate::middleware::Principal;
use crate::pipeline::{Page, SortSpec, TextSearch};
use crate::repository::VideoQuery;
use crate::services::{NewVideo, Services, VideoDetailsUpdate};

/// Feed query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub query: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub user_id: Option<String>,
}

impl VideoListQuery {
    fn to_query(&self, services: &Services) -> Result<VideoQuery> {
        let owner = match self.user_id.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => Some(parse_id(raw, "user")?),
            None => None,
        };

        Ok(VideoQuery {
            search: TextSearch::new(self.query.as_deref())?,
            owner,
            sort: SortSpec::from_query(self.sort_by.as_deref(), self.sort_type.as_deref())?,
            page: Page::from_query(self.page, self.limit, &services.pagination)?,
        })
    }
}

/// List videos
///
/// GET /api/v1/videos
pub async fn list_videos(
    services: web::Data<Services>,
    query: web::Query<VideoListQuery>,
) -> Result<HttpResponse> {
    let query = query.to_query(&services)?;
    let videos = services.videos.list(&query).await?;
    Ok(ok(serde_json::json!({ "videos": videos }), "All videos"))
}

/// Publish a video
///
/// POST /api/v1/videos (multipart: title, description, videoFile, thumbnail)
pub async fn publish_video(
    services: web::Data<Services>,
    uploads: web::Data<UploadSettings>,
    principal: Principal,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = read_multipart(payload, &uploads).await?;
    let draft = NewVideo {
        title: form.text("title").unwrap_or_default(),
        description: form.text("description").unwrap_or_default(),
        video_file: form.take_file("videoFile"),
        thumbnail: form.take_file("thumbnail"),
    };
    form.discard_files().await;

    let video = services.videos.publish(principal, draft).await?;
    Ok(ok(video, "Video uploaded"))
}

/// GET /api/v1/videos/{videoId}
pub async fn get_video(services: web::Data<Services>, path: web::Path<String>) -> Result<HttpResponse> {
    let video_id = parse_id(&path, "video")?;
    let video = services.videos.get(video_id).await?;
    Ok(ok(video, "Video fetched"))
}

/// Update title, description and thumbnail
///
/// PATCH /api/v1/videos/{videoId} (multipart: title, description, thumbnail)
pub async fn update_video(
    services: web::Data<Services>,
    uploads: web::Data<UploadSettings>,
    principal: Principal,
    path: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = read_multipart(payload, &uploads).await?;
    let thumbnail = form.take_file("thumbnail");
    let changes = VideoDetailsUpdate {
        title: form.text("title"),
        description: form.text("description"),
        thumbnail,
    };
    form.discard_files().await;

    let video_id = match parse_id(&path, "video") {
        Ok(id) => id,
        Err(e) => {
            if let Some(thumb) = &changes.thumbnail {
                crate::storage::discard_scratch(thumb).await;
            }
            return Err(e);
        }
    };

    let video = services.videos.update_details(principal, video_id, changes).await?;
    Ok(ok(video, "Video details updated"))
}

/// DELETE /api/v1/videos/{videoId}
pub async fn delete_video(
    services: web::Data<Services>,
    principal: Principal,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&path, "video")?;
    let video = services.videos.delete(principal, video_id).await?;
    Ok(respond(StatusCode::NO_CONTENT, video, "Video deleted"))
}

/// PATCH /api/v1/videos/toggle/publish/{videoId}
pub async fn toggle_publish(
    services: web::Data<Services>,
    principal: Principal,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&path, "video")?;
    let video = services.videos.toggle_publish(principal, video_id).await?;
    Ok(ok(video, "Publish status changed"))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/videos")
            .route("", web::get().to(list_videos))
            .route("", web::post().to(publish_video))
            .route("/toggle/publish/{video_id}", web::patch().to(toggle_publish))
            .route("/{video_id}", web::get().to(get_video))
            .route("/{video_id}", web::patch().to(update_video))
            .route("/{video_id}", web::delete().to(delete_video)),
    );
}
