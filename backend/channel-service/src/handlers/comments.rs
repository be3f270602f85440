/// Comment handlers
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use super::{ok, parse_id, PageQuery};
use crate::error::Result;
use crate::middleware::Principal;
use crate::services::Services;

#[derive(Debug, Deserialize, Validate)]
pub struct CommentPayload {
    #[validate(length(min = 1, max = 5000, message = "Comment must be 1-5000 characters"))]
    pub content: String,
}

/// GET /api/v1/comments/{videoId}
pub async fn get_video_comments(
    services: web::Data<Services>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&path, "video")?;
    let page = query.to_page(&services)?;
    let comments = services.comments.list_for_video(video_id, page).await?;
    Ok(ok(comments, "Comments fetched"))
}

/// POST /api/v1/comments/{videoId}
pub async fn add_comment(
    services: web::Data<Services>,
    principal: Principal,
    path: web::Path<String>,
    payload: web::Json<CommentPayload>,
) -> Result<HttpResponse> {
    principal.require()?;
    payload.validate()?;
    let video_id = parse_id(&path, "video")?;
    let comment = services.comments.add(principal, video_id, &payload.content).await?;
    Ok(ok(comment, "Comment added"))
}

/// PATCH /api/v1/comments/c/{commentId}
pub async fn update_comment(
    services: web::Data<Services>,
    principal: Principal,
    path: web::Path<String>,
    payload: web::Json<CommentPayload>,
) -> Result<HttpResponse> {
    // Content rules are checked after the ownership guard
    let comment_id = parse_id(&path, "comment")?;
    let comment = services
        .comments
        .update(principal, comment_id, &payload.content)
        .await?;
    Ok(ok(comment, "Comment updated"))
}

/// DELETE /api/v1/comments/c/{commentId}
pub async fn delete_comment(
    services: web::Data<Services>,
    principal: Principal,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let comment_id = parse_id(&path, "comment")?;
    let comment = services.comments.delete(principal, comment_id).await?;
    Ok(ok(comment, "Comment deleted"))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/comments")
            .route("/c/{comment_id}", web::patch().to(update_comment))
            .route("/c/{comment_id}", web::delete().to(delete_comment))
            .route("/{video_id}", web::get().to(get_video_comments))
            .route("/{video_id}", web::post().to(add_comment)),
    );
}
