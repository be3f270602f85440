/// Dashboard handlers
use actix_web::{web, HttpResponse};

use super::ok;
use crate::error::Result;
use crate::middleware::Principal;
use crate::services::Services;

/// GET /api/v1/dashboard/stats
pub async fn channel_stats(services: web::Data<Services>, principal: Principal) -> Result<HttpResponse> {
    let stats = services.dashboard.channel_stats(principal).await?;
    Ok(ok(stats, "Channel stats fetched"))
}

/// GET /api/v1/dashboard/videos
pub async fn channel_videos(services: web::Data<Services>, principal: Principal) -> Result<HttpResponse> {
    let videos = services.dashboard.channel_videos(principal).await?;
    Ok(ok(videos, "Channel videos fetched"))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/dashboard")
            .route("/stats", web::get().to(channel_stats))
            .route("/videos", web::get().to(channel_videos)),
    );
}
