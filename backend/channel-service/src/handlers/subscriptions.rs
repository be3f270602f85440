/// Subscription handlers
use actix_web::{web, HttpResponse};

use super::{ok, parse_id};
use crate::error::Result;
use crate::middleware::Principal;
use crate::services::Services;

/// POST /api/v1/subscriptions/c/{channelId}
pub async fn toggle_subscription(
    services: web::Data<Services>,
    principal: Principal,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let channel_id = parse_id(&path, "channel")?;
    let toggled = services.subscriptions.toggle(principal, channel_id).await?;
    let message = if toggled.is_created() {
        "Subscribed to channel"
    } else {
        "Unsubscribed from channel"
    };
    Ok(ok(toggled, message))
}

/// GET /api/v1/subscriptions/c/{channelId}
pub async fn channel_subscribers(services: web::Data<Services>, path: web::Path<String>) -> Result<HttpResponse> {
    let channel_id = parse_id(&path, "channel")?;
    let subscribers = services.subscriptions.channel_subscribers(channel_id).await?;
    Ok(ok(subscribers, "Subscribers fetched"))
}

/// GET /api/v1/subscriptions/u/{subscriberId}
pub async fn subscribed_channels(services: web::Data<Services>, path: web::Path<String>) -> Result<HttpResponse> {
    let subscriber_id = parse_id(&path, "subscriber")?;
    let channels = services.subscriptions.subscribed_channels(subscriber_id).await?;
    Ok(ok(channels, "Subscribed channels fetched"))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .route("/c/{channel_id}", web::post().to(toggle_subscription))
            .route("/c/{channel_id}", web::get().to(channel_subscribers))
            .route("/u/{subscriber_id}", web::get().to(subscribed_channels)),
    );
}
