/// Tweet handlers
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use super::{ok, parse_id};
use crate::error::Result;
use crate::middleware::Principal;
use crate::services::Services;

#[derive(Debug, Deserialize, Validate)]
pub struct TweetPayload {
    #[validate(length(min = 1, max = 1000, message = "Tweet must be 1-1000 characters"))]
    pub content: String,
}

/// POST /api/v1/tweets
pub async fn create_tweet(
    services: web::Data<Services>,
    principal: Principal,
    payload: web::Json<TweetPayload>,
) -> Result<HttpResponse> {
    principal.require()?;
    payload.validate()?;
    let tweet = services.tweets.create(principal, &payload.content).await?;
    Ok(ok(tweet, "Tweet created"))
}

/// GET /api/v1/tweets/user/{userId}
pub async fn user_tweets(services: web::Data<Services>, path: web::Path<String>) -> Result<HttpResponse> {
    let user_id = parse_id(&path, "user")?;
    let tweets = services.tweets.user_tweets(user_id).await?;
    Ok(ok(serde_json::json!({ "tweets": tweets }), "Tweets fetched"))
}

/// PATCH /api/v1/tweets/{tweetId}
pub async fn update_tweet(
    services: web::Data<Services>,
    principal: Principal,
    path: web::Path<String>,
    payload: web::Json<TweetPayload>,
) -> Result<HttpResponse> {
    // Content rules are checked after the ownership guard
    let tweet_id = parse_id(&path, "tweet")?;
    let tweet = services.tweets.update(principal, tweet_id, &payload.content).await?;
    Ok(ok(tweet, "Tweet updated"))
}

/// DELETE /api/v1/tweets/{tweetId}
pub async fn delete_tweet(
    services: web::Data<Services>,
    principal: Principal,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let tweet_id = parse_id(&path, "tweet")?;
    let tweet = services.tweets.delete(principal, tweet_id).await?;
    Ok(ok(tweet, "Tweet deleted"))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tweets")
            .route("", web::post().to(create_tweet))
            .route("/user/{user_id}", web::get().to(user_tweets))
            .route("/{tweet_id}", web::patch().to(update_tweet))
            .route("/{tweet_id}", web::delete().to(delete_tweet)),
    );
}
