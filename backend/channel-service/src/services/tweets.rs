/// Channel tweets
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::domain::Tweet;
use crate::error::{AppError, Result};
use crate::middleware::{require_owner, Principal};
use crate::repository::Repositories;

pub struct TweetService {
    repos: Repositories,
}

impl TweetService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(&self, principal: Principal, content: &str) -> Result<Tweet> {
        let owner = principal.require()?;
        let content = required_content(content)?;

        let tweet = self.repos.tweets.insert(Tweet::new(owner, content)).await?;
        info!(tweet_id = %tweet.id, user_id = %owner, "Tweet created");
        Ok(tweet)
    }

    /// Newest first; `NotFound` when the user has no tweets
    pub async fn user_tweets(&self, user_id: Uuid) -> Result<Vec<Tweet>> {
        let tweets = self.repos.tweets.list_by_owner(user_id).await?;
        if tweets.is_empty() {
            return Err(AppError::not_found("No tweets found"));
        }
        Ok(tweets)
    }

    pub async fn update(&self, principal: Principal, tweet_id: Uuid, content: &str) -> Result<Tweet> {
        let tweet = self.find(tweet_id).await?;
        require_owner(&tweet, principal)?;
        let content = required_content(content)?;

        let updated = Tweet {
            content: content.to_string(),
            updated_at: Utc::now(),
            ..tweet
        };
        if !self.repos.tweets.update(&updated).await? {
            return Err(AppError::Persistence(format!(
                "tweet {tweet_id} vanished during update"
            )));
        }
        Ok(updated)
    }

    pub async fn delete(&self, principal: Principal, tweet_id: Uuid) -> Result<Tweet> {
        let tweet = self.find(tweet_id).await?;
        require_owner(&tweet, principal)?;

        if !self.repos.tweets.delete(tweet_id).await? {
            return Err(AppError::Persistence(format!(
                "tweet {tweet_id} vanished during delete"
            )));
        }
        info!(tweet_id = %tweet_id, "Tweet deleted");
        Ok(tweet)
    }

    async fn find(&self, tweet_id: Uuid) -> Result<Tweet> {
        self.repos
            .tweets
            .find_by_id(tweet_id)
            .await?
            .ok_or_else(|| AppError::not_found("Tweet not found"))
    }
}

pub const MAX_TWEET_CHARS: usize = 1000;

fn required_content(content: &str) -> Result<&str> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::validation("Tweet content is required"));
    }
    if content.chars().count() > MAX_TWEET_CHARS {
        return Err(AppError::validation("Tweet must be 1-1000 characters"));
    }
    Ok(content)
}
