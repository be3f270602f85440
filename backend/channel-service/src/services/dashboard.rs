/// Channel dashboard for the authenticated user
use crate::domain::{ChannelStats, ChannelVideo};
use crate::error::Result;
use crate::middleware::Principal;
use crate::repository::Repositories;

pub struct DashboardService {
    repos: Repositories,
}

impl DashboardService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Three aggregate passes: videos (count, views), subscribers, likes
    /// received on the channel's videos, tweets and comments. An empty pass
    /// counts as zero.
    pub async fn channel_stats(&self, principal: Principal) -> Result<ChannelStats> {
        let channel = principal.require()?;

        let totals = self
            .repos
            .videos
            .totals_for_owner(channel)
            .await?
            .unwrap_or_default();
        let subscribers = self
            .repos
            .subscriptions
            .count_for_channel(channel)
            .await?
            .unwrap_or_default();
        let likes = self
            .repos
            .likes
            .count_received(channel)
            .await?
            .unwrap_or_default();

        Ok(ChannelStats {
            total_videos: totals.total_videos,
            total_views: totals.total_views,
            total_subscribers: subscribers,
            total_likes: likes,
        })
    }

    /// The caller's own videos, newest first
    pub async fn channel_videos(&self, principal: Principal) -> Result<Vec<ChannelVideo>> {
        let channel = principal.require()?;
        let videos = self.repos.videos.list_by_owner(channel).await?;
        Ok(videos.iter().map(ChannelVideo::from).collect())
    }
}
