/// Channel subscriptions
use tracing::info;
use uuid::Uuid;

use super::toggle::{ToggleEngine, Toggled};
use crate::domain::{SubscribedChannelView, SubscriberView, Subscription, SubscriptionKey};
use crate::error::{AppError, Result};
use crate::middleware::Principal;
use crate::pipeline::{distinct_ids, Lookup, Pipeline};
use crate::repository::Repositories;

pub struct SubscriptionService {
    repos: Repositories,
    engine: ToggleEngine<Subscription>,
}

impl SubscriptionService {
    pub fn new(repos: Repositories) -> Self {
        Self {
            repos,
            engine: ToggleEngine::new(),
        }
    }

    /// Subscribe the caller to `channel`, or unsubscribe when already subscribed
    pub async fn toggle(&self, principal: Principal, channel: Uuid) -> Result<Toggled<Subscription>> {
        let subscriber = principal.require()?;
        if subscriber == channel {
            return Err(AppError::validation("You cannot subscribe to your own channel"));
        }
        if self.repos.users.find_by_id(channel).await?.is_none() {
            return Err(AppError::not_found("Channel not found"));
        }

        let key = SubscriptionKey { subscriber, channel };
        let toggled = self.engine.toggle(&*self.repos.subscriptions, key).await?;

        info!(
            subscriber = %subscriber,
            channel = %channel,
            subscribed = toggled.is_created(),
            "Subscription toggled"
        );
        Ok(toggled)
    }

    pub async fn channel_subscribers(&self, channel: Uuid) -> Result<Vec<SubscriberView>> {
        let subscriptions = self.repos.subscriptions.list_by_channel(channel).await?;
        let ids = distinct_ids(subscriptions.iter().map(|s| s.subscriber));
        let users = Lookup::from_rows(self.repos.users.find_many(&ids).await?);

        Ok(Pipeline::from_source(subscriptions)
            .join(|s| users.first(s.subscriber).map(|u| SubscriberView::new(&s, u)))
            .collect())
    }

    pub async fn subscribed_channels(&self, subscriber: Uuid) -> Result<Vec<SubscribedChannelView>> {
        let subscriptions = self.repos.subscriptions.list_by_subscriber(subscriber).await?;
        let ids = distinct_ids(subscriptions.iter().map(|s| s.channel));
        let channels = Lookup::from_rows(self.repos.users.find_many(&ids).await?);

        Ok(Pipeline::from_source(subscriptions)
            .join(|s| channels.first(s.channel).map(|c| SubscribedChannelView::new(&s, c)))
            .collect())
    }
}
