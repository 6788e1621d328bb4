//! Subscriber -> channel edges.

use tracing::{info, warn};
use uuid::Uuid;

use vidora_db::{Database, expect_one, subscriptions};
use vidora_types::api::{SubscribedChannel, SubscriberEntry, SubscriptionToggle};

use crate::aggregate::enrich::profile_of;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::resolver::Resolver;

pub struct RelationshipStore<'a> {
    db: &'a Database,
    config: &'a CoreConfig,
}

impl<'a> RelationshipStore<'a> {
    pub fn new(db: &'a Database, config: &'a CoreConfig) -> Self {
        Self { db, config }
    }

    /// Subscribe when no edge exists, unsubscribe when one does.
    pub fn toggle_subscription(
        &self,
        subscriber: Uuid,
        channel: Uuid,
    ) -> CoreResult<SubscriptionToggle> {
        let resolver = Resolver::new(self.db);
        resolver.require_user(subscriber)?;
        resolver.require_user(channel)?;

        if subscriber == channel && !self.config.allow_self_subscription {
            return Err(CoreError::InvalidReference(
                "cannot subscribe to your own channel".into(),
            ));
        }

        let subscribed = self.db.with_tx(|conn| {
            match subscriptions::find(conn, subscriber, channel)? {
                Some(id) => {
                    expect_one(subscriptions::delete(conn, id)?, "unsubscribe")?;
                    Ok(false)
                }
                None => {
                    subscriptions::insert(conn, subscriber, channel)?;
                    Ok(true)
                }
            }
        })?;

        info!(
            "{} {} channel {}",
            subscriber,
            if subscribed { "subscribed to" } else { "unsubscribed from" },
            channel
        );
        Ok(SubscriptionToggle { subscribed })
    }

    /// Everyone subscribed to `channel`, newest first, each flagged with
    /// whether the channel subscribes back.
    pub fn list_subscribers(&self, channel: Uuid) -> CoreResult<Vec<SubscriberEntry>> {
        Resolver::new(self.db).require_user(channel)?;

        let edges = self.db.subscribers_of(channel)?;
        let ids: Vec<Uuid> = edges.iter().map(|e| e.subscriber_id).collect();

        let users = self.db.get_users(&ids)?;
        let counts = self.db.subscriber_counts(&ids)?;
        let followed_back = self.db.subscribed_among(channel, &ids)?;

        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(user) = users.get(&id) else {
                warn!("Subscription from unknown user {} to {}", id, channel);
                continue;
            };
            out.push(SubscriberEntry {
                profile: profile_of(user),
                subscribers_count: counts.get(&id).copied().unwrap_or(0),
                is_subscribed_back: followed_back.contains(&id),
            });
        }
        Ok(out)
    }

    /// Channels `subscriber` follows, newest first. `is_subscribed` reports
    /// the viewer's own relationship to each channel.
    pub fn list_subscriptions(
        &self,
        subscriber: Uuid,
        viewer: Option<Uuid>,
    ) -> CoreResult<Vec<SubscribedChannel>> {
        Resolver::new(self.db).require_user(subscriber)?;

        let edges = self.db.subscriptions_of(subscriber)?;
        let ids: Vec<Uuid> = edges.iter().map(|e| e.channel_id).collect();

        let users = self.db.get_users(&ids)?;
        let counts = self.db.subscriber_counts(&ids)?;
        let viewer_follows = match viewer {
            Some(v) => self.db.subscribed_among(v, &ids)?,
            None => Default::default(),
        };

        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(user) = users.get(&id) else {
                warn!("Subscription from {} to unknown channel {}", subscriber, id);
                continue;
            };
            out.push(SubscribedChannel {
                profile: profile_of(user),
                subscribers_count: counts.get(&id).copied().unwrap_or(0),
                is_subscribed: viewer_follows.contains(&id),
            });
        }
        Ok(out)
    }

    pub fn count_subscribers(&self, channel: Uuid) -> CoreResult<u64> {
        Resolver::new(self.db).require_user(channel)?;
        Ok(self.db.count_subscribers(channel)?)
    }

    pub fn count_subscriptions(&self, subscriber: Uuid) -> CoreResult<u64> {
        Resolver::new(self.db).require_user(subscriber)?;
        Ok(self.db.count_subscriptions(subscriber)?)
    }

    /// False for anonymous viewers.
    pub fn is_subscribed(&self, viewer: Option<Uuid>, channel: Uuid) -> CoreResult<bool> {
        match viewer {
            Some(v) => Ok(self.db.is_subscribed(v, channel)?),
            None => Ok(false),
        }
    }
}
