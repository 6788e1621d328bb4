use uuid::Uuid;

use vidora_db::Database;
use vidora_types::api::{ChannelProfile, ChannelStats};

use crate::aggregate::enrich::profile_of;
use crate::error::{CoreError, CoreResult};
use crate::resolver::Resolver;

pub struct ChannelViews<'a> {
    db: &'a Database,
}

impl<'a> ChannelViews<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Public channel page looked up by handle.
    pub fn channel_profile(&self, handle: &str, viewer: Option<Uuid>) -> CoreResult<ChannelProfile> {
        let handle = handle.trim().trim_start_matches('@');
        if handle.is_empty() {
            return Err(CoreError::InvalidReference("channel handle is empty".into()));
        }

        let user = self
            .db
            .get_user_by_username(&handle)?
            .ok_or_else(|| CoreError::NotFound(format!("channel '{}' not found", handle)))?;

        let is_subscribed = match viewer {
            Some(v) => self.db.is_subscribed(v, user.id)?,
            None => false,
        };

        Ok(ChannelProfile {
            profile: profile_of(&user),
            cover_image: user.cover_image.clone(),
            subscribers_count: self.db.count_subscribers(user.id)?,
            channels_subscribed_to_count: self.db.count_subscriptions(user.id)?,
            is_subscribed,
        })
    }

    pub fn channel_stats(&self, channel: Uuid) -> CoreResult<ChannelStats> {
        Resolver::new(self.db).require_user(channel)?;

        let (total_videos, total_views) = self.db.channel_video_totals(channel)?;
        Ok(ChannelStats {
            channel_id: channel,
            total_videos,
            total_views,
            total_subscribers: self.db.count_subscribers(channel)?,
            total_likes: self.db.likes_on_owned_videos(channel)?,
        })
    }
}
