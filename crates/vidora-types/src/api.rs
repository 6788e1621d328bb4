use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{EngagementSummary, Profile, ReactionState};

// -- JWT Claims --

/// Claims carried by access tokens. Tokens are issued elsewhere; this
/// workspace only verifies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Envelope --

/// Every response body, success or failure, uses this shape.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            data,
            message: message.into(),
            success: true,
        }
    }
}

impl ApiResponse<serde_json::Value> {
    pub fn failure(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            data: serde_json::Value::Object(Default::default()),
            message: message.into(),
            success: false,
        }
    }
}

// -- Pagination --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub limit: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

// -- Engagement --

/// Result of a reaction toggle, including the totals after the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionOutcome {
    pub state: ReactionState,
    pub is_liked: bool,
    pub is_disliked: bool,
    pub total_likes: u64,
    pub total_dislikes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCounts {
    pub total_likes: u64,
    pub total_dislikes: u64,
    pub viewer_state: ReactionState,
}

// -- Subscriptions --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionToggle {
    pub subscribed: bool,
}

/// A user subscribed to the listed channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberEntry {
    #[serde(flatten)]
    pub profile: Profile,
    pub subscribers_count: u64,
    /// The channel subscribes to this subscriber too.
    pub is_subscribed_back: bool,
}

/// A channel the listed user subscribes to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribedChannel {
    #[serde(flatten)]
    pub profile: Profile,
    pub subscribers_count: u64,
    /// The requesting viewer subscribes to this channel.
    pub is_subscribed: bool,
}

// -- Content views --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration: f64,
    pub views: u64,
    pub is_published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Profile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub engagement: EngagementSummary,
    pub is_owner: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub subscribers_count: u64,
    pub is_subscribed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoDetail {
    #[serde(flatten)]
    pub video: VideoView,
    pub channel: ChannelSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub video_id: Uuid,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Profile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub engagement: EngagementSummary,
    pub is_owner: bool,
    pub is_liked_by_video_owner: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweetView {
    pub id: Uuid,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Profile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub engagement: EngagementSummary,
    pub is_owner: bool,
}

// -- Channels --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelProfile {
    #[serde(flatten)]
    pub profile: Profile,
    pub cover_image: Option<String>,
    pub subscribers_count: u64,
    pub channels_subscribed_to_count: u64,
    pub is_subscribed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelStats {
    pub channel_id: Uuid,
    pub total_videos: u64,
    pub total_views: u64,
    pub total_subscribers: u64,
    pub total_likes: u64,
}
