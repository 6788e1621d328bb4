//! In-memory joins: engagement rows grouped by target, owner profiles keyed
//! by user id, and the lazy sequence that turns rows into views.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use vidora_db::models::{CommentRow, EngagementRow, TweetRow, UserRow, VideoRow};
use vidora_types::api::{CommentView, TweetView, VideoView};
use vidora_types::models::{EngagementSummary, Polarity, Profile};

/// Public projection. Only display fields leave the store layer.
pub fn profile_of(user: &UserRow) -> Profile {
    Profile {
        id: user.id,
        username: user.username.clone(),
        full_name: user.full_name.clone(),
        avatar: user.avatar.clone(),
    }
}

#[derive(Debug, Default, Clone)]
struct Tally {
    likers: HashSet<Uuid>,
    dislikers: HashSet<Uuid>,
}

/// Engagement rows partitioned per target into like-owner and dislike-owner
/// sets.
#[derive(Debug, Default, Clone)]
pub struct EngagementIndex {
    by_target: HashMap<Uuid, Tally>,
}

impl EngagementIndex {
    pub fn from_rows(rows: impl IntoIterator<Item = EngagementRow>) -> Self {
        let mut by_target: HashMap<Uuid, Tally> = HashMap::new();
        for row in rows {
            let tally = by_target.entry(row.target_id).or_default();
            match row.polarity {
                Polarity::Like => tally.likers.insert(row.actor_id),
                Polarity::Dislike => tally.dislikers.insert(row.actor_id),
            };
        }
        Self { by_target }
    }

    pub fn summary(&self, target: Uuid, viewer: Option<Uuid>) -> EngagementSummary {
        let Some(tally) = self.by_target.get(&target) else {
            return EngagementSummary::default();
        };
        EngagementSummary {
            total_likes: tally.likers.len() as u64,
            total_dislikes: tally.dislikers.len() as u64,
            is_liked: viewer.is_some_and(|v| tally.likers.contains(&v)),
            is_disliked: viewer.is_some_and(|v| tally.dislikers.contains(&v)),
        }
    }

    pub fn liked_by(&self, target: Uuid, actor: Uuid) -> bool {
        self.by_target
            .get(&target)
            .is_some_and(|t| t.likers.contains(&actor))
    }
}

/// Everything a row needs to become a view for one viewer.
#[derive(Debug, Default, Clone)]
pub struct EnrichContext {
    pub viewer: Option<Uuid>,
    pub engagement: Option<EngagementIndex>,
    pub profiles: Option<HashMap<Uuid, Profile>>,
    /// Owner of the parent video when listing comments.
    pub video_owner: Option<Uuid>,
}

impl EnrichContext {
    fn owner_profile(&self, owner: Uuid) -> Option<Profile> {
        self.profiles.as_ref().and_then(|p| p.get(&owner).cloned())
    }

    /// Without the engagement join every target reads as zero totals and no
    /// personal flags.
    fn engagement_for(&self, target: Uuid) -> EngagementSummary {
        self.engagement
            .as_ref()
            .map(|idx| idx.summary(target, self.viewer))
            .unwrap_or_default()
    }

    fn is_owner(&self, owner: Uuid) -> bool {
        self.viewer == Some(owner)
    }
}

/// Stored content that can be enriched.
pub trait ContentRow {
    type View;

    fn id(&self) -> Uuid;
    fn owner_id(&self) -> Uuid;
    fn into_view(self, ctx: &EnrichContext) -> Self::View;
}

impl ContentRow for VideoRow {
    type View = VideoView;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn into_view(self, ctx: &EnrichContext) -> VideoView {
        VideoView {
            owner: ctx.owner_profile(self.owner_id),
            engagement: ctx.engagement_for(self.id),
            is_owner: ctx.is_owner(self.owner_id),
            id: self.id,
            title: self.title,
            description: self.description,
            video_file: self.video_file,
            thumbnail: self.thumbnail,
            duration: self.duration,
            views: self.views,
            is_published: self.is_published,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl ContentRow for CommentRow {
    type View = CommentView;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn into_view(self, ctx: &EnrichContext) -> CommentView {
        let is_liked_by_video_owner = match (&ctx.engagement, ctx.video_owner) {
            (Some(idx), Some(owner)) => idx.liked_by(self.id, owner),
            _ => false,
        };
        CommentView {
            owner: ctx.owner_profile(self.owner_id),
            engagement: ctx.engagement_for(self.id),
            is_owner: ctx.is_owner(self.owner_id),
            is_liked_by_video_owner,
            id: self.id,
            video_id: self.video_id,
            content: self.content,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl ContentRow for TweetRow {
    type View = TweetView;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn into_view(self, ctx: &EnrichContext) -> TweetView {
        TweetView {
            owner: ctx.owner_profile(self.owner_id),
            engagement: ctx.engagement_for(self.id),
            is_owner: ctx.is_owner(self.owner_id),
            id: self.id,
            content: self.content,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Filtered, sorted rows that turn into views only as they are pulled.
/// Skipping (via `nth`) never builds the skipped views. Cloning restarts
/// from the current position with the same joins.
#[derive(Debug, Clone)]
pub struct EnrichedSeq<R> {
    rows: std::vec::IntoIter<R>,
    ctx: Arc<EnrichContext>,
}

impl<R: ContentRow> EnrichedSeq<R> {
    pub fn new(rows: Vec<R>, ctx: EnrichContext) -> Self {
        Self {
            rows: rows.into_iter(),
            ctx: Arc::new(ctx),
        }
    }
}

impl<R: ContentRow> Iterator for EnrichedSeq<R> {
    type Item = R::View;

    fn next(&mut self) -> Option<R::View> {
        let row = self.rows.next()?;
        Some(row.into_view(&self.ctx))
    }

    fn nth(&mut self, n: usize) -> Option<R::View> {
        let row = self.rows.nth(n)?;
        Some(row.into_view(&self.ctx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl<R: ContentRow> ExactSizeIterator for EnrichedSeq<R> {}
