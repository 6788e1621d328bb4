//! Enriched collection views: filter, join, derive, sort, then hand a lazy
//! sequence to the paginator.

pub mod enrich;
pub mod query;
pub mod search;

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use vidora_db::Database;
use vidora_db::content::{TweetFilter, VideoFilter};
use vidora_db::models::{CommentRow, TweetRow, VideoRow};
use vidora_types::api::{ChannelSummary, VideoDetail};
use vidora_types::models::{EntityKind, Profile, TargetKind};

use crate::error::{CoreError, CoreResult};
use crate::resolver::Resolver;

use enrich::{ContentRow, EngagementIndex, EnrichContext, EnrichedSeq, profile_of};
use query::{Collection, QuerySpec, Sort, SortField, SortOrder, Visibility};
use search::SearchTerms;

/// Raw parameters of a video listing as they arrive from a caller.
#[derive(Debug, Clone, Default)]
pub struct VideoListParams {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub owner: Option<Uuid>,
}

pub struct Aggregator<'a> {
    db: &'a Database,
}

impl<'a> Aggregator<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    // -- Views --

    /// Published videos (plus the viewer's own drafts when listing their own
    /// channel), ranked by search relevance first when a search is given.
    pub fn video_list(
        &self,
        params: &VideoListParams,
        viewer: Option<Uuid>,
    ) -> CoreResult<EnrichedSeq<VideoRow>> {
        let mut spec = QuerySpec::videos().search(
            params
                .search
                .as_deref()
                .and_then(SearchTerms::parse),
        );

        if let Some(owner) = params.owner {
            Resolver::new(self.db).require_user(owner)?;
            spec = spec.owned_by(owner);
            if viewer == Some(owner) {
                spec = spec.visibility(Visibility::All);
            }
        }

        if params.sort_by.is_some() || params.order.is_some() {
            let field = match params.sort_by.as_deref() {
                Some(raw) => SortField::parse(raw)?,
                None => SortField::CreatedAt,
            };
            let order = match params.order.as_deref() {
                Some(raw) => SortOrder::parse(raw)?,
                None => SortOrder::Desc,
            };
            spec = spec.sorted(Sort { field, order });
        }

        self.videos(&spec, viewer)
    }

    /// One video with engagement, owner profile and channel summary.
    /// Drafts are only visible to their owner.
    pub fn video_detail(&self, video_id: Uuid, viewer: Option<Uuid>) -> CoreResult<VideoDetail> {
        let found = Resolver::new(self.db).require(EntityKind::Video, video_id)?;
        if !found.visible_to(viewer) {
            return Err(CoreError::NotFound(format!("video {} not found", video_id)));
        }

        let row = self
            .db
            .get_video(video_id)?
            .ok_or_else(|| CoreError::NotFound(format!("video {} not found", video_id)))?;
        let owner = row.owner_id;

        let mut seq = self.enrich(vec![row], TargetKind::Video, &QuerySpec::videos(), viewer, None)?;
        let video = seq
            .next()
            .ok_or_else(|| CoreError::NotFound(format!("video {} not found", video_id)))?;

        let is_subscribed = match viewer {
            Some(v) => self.db.is_subscribed(v, owner)?,
            None => false,
        };
        Ok(VideoDetail {
            video,
            channel: ChannelSummary {
                subscribers_count: self.db.count_subscribers(owner)?,
                is_subscribed,
            },
        })
    }

    /// Videos `actor` currently likes, most recently liked first.
    pub fn liked_videos(&self, actor: Uuid) -> CoreResult<EnrichedSeq<VideoRow>> {
        Resolver::new(self.db).require_user(actor)?;
        let spec = QuerySpec::videos()
            .liked_by(actor)
            .visibility(Visibility::PublishedOrOwnedBy(actor));
        self.videos(&spec, Some(actor))
    }

    /// Comments on a visible video, newest first, each flagged with whether
    /// the video's owner likes it.
    pub fn comment_list(
        &self,
        video_id: Uuid,
        viewer: Option<Uuid>,
    ) -> CoreResult<EnrichedSeq<CommentRow>> {
        let found = Resolver::new(self.db).require(EntityKind::Video, video_id)?;
        if !found.visible_to(viewer) {
            return Err(CoreError::NotFound(format!("video {} not found", video_id)));
        }

        let spec = QuerySpec::comments_on(video_id);
        spec.validate()?;
        let rows = self.db.list_comments(video_id)?;
        self.enrich(rows, TargetKind::Comment, &spec, viewer, found.owner_id)
    }

    pub fn tweet_list(&self, owner: Uuid, viewer: Option<Uuid>) -> CoreResult<EnrichedSeq<TweetRow>> {
        Resolver::new(self.db).require_user(owner)?;
        self.tweets(&QuerySpec::tweets().owned_by(owner), viewer)
    }

    pub fn all_tweets(&self, viewer: Option<Uuid>) -> CoreResult<EnrichedSeq<TweetRow>> {
        self.tweets(&QuerySpec::tweets(), viewer)
    }

    /// Tweets from every channel `viewer` subscribes to.
    pub fn tweet_feed(&self, viewer: Uuid) -> CoreResult<EnrichedSeq<TweetRow>> {
        Resolver::new(self.db).require_user(viewer)?;
        let channels: Vec<Uuid> = self
            .db
            .subscriptions_of(viewer)?
            .into_iter()
            .map(|s| s.channel_id)
            .collect();
        self.tweets(&QuerySpec::tweets().owned_by_any(channels), Some(viewer))
    }

    // -- Execution --

    /// Run a validated video query.
    pub fn videos(&self, spec: &QuerySpec, viewer: Option<Uuid>) -> CoreResult<EnrichedSeq<VideoRow>> {
        expect_collection(spec, Collection::Videos)?;
        spec.validate()?;
        let f = &spec.filter;

        let mut rows: Vec<VideoRow> = match f.liked_by {
            Some(actor) => {
                let ids = self.db.liked_video_ids(actor)?;
                let mut by_id: HashMap<Uuid, VideoRow> = self
                    .db
                    .get_videos(&ids)?
                    .into_iter()
                    .map(|v| (v.id, v))
                    .collect();
                ids.iter().filter_map(|id| by_id.remove(id)).collect()
            }
            None => {
                let (published_only, unless_owned_by) = match f.visibility {
                    Visibility::All => (false, None),
                    Visibility::Published => (true, None),
                    Visibility::PublishedOrOwnedBy(user) => (true, Some(user)),
                };
                self.db.list_videos(&VideoFilter {
                    owner_id: f.owner,
                    published_only,
                    unless_owned_by,
                })?
            }
        };

        // Liked rows come straight from ids; apply the remaining filters here.
        if f.liked_by.is_some() {
            rows.retain(|v| {
                f.owner.is_none_or(|o| v.owner_id == o) && visible(f.visibility, v)
            });
        }
        if let Some(owners) = &f.owners_in {
            rows.retain(|v| owners.contains(&v.owner_id));
        }

        order_videos(&mut rows, spec.sort, f.search.as_ref());
        debug!("Video query matched {} rows", rows.len());

        self.enrich(rows, TargetKind::Video, spec, viewer, None)
    }

    /// Run a validated tweet query.
    pub fn tweets(&self, spec: &QuerySpec, viewer: Option<Uuid>) -> CoreResult<EnrichedSeq<TweetRow>> {
        expect_collection(spec, Collection::Tweets)?;
        spec.validate()?;

        let mut rows = self.db.list_tweets(&TweetFilter {
            owner_id: spec.filter.owner,
            owners_in: spec.filter.owners_in.clone(),
        })?;
        if let Some(sort) = spec.sort {
            rows.sort_by(|a, b| {
                let ord = match sort.field {
                    SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                    _ => a.created_at.cmp(&b.created_at),
                };
                directed(ord, sort.order)
            });
        }

        self.enrich(rows, TargetKind::Tweet, spec, viewer, None)
    }

    /// Batch the joins the query asks for and wrap the rows.
    fn enrich<R: ContentRow>(
        &self,
        rows: Vec<R>,
        kind: TargetKind,
        spec: &QuerySpec,
        viewer: Option<Uuid>,
        video_owner: Option<Uuid>,
    ) -> CoreResult<EnrichedSeq<R>> {
        let engagement = if spec.joins.engagement {
            let ids: Vec<Uuid> = rows.iter().map(|r| r.id()).collect();
            Some(EngagementIndex::from_rows(
                self.db.engagements_for_targets(kind, &ids)?,
            ))
        } else {
            None
        };

        let profiles = if spec.joins.owner_profile {
            let mut owners: Vec<Uuid> = rows.iter().map(|r| r.owner_id()).collect();
            owners.sort_unstable();
            owners.dedup();
            let profiles: HashMap<Uuid, Profile> = self
                .db
                .get_users(&owners)?
                .values()
                .map(|u| (u.id, profile_of(u)))
                .collect();
            Some(profiles)
        } else {
            None
        };

        Ok(EnrichedSeq::new(
            rows,
            EnrichContext {
                viewer,
                engagement,
                profiles,
                video_owner,
            },
        ))
    }
}

fn expect_collection(spec: &QuerySpec, want: Collection) -> CoreResult<()> {
    if spec.collection == want {
        Ok(())
    } else {
        Err(CoreError::InvalidTarget(format!(
            "expected a {:?} query, got {:?}",
            want, spec.collection
        )))
    }
}

fn visible(visibility: Visibility, video: &VideoRow) -> bool {
    match visibility {
        Visibility::All => true,
        Visibility::Published => video.is_published,
        Visibility::PublishedOrOwnedBy(user) => video.is_published || video.owner_id == user,
    }
}

fn directed(ord: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ord,
        SortOrder::Desc => ord.reverse(),
    }
}

fn compare_by(field: SortField, a: &VideoRow, b: &VideoRow) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::Views => a.views.cmp(&b.views),
        SortField::Duration => a.duration.total_cmp(&b.duration),
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
    }
}

/// Relevance (title, then description) first when searching, then the
/// requested order, then recency. Rows arrive newest first, and the sort is
/// stable, so ties keep recency without an explicit key.
fn order_videos(rows: &mut [VideoRow], sort: Option<Sort>, search: Option<&SearchTerms>) {
    let requested = |a: &VideoRow, b: &VideoRow| match sort {
        Some(s) => directed(compare_by(s.field, a, b), s.order)
            .then_with(|| b.created_at.cmp(&a.created_at)),
        None => Ordering::Equal,
    };

    match search {
        Some(terms) => {
            let mut scored: Vec<_> = rows
                .iter()
                .map(|v| terms.score(&v.title, &v.description))
                .zip(rows.iter().cloned())
                .collect();
            scored.sort_by(|(ra, a), (rb, b)| rb.cmp(ra).then_with(|| requested(a, b)));
            for (slot, (_, row)) in rows.iter_mut().zip(scored) {
                *slot = row;
            }
        }
        None => {
            if sort.is_some() {
                rows.sort_by(requested);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn video(title: &str, views: u64, age_min: i64) -> VideoRow {
        let ts = Utc::now() - Duration::minutes(age_min);
        VideoRow {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            video_file: String::new(),
            thumbnail: String::new(),
            duration: 1.0,
            views,
            is_published: true,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn titles(rows: &[VideoRow]) -> Vec<&str> {
        rows.iter().map(|v| v.title.as_str()).collect()
    }

    #[test]
    fn test_search_ranks_before_recency() {
        let mut rows = vec![video("dog tricks", 0, 1), video("my cat video", 0, 60)];
        order_videos(&mut rows, None, SearchTerms::parse("cat video").as_ref());
        assert_eq!(titles(&rows), vec!["my cat video", "dog tricks"]);
    }

    #[test]
    fn test_search_uses_description_as_tiebreak() {
        let mut plain = video("cat", 0, 1);
        plain.description = "nothing here".into();
        let mut described = video("cat", 0, 30);
        described.description = "a cat video".into();
        described.title = "cat!".into();

        let mut rows = vec![plain, described];
        order_videos(&mut rows, None, SearchTerms::parse("cat video").as_ref());
        assert_eq!(titles(&rows), vec!["cat!", "cat"]);
    }

    #[test]
    fn test_requested_sort_then_recency() {
        let mut rows = vec![
            video("newest", 5, 1),
            video("popular", 100, 10),
            video("older", 5, 20),
        ];
        order_videos(
            &mut rows,
            Some(Sort {
                field: SortField::Views,
                order: SortOrder::Desc,
            }),
            None,
        );
        assert_eq!(titles(&rows), vec!["popular", "newest", "older"]);
    }

    #[test]
    fn test_no_sort_keeps_source_order() {
        let mut rows = vec![video("b", 0, 30), video("a", 0, 1)];
        order_videos(&mut rows, None, None);
        assert_eq!(titles(&rows), vec!["b", "a"]);
    }
}
