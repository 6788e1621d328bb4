use rusqlite::{Connection, Row};
use tracing::info;
use uuid::Uuid;

use vidora_types::models::{EntityKind, Target, TargetKind};

use crate::engagements;
use crate::models::{
    CommentRow, EntityRef, NewComment, NewTweet, NewVideo, TweetRow, VideoRow, format_ts,
    get_count, get_ts, get_uuid,
};
use crate::{Database, OptionalExt, StoreResult, query_by_keys};

const VIDEO_COLUMNS: &str = "id, owner_id, title, description, video_file, thumbnail, duration, views, is_published, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, video_id, owner_id, content, created_at, updated_at";
const TWEET_COLUMNS: &str = "id, owner_id, content, created_at, updated_at";

/// Store-side video filter. Publication is applied here so unpublished rows
/// never leave SQLite for viewers who cannot see them.
#[derive(Debug, Clone, Default)]
pub struct VideoFilter {
    pub owner_id: Option<Uuid>,
    pub published_only: bool,
    /// With `published_only`, still keep this user's own unpublished videos.
    pub unless_owned_by: Option<Uuid>,
}

/// Store-side tweet filter. `owners_in = Some(vec![])` matches nothing.
#[derive(Debug, Clone, Default)]
pub struct TweetFilter {
    pub owner_id: Option<Uuid>,
    pub owners_in: Option<Vec<Uuid>>,
}

impl Database {
    // -- Lookups --

    /// Existence + ownership probe used by the reference resolver.
    pub fn lookup_entity(&self, kind: EntityKind, id: Uuid) -> StoreResult<Option<EntityRef>> {
        self.with_conn(|conn| lookup_entity(conn, kind, id))
    }

    pub fn get_video(&self, id: Uuid) -> StoreResult<Option<VideoRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM videos WHERE id = ?1", VIDEO_COLUMNS),
                [id.to_string()],
                map_video,
            )
            .optional()
        })
    }

    pub fn get_videos(&self, ids: &[Uuid]) -> StoreResult<Vec<VideoRow>> {
        self.with_conn(|conn| {
            query_by_keys(
                conn,
                &format!("SELECT {} FROM videos WHERE id IN ({{keys}})", VIDEO_COLUMNS),
                &[],
                ids,
                map_video,
            )
        })
    }

    /// Videos matching `filter`, newest first.
    pub fn list_videos(&self, filter: &VideoFilter) -> StoreResult<Vec<VideoRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM videos
                 WHERE (?1 IS NULL OR owner_id = ?1)
                   AND (?2 = 0 OR is_published = 1 OR (?3 IS NOT NULL AND owner_id = ?3))
                 ORDER BY created_at DESC",
                VIDEO_COLUMNS
            ))?;

            let rows = stmt
                .query_map(
                    rusqlite::params![
                        filter.owner_id.map(|id| id.to_string()),
                        filter.published_only,
                        filter.unless_owned_by.map(|id| id.to_string()),
                    ],
                    map_video,
                )?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Comments on a video, newest first.
    pub fn list_comments(&self, video_id: Uuid) -> StoreResult<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM comments WHERE video_id = ?1 ORDER BY created_at DESC",
                COMMENT_COLUMNS
            ))?;
            let rows = stmt
                .query_map([video_id.to_string()], map_comment)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Tweets matching `filter`, newest first.
    pub fn list_tweets(&self, filter: &TweetFilter) -> StoreResult<Vec<TweetRow>> {
        self.with_conn(|conn| match &filter.owners_in {
            Some(owners) => {
                let mut rows = query_by_keys(
                    conn,
                    &format!(
                        "SELECT {} FROM tweets WHERE owner_id IN ({{keys}})",
                        TWEET_COLUMNS
                    ),
                    &[],
                    owners,
                    map_tweet,
                )?;
                if let Some(owner) = filter.owner_id {
                    rows.retain(|t| t.owner_id == owner);
                }
                // Batches come back unordered relative to each other.
                rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                Ok(rows)
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM tweets
                     WHERE (?1 IS NULL OR owner_id = ?1)
                     ORDER BY created_at DESC",
                    TWEET_COLUMNS
                ))?;
                let rows = stmt
                    .query_map([filter.owner_id.map(|id| id.to_string())], map_tweet)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            }
        })
    }

    /// (video count, summed views) for a channel.
    pub fn channel_video_totals(&self, owner_id: Uuid) -> StoreResult<(u64, u64)> {
        self.with_conn(|conn| {
            let totals = conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(views), 0) FROM videos WHERE owner_id = ?1",
                [owner_id.to_string()],
                |row| Ok((get_count(row, 0)?, get_count(row, 1)?)),
            )?;
            Ok(totals)
        })
    }

    // -- Inserts (content collaborators and fixtures) --

    pub fn insert_video(&self, video: &NewVideo) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            let ts = format_ts(video.created_at);
            conn.execute(
                "INSERT INTO videos (id, owner_id, title, description, video_file, thumbnail, duration, views, is_published, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
                rusqlite::params![
                    video.id.to_string(),
                    video.owner_id.to_string(),
                    video.title,
                    video.description,
                    video.video_file,
                    video.thumbnail,
                    video.duration,
                    video.views as i64,
                    video.is_published,
                    ts,
                ],
            )?;
            Ok(())
        })
    }

    pub fn insert_comment(&self, comment: &NewComment) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            let ts = format_ts(comment.created_at);
            conn.execute(
                "INSERT INTO comments (id, video_id, owner_id, content, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                rusqlite::params![
                    comment.id.to_string(),
                    comment.video_id.to_string(),
                    comment.owner_id.to_string(),
                    comment.content,
                    ts,
                ],
            )?;
            Ok(())
        })
    }

    pub fn insert_tweet(&self, tweet: &NewTweet) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            let ts = format_ts(tweet.created_at);
            conn.execute(
                "INSERT INTO tweets (id, owner_id, content, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                rusqlite::params![tweet.id.to_string(), tweet.owner_id.to_string(), tweet.content, ts],
            )?;
            Ok(())
        })
    }

    // -- Deletes --

    /// Delete a content entity together with every engagement pointing at it.
    /// A video also takes its comments (and their engagements) with it.
    /// Returns the number of engagement rows removed; Ok(None) when the
    /// target did not exist.
    pub fn delete_content(&self, target: Target) -> StoreResult<Option<u64>> {
        self.with_tx(|conn| {
            if lookup_entity(conn, target.kind.into(), target.id)?.is_none() {
                return Ok(None);
            }

            let mut removed = engagements::delete_for_target(conn, target)?;
            let id = target.id.to_string();

            match target.kind {
                TargetKind::Video => {
                    removed += conn.execute(
                        "DELETE FROM engagements WHERE comment_id IN
                            (SELECT id FROM comments WHERE video_id = ?1)",
                        [&id],
                    )? as u64;
                    conn.execute("DELETE FROM comments WHERE video_id = ?1", [&id])?;
                    conn.execute("DELETE FROM videos WHERE id = ?1", [&id])?;
                }
                TargetKind::Comment => {
                    conn.execute("DELETE FROM comments WHERE id = ?1", [&id])?;
                }
                TargetKind::Tweet => {
                    conn.execute("DELETE FROM tweets WHERE id = ?1", [&id])?;
                }
            }

            info!("Deleted {} with {} engagements", target, removed);
            Ok(Some(removed))
        })
    }
}

pub fn lookup_entity(
    conn: &Connection,
    kind: EntityKind,
    id: Uuid,
) -> StoreResult<Option<EntityRef>> {
    let id = id.to_string();
    let found = match kind {
        EntityKind::User => conn
            .query_row("SELECT id FROM users WHERE id = ?1", [&id], |_| {
                Ok(EntityRef {
                    owner_id: None,
                    is_published: None,
                    video_owner_id: None,
                })
            })
            .optional()?,
        EntityKind::Video => conn
            .query_row(
                "SELECT owner_id, is_published FROM videos WHERE id = ?1",
                [&id],
                |row| {
                    let owner = get_uuid(row, 0)?;
                    Ok(EntityRef {
                        owner_id: Some(owner),
                        is_published: Some(row.get(1)?),
                        video_owner_id: Some(owner),
                    })
                },
            )
            .optional()?,
        EntityKind::Comment => conn
            .query_row(
                "SELECT c.owner_id, v.is_published, v.owner_id
                 FROM comments c JOIN videos v ON v.id = c.video_id
                 WHERE c.id = ?1",
                [&id],
                |row| {
                    Ok(EntityRef {
                        owner_id: Some(get_uuid(row, 0)?),
                        is_published: Some(row.get(1)?),
                        video_owner_id: Some(get_uuid(row, 2)?),
                    })
                },
            )
            .optional()?,
        EntityKind::Tweet => conn
            .query_row("SELECT owner_id FROM tweets WHERE id = ?1", [&id], |row| {
                Ok(EntityRef {
                    owner_id: Some(get_uuid(row, 0)?),
                    is_published: None,
                    video_owner_id: None,
                })
            })
            .optional()?,
    };
    Ok(found)
}

fn map_video(row: &Row<'_>) -> rusqlite::Result<VideoRow> {
    Ok(VideoRow {
        id: get_uuid(row, 0)?,
        owner_id: get_uuid(row, 1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        video_file: row.get(4)?,
        thumbnail: row.get(5)?,
        duration: row.get(6)?,
        views: get_count(row, 7)?,
        is_published: row.get(8)?,
        created_at: get_ts(row, 9)?,
        updated_at: get_ts(row, 10)?,
    })
}

fn map_comment(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: get_uuid(row, 0)?,
        video_id: get_uuid(row, 1)?,
        owner_id: get_uuid(row, 2)?,
        content: row.get(3)?,
        created_at: get_ts(row, 4)?,
        updated_at: get_ts(row, 5)?,
    })
}

fn map_tweet(row: &Row<'_>) -> rusqlite::Result<TweetRow> {
    Ok(TweetRow {
        id: get_uuid(row, 0)?,
        owner_id: get_uuid(row, 1)?,
        content: row.get(2)?,
        created_at: get_ts(row, 3)?,
        updated_at: get_ts(row, 4)?,
    })
}
