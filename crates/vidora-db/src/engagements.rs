//! Engagement rows: one per (actor, target), `liked` carries the polarity.
//!
//! The free functions take a bare `&Connection` so callers can compose them
//! inside a single `Database::with_tx` transaction.

use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use vidora_types::models::{Polarity, Target, TargetKind};

use crate::models::{EngagementRow, format_ts, get_count, get_ts, get_uuid, target_column};
use crate::{Database, OptionalExt, StoreResult, query_by_keys};

/// Existing reaction of `actor` on `target`: (row id, polarity).
pub fn find(
    conn: &Connection,
    actor_id: Uuid,
    target: Target,
) -> StoreResult<Option<(Uuid, Polarity)>> {
    conn.query_row(
        &format!(
            "SELECT id, liked FROM engagements WHERE actor_id = ?1 AND {} = ?2",
            target_column(target.kind)
        ),
        [actor_id.to_string(), target.id.to_string()],
        |row| Ok((get_uuid(row, 0)?, Polarity::from_liked(row.get(1)?))),
    )
    .optional()
}

pub fn insert(
    conn: &Connection,
    actor_id: Uuid,
    target: Target,
    polarity: Polarity,
) -> StoreResult<Uuid> {
    let id = Uuid::new_v4();
    let now = format_ts(Utc::now());
    conn.execute(
        &format!(
            "INSERT INTO engagements (id, actor_id, {}, liked, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            target_column(target.kind)
        ),
        rusqlite::params![
            id.to_string(),
            actor_id.to_string(),
            target.id.to_string(),
            polarity.is_like(),
            now,
        ],
    )?;
    Ok(id)
}

/// Returns the number of rows changed.
pub fn set_polarity(conn: &Connection, id: Uuid, polarity: Polarity) -> StoreResult<usize> {
    let changed = conn.execute(
        "UPDATE engagements SET liked = ?1, updated_at = ?2 WHERE id = ?3",
        rusqlite::params![polarity.is_like(), format_ts(Utc::now()), id.to_string()],
    )?;
    Ok(changed)
}

/// Returns the number of rows removed.
pub fn delete(conn: &Connection, id: Uuid) -> StoreResult<usize> {
    let removed = conn.execute("DELETE FROM engagements WHERE id = ?1", [id.to_string()])?;
    Ok(removed)
}

/// (likes, dislikes) on a target.
pub fn count(conn: &Connection, target: Target) -> StoreResult<(u64, u64)> {
    let totals = conn.query_row(
        &format!(
            "SELECT COALESCE(SUM(liked = 1), 0), COALESCE(SUM(liked = 0), 0)
             FROM engagements WHERE {} = ?1",
            target_column(target.kind)
        ),
        [target.id.to_string()],
        |row| Ok((get_count(row, 0)?, get_count(row, 1)?)),
    )?;
    Ok(totals)
}

pub fn delete_for_target(conn: &Connection, target: Target) -> StoreResult<u64> {
    let removed = conn.execute(
        &format!(
            "DELETE FROM engagements WHERE {} = ?1",
            target_column(target.kind)
        ),
        [target.id.to_string()],
    )?;
    Ok(removed as u64)
}

/// All engagement rows on any of `ids`, batched.
pub fn for_targets(
    conn: &Connection,
    kind: TargetKind,
    ids: &[Uuid],
) -> StoreResult<Vec<EngagementRow>> {
    let column = target_column(kind);
    query_by_keys(
        conn,
        &format!(
            "SELECT id, actor_id, {col}, liked, updated_at FROM engagements
             WHERE {col} IN ({{keys}})",
            col = column
        ),
        &[],
        ids,
        |row| {
            Ok(EngagementRow {
                id: get_uuid(row, 0)?,
                actor_id: get_uuid(row, 1)?,
                target_id: get_uuid(row, 2)?,
                polarity: Polarity::from_liked(row.get(3)?),
                updated_at: get_ts(row, 4)?,
            })
        },
    )
}

impl Database {
    pub fn find_engagement(
        &self,
        actor_id: Uuid,
        target: Target,
    ) -> StoreResult<Option<Polarity>> {
        self.with_conn(|conn| Ok(find(conn, actor_id, target)?.map(|(_, p)| p)))
    }

    pub fn count_engagements(&self, target: Target) -> StoreResult<(u64, u64)> {
        self.with_conn(|conn| count(conn, target))
    }

    pub fn engagements_for_targets(
        &self,
        kind: TargetKind,
        ids: &[Uuid],
    ) -> StoreResult<Vec<EngagementRow>> {
        self.with_conn(|conn| for_targets(conn, kind, ids))
    }

    /// Videos `actor` currently likes, most recently reacted first.
    pub fn liked_video_ids(&self, actor_id: Uuid) -> StoreResult<Vec<Uuid>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT video_id FROM engagements
                 WHERE actor_id = ?1 AND video_id IS NOT NULL AND liked = 1
                 ORDER BY updated_at DESC, id",
            )?;
            let ids = stmt
                .query_map([actor_id.to_string()], |row| get_uuid(row, 0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ids)
        })
    }

    /// Likes received across every video a channel owns.
    pub fn likes_on_owned_videos(&self, owner_id: Uuid) -> StoreResult<u64> {
        self.with_conn(|conn| {
            let total = conn.query_row(
                "SELECT COUNT(*) FROM engagements e
                 JOIN videos v ON v.id = e.video_id
                 WHERE v.owner_id = ?1 AND e.liked = 1",
                [owner_id.to_string()],
                |row| get_count(row, 0),
            )?;
            Ok(total)
        })
    }
}
