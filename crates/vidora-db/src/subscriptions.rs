use std::collections::{HashMap, HashSet};

use chrono::Utc;
use rusqlite::{Connection, Row};
use uuid::Uuid;

use crate::models::{SubscriptionRow, format_ts, get_count, get_ts, get_uuid};
use crate::{Database, OptionalExt, StoreResult, query_by_keys};

/// Existing subscription id for the (subscriber, channel) pair.
pub fn find(conn: &Connection, subscriber_id: Uuid, channel_id: Uuid) -> StoreResult<Option<Uuid>> {
    conn.query_row(
        "SELECT id FROM subscriptions WHERE subscriber_id = ?1 AND channel_id = ?2",
        [subscriber_id.to_string(), channel_id.to_string()],
        |row| get_uuid(row, 0),
    )
    .optional()
}

pub fn insert(conn: &Connection, subscriber_id: Uuid, channel_id: Uuid) -> StoreResult<Uuid> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO subscriptions (id, subscriber_id, channel_id, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            id.to_string(),
            subscriber_id.to_string(),
            channel_id.to_string(),
            format_ts(Utc::now()),
        ],
    )?;
    Ok(id)
}

pub fn delete(conn: &Connection, id: Uuid) -> StoreResult<usize> {
    let removed = conn.execute("DELETE FROM subscriptions WHERE id = ?1", [id.to_string()])?;
    Ok(removed)
}

impl Database {
    /// Subscriptions pointing at `channel_id`, newest first.
    pub fn subscribers_of(&self, channel_id: Uuid) -> StoreResult<Vec<SubscriptionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, subscriber_id, channel_id, created_at FROM subscriptions
                 WHERE channel_id = ?1 ORDER BY created_at DESC, id",
            )?;
            let rows = stmt
                .query_map([channel_id.to_string()], map_subscription)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Subscriptions held by `subscriber_id`, newest first.
    pub fn subscriptions_of(&self, subscriber_id: Uuid) -> StoreResult<Vec<SubscriptionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, subscriber_id, channel_id, created_at FROM subscriptions
                 WHERE subscriber_id = ?1 ORDER BY created_at DESC, id",
            )?;
            let rows = stmt
                .query_map([subscriber_id.to_string()], map_subscription)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn is_subscribed(&self, subscriber_id: Uuid, channel_id: Uuid) -> StoreResult<bool> {
        self.with_conn(|conn| Ok(find(conn, subscriber_id, channel_id)?.is_some()))
    }

    pub fn count_subscribers(&self, channel_id: Uuid) -> StoreResult<u64> {
        self.with_conn(|conn| {
            let n = conn.query_row(
                "SELECT COUNT(*) FROM subscriptions WHERE channel_id = ?1",
                [channel_id.to_string()],
                |row| get_count(row, 0),
            )?;
            Ok(n)
        })
    }

    pub fn count_subscriptions(&self, subscriber_id: Uuid) -> StoreResult<u64> {
        self.with_conn(|conn| {
            let n = conn.query_row(
                "SELECT COUNT(*) FROM subscriptions WHERE subscriber_id = ?1",
                [subscriber_id.to_string()],
                |row| get_count(row, 0),
            )?;
            Ok(n)
        })
    }

    /// Subscriber counts for many channels in one pass. Channels with no
    /// subscribers are absent from the map.
    pub fn subscriber_counts(&self, channel_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, u64>> {
        self.with_conn(|conn| {
            let rows = query_by_keys(
                conn,
                "SELECT channel_id, COUNT(*) FROM subscriptions
                 WHERE channel_id IN ({keys}) GROUP BY channel_id",
                &[],
                channel_ids,
                |row| Ok((get_uuid(row, 0)?, get_count(row, 1)?)),
            )?;
            Ok(rows.into_iter().collect())
        })
    }

    /// Which of `channel_ids` the subscriber follows.
    pub fn subscribed_among(
        &self,
        subscriber_id: Uuid,
        channel_ids: &[Uuid],
    ) -> StoreResult<HashSet<Uuid>> {
        self.with_conn(|conn| {
            let rows = query_by_keys(
                conn,
                "SELECT channel_id FROM subscriptions
                 WHERE subscriber_id = ?1 AND channel_id IN ({keys})",
                &[subscriber_id.to_string()],
                channel_ids,
                |row| get_uuid(row, 0),
            )?;
            Ok(rows.into_iter().collect())
        })
    }
}

fn map_subscription(row: &Row<'_>) -> rusqlite::Result<SubscriptionRow> {
    Ok(SubscriptionRow {
        id: get_uuid(row, 0)?,
        subscriber_id: get_uuid(row, 1)?,
        channel_id: get_uuid(row, 2)?,
        created_at: get_ts(row, 3)?,
    })
}
