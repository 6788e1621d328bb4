use std::collections::HashMap;

use rusqlite::Row;
use uuid::Uuid;

use crate::models::{NewUser, UserRow, format_ts, get_ts, get_uuid};
use crate::{Database, OptionalExt, StoreResult, query_by_keys};

const USER_COLUMNS: &str = "id, username, full_name, avatar, cover_image, created_at";

impl Database {
    pub fn create_user(&self, user: &NewUser) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, full_name, avatar, cover_image, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    user.id.to_string(),
                    user.username,
                    user.full_name,
                    user.avatar,
                    user.cover_image,
                    format_ts(user.created_at),
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_user(&self, id: Uuid) -> StoreResult<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                [id.to_string()],
                map_user,
            )
            .optional()
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM users WHERE username = ?1 COLLATE NOCASE", USER_COLUMNS),
                [username],
                map_user,
            )
            .optional()
        })
    }

    /// Batch-fetch users keyed by id. Missing ids are simply absent.
    pub fn get_users(&self, ids: &[Uuid]) -> StoreResult<HashMap<Uuid, UserRow>> {
        self.with_conn(|conn| {
            let rows = query_by_keys(
                conn,
                &format!("SELECT {} FROM users WHERE id IN ({{keys}})", USER_COLUMNS),
                &[],
                ids,
                map_user,
            )?;
            Ok(rows.into_iter().map(|u| (u.id, u)).collect())
        })
    }
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: get_uuid(row, 0)?,
        username: row.get(1)?,
        full_name: row.get(2)?,
        avatar: row.get(3)?,
        cover_image: row.get(4)?,
        created_at: get_ts(row, 5)?,
    })
}
