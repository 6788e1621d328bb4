#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use tempfile::TempDir;
use uuid::Uuid;

use vidora_core::{CoreConfig, Engine};
use vidora_db::Database;
use vidora_db::models::{NewComment, NewTweet, NewUser, NewVideo};

/// Engine over a fresh on-disk database. Keep the `TempDir` alive for the
/// duration of the test.
pub struct Fixture {
    _dir: TempDir,
    pub engine: Engine,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(CoreConfig::default())
    }

    pub fn with_config(config: CoreConfig) -> Self {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("vidora.db")).unwrap();
        Self {
            _dir: dir,
            engine: Engine::new(Arc::new(db), config),
        }
    }

    pub fn db(&self) -> &Database {
        self.engine.db()
    }

    pub fn user(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.db()
            .create_user(&NewUser {
                id,
                username: name.to_string(),
                full_name: format!("{} full", name),
                avatar: Some(format!("https://cdn.test/{}.png", name)),
                cover_image: None,
                created_at: Utc::now(),
            })
            .unwrap();
        id
    }

    pub fn video(&self, owner: Uuid, title: &str) -> Uuid {
        self.video_with(owner, title, "", true, 0)
    }

    pub fn video_with(
        &self,
        owner: Uuid,
        title: &str,
        description: &str,
        published: bool,
        age_min: i64,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.db()
            .insert_video(&NewVideo {
                id,
                owner_id: owner,
                title: title.to_string(),
                description: description.to_string(),
                video_file: format!("https://cdn.test/{}.mp4", id),
                thumbnail: format!("https://cdn.test/{}.jpg", id),
                duration: 42.0,
                views: 0,
                is_published: published,
                created_at: Utc::now() - Duration::minutes(age_min),
            })
            .unwrap();
        id
    }

    pub fn comment(&self, video: Uuid, owner: Uuid, content: &str, age_min: i64) -> Uuid {
        let id = Uuid::new_v4();
        self.db()
            .insert_comment(&NewComment {
                id,
                video_id: video,
                owner_id: owner,
                content: content.to_string(),
                created_at: Utc::now() - Duration::minutes(age_min),
            })
            .unwrap();
        id
    }

    pub fn tweet(&self, owner: Uuid, content: &str, age_min: i64) -> Uuid {
        let id = Uuid::new_v4();
        self.db()
            .insert_tweet(&NewTweet {
                id,
                owner_id: owner,
                content: content.to_string(),
                created_at: Utc::now() - Duration::minutes(age_min),
            })
            .unwrap();
        id
    }
}
