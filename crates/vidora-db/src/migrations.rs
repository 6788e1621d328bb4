use rusqlite::Connection;
use tracing::info;

use crate::StoreResult;

pub fn run(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (content + engagement schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                full_name   TEXT NOT NULL,
                avatar      TEXT,
                cover_image TEXT,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE videos (
                id           TEXT PRIMARY KEY,
                owner_id     TEXT NOT NULL REFERENCES users(id),
                title        TEXT NOT NULL,
                description  TEXT NOT NULL DEFAULT '',
                video_file   TEXT NOT NULL,
                thumbnail    TEXT NOT NULL,
                duration     REAL NOT NULL DEFAULT 0,
                views        INTEGER NOT NULL DEFAULT 0,
                is_published INTEGER NOT NULL DEFAULT 1,
                created_at   TEXT NOT NULL,
                updated_at   TEXT NOT NULL
            );

            CREATE INDEX idx_videos_owner ON videos(owner_id, created_at);
            CREATE INDEX idx_videos_created ON videos(created_at);

            CREATE TABLE comments (
                id          TEXT PRIMARY KEY,
                video_id    TEXT NOT NULL REFERENCES videos(id),
                owner_id    TEXT NOT NULL REFERENCES users(id),
                content     TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX idx_comments_video ON comments(video_id, created_at);

            CREATE TABLE tweets (
                id          TEXT PRIMARY KEY,
                owner_id    TEXT NOT NULL REFERENCES users(id),
                content     TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX idx_tweets_owner ON tweets(owner_id, created_at);

            -- Exactly one target column is set per row.
            CREATE TABLE engagements (
                id          TEXT PRIMARY KEY,
                actor_id    TEXT NOT NULL REFERENCES users(id),
                video_id    TEXT REFERENCES videos(id),
                comment_id  TEXT REFERENCES comments(id),
                tweet_id    TEXT REFERENCES tweets(id),
                liked       INTEGER NOT NULL,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL,
                CHECK ((video_id IS NOT NULL) + (comment_id IS NOT NULL) + (tweet_id IS NOT NULL) = 1)
            );

            CREATE UNIQUE INDEX uq_engagements_actor_video
                ON engagements(actor_id, video_id) WHERE video_id IS NOT NULL;
            CREATE UNIQUE INDEX uq_engagements_actor_comment
                ON engagements(actor_id, comment_id) WHERE comment_id IS NOT NULL;
            CREATE UNIQUE INDEX uq_engagements_actor_tweet
                ON engagements(actor_id, tweet_id) WHERE tweet_id IS NOT NULL;

            CREATE INDEX idx_engagements_video
                ON engagements(video_id, liked) WHERE video_id IS NOT NULL;
            CREATE INDEX idx_engagements_comment
                ON engagements(comment_id, liked) WHERE comment_id IS NOT NULL;
            CREATE INDEX idx_engagements_tweet
                ON engagements(tweet_id, liked) WHERE tweet_id IS NOT NULL;

            CREATE TABLE subscriptions (
                id            TEXT PRIMARY KEY,
                subscriber_id TEXT NOT NULL REFERENCES users(id),
                channel_id    TEXT NOT NULL REFERENCES users(id),
                created_at    TEXT NOT NULL,
                UNIQUE(subscriber_id, channel_id)
            );

            CREATE INDEX idx_subscriptions_channel ON subscriptions(channel_id, created_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
