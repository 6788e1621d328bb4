use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use vidora_api::auth::AppStateInner;
use vidora_api::router;
use vidora_core::{CoreConfig, Engine};
use vidora_db::Database;
use vidora_db::models::{NewComment, NewUser, NewVideo};
use vidora_types::api::Claims;

const SECRET: &str = "test-secret-for-http";

struct TestApp {
    _dir: TempDir,
    db: Arc<Database>,
    app: Router,
}

impl TestApp {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db = Arc::new(Database::open(&dir.path().join("http.db")).unwrap());
        let engine = Engine::new(db.clone(), CoreConfig::default());
        let app = router(AppStateInner::new(engine, SECRET));
        Self { _dir: dir, db, app }
    }

    fn user(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.db
            .create_user(&NewUser {
                id,
                username: name.into(),
                full_name: name.into(),
                avatar: None,
                cover_image: None,
                created_at: Utc::now(),
            })
            .unwrap();
        id
    }

    fn video(&self, owner: Uuid, title: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.db
            .insert_video(&NewVideo {
                id,
                owner_id: owner,
                title: title.into(),
                description: String::new(),
                video_file: "v.mp4".into(),
                thumbnail: "v.jpg".into(),
                duration: 3.5,
                views: 7,
                is_published: true,
                created_at: Utc::now(),
            })
            .unwrap();
        id
    }

    async fn send(&self, method: &str, uri: &str, user: Option<Uuid>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(id) = user {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token(id)));
        }
        let resp = self
            .app
            .clone()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

fn token(user: Uuid) -> String {
    let claims = Claims {
        sub: user,
        username: "tester".into(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.send("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status_code"], 200);
}

#[tokio::test]
async fn test_unknown_route_uses_envelope() {
    let app = TestApp::new();
    let (status, body) = app.send("GET", "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["status_code"], 404);
    assert!(body["data"].as_object().unwrap().is_empty());

    let (status, body) = app.send("DELETE", "/health", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["status_code"], 405);
}

#[tokio::test]
async fn test_reaction_requires_token() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let v = app.video(owner, "clip");

    let (status, body) = app
        .send("PUT", &format!("/engagement/video/{}?polarity=like", v), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["status_code"], 401);
}

#[tokio::test]
async fn test_reaction_toggle_round() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let fan = app.user("fan");
    let v = app.video(owner, "clip");
    let uri = format!("/engagement/videos/{}?polarity=like", v);

    let (status, body) = app.send("PUT", &uri, Some(fan)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["state"], "like");
    assert_eq!(body["data"]["total_likes"], 1);

    let (_, body) = app.send("PUT", &uri, Some(fan)).await;
    assert_eq!(body["data"]["state"], "neutral");
    assert_eq!(body["data"]["is_liked"], false);

    let (status, body) = app
        .send("GET", &format!("/engagement/video/{}/counts", v), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_likes"], 0);
    assert_eq!(body["data"]["viewer_state"], "neutral");
}

#[tokio::test]
async fn test_reaction_errors_use_envelope() {
    let app = TestApp::new();
    let fan = app.user("fan");

    let (status, body) = app
        .send("PUT", "/engagement/playlist/abc?polarity=like", Some(fan))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .send("PUT", "/engagement/video/not-a-uuid?polarity=like", Some(fan))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            "PUT",
            &format!("/engagement/video/{}?polarity=like", Uuid::new_v4()),
            Some(fan),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status_code"], 404);
    assert!(body["data"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_combined_toggle_endpoint() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let fan = app.user("fan");
    let v = app.video(owner, "clip");
    let comment = Uuid::new_v4();
    app.db
        .insert_comment(&NewComment {
            id: comment,
            video_id: v,
            owner_id: owner,
            content: "pinned".into(),
            created_at: Utc::now(),
        })
        .unwrap();

    let (status, body) = app
        .send(
            "PUT",
            &format!("/likes/toggle?toggleLike=false&commentId={}", comment),
            Some(fan),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_disliked"], true);
    assert_eq!(body["data"]["total_dislikes"], 1);

    let (status, _) = app
        .send(
            "PUT",
            &format!("/likes/toggle?toggleLike=true&videoId={}&commentId={}", v, comment),
            Some(fan),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send("PUT", "/likes/toggle?toggleLike=true", Some(fan))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_subscription_flow() {
    let app = TestApp::new();
    let channel = app.user("channel");
    let fan = app.user("fan");

    let (status, body) = app
        .send("PUT", &format!("/subscriptions/{}", channel), Some(fan))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["subscribed"], true);

    let (_, body) = app
        .send("GET", &format!("/channels/{}/subscribers?page=1&limit=5", channel), None)
        .await;
    assert_eq!(body["data"]["total_items"], 1);
    assert_eq!(body["data"]["items"][0]["username"], "fan");
    assert_eq!(body["data"]["items"][0]["is_subscribed_back"], false);

    let (_, body) = app
        .send("GET", &format!("/users/{}/subscriptions", fan), Some(fan))
        .await;
    assert_eq!(body["data"]["items"][0]["id"], channel.to_string());
    assert_eq!(body["data"]["items"][0]["is_subscribed"], true);
    assert_eq!(body["data"]["items"][0]["subscribers_count"], 1);

    let (_, body) = app
        .send("GET", &format!("/channels/c/{}", "channel"), Some(fan))
        .await;
    assert_eq!(body["data"]["subscribers_count"], 1);
    assert_eq!(body["data"]["is_subscribed"], true);

    let (_, body) = app
        .send("PUT", &format!("/subscriptions/{}", channel), Some(fan))
        .await;
    assert_eq!(body["data"]["subscribed"], false);

    let (status, body) = app
        .send("GET", &format!("/channels/{}/subscribers", channel), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_items"], 0);
    assert_eq!(body["data"]["total_pages"], 0);
    assert!(body["data"]["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_video_list_anonymous_flags_false() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let fan = app.user("fan");
    let v = app.video(owner, "cat video");
    app.video(owner, "gardening");

    app.send("PUT", &format!("/engagement/video/{}?polarity=like", v), Some(fan))
        .await;

    let (status, body) = app
        .send("GET", "/videos?search=cat%20video&limit=1&page=1", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["total_items"], 2);
    assert_eq!(data["total_pages"], 2);
    assert_eq!(data["has_next"], true);
    let first = &data["items"][0];
    assert_eq!(first["id"], v.to_string());
    assert_eq!(first["total_likes"], 1);
    assert_eq!(first["is_liked"], false);
    assert_eq!(first["is_disliked"], false);
    assert_eq!(first["is_owner"], false);
    assert_eq!(first["owner"]["username"], "owner");

    let (_, body) = app.send("GET", "/videos?search=cat", Some(fan)).await;
    assert_eq!(body["data"]["items"][0]["is_liked"], true);

    let (_, body) = app.send("GET", "/users/me/liked-videos", Some(fan)).await;
    assert_eq!(body["data"]["total_items"], 1);

    let (status, _) = app.send("GET", "/videos?sortBy=likes", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_video_detail_and_comments() {
    let app = TestApp::new();
    let owner = app.user("owner");
    let v = app.video(owner, "clip");

    let (status, body) = app.send("GET", &format!("/videos/{}", v), Some(owner)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_owner"], true);
    assert_eq!(body["data"]["channel"]["subscribers_count"], 0);

    let (status, body) = app
        .send("GET", &format!("/videos/{}/comments", v), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_items"], 0);

    let (status, _) = app
        .send("GET", &format!("/videos/{}/comments", Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_token_reads_as_anonymous() {
    let app = TestApp::new();
    let owner = app.user("owner");
    app.video(owner, "clip");

    let resp = app
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/videos")
                .header(header::AUTHORIZATION, "Bearer garbage")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let (status, _) = app.send("GET", "/tweets/feed", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
