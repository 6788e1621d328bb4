pub mod auth;
pub mod channels;
pub mod engagement;
pub mod error;
pub mod middleware;
pub mod pagination;
pub mod subscriptions;
pub mod tweets;
pub mod videos;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, put},
};

use auth::AppState;
use middleware::{optional_auth, require_auth};

/// All HTTP routes. Writes and per-user listings need a valid token; other
/// reads accept anonymous viewers.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/engagement/{kind}/{id}", put(engagement::set_reaction))
        .route("/likes/toggle", put(engagement::toggle_like))
        .route("/subscriptions/{channel_id}", put(subscriptions::toggle_subscription))
        .route("/tweets/feed", get(tweets::feed))
        .route("/users/me/liked-videos", get(videos::liked_videos))
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    let public = Router::new()
        .route("/engagement/{kind}/{id}/counts", get(engagement::reaction_counts))
        .route("/channels/{channel_id}/subscribers", get(subscriptions::channel_subscribers))
        .route("/channels/{channel_id}/stats", get(channels::channel_stats))
        .route("/channels/c/{handle}", get(channels::channel_profile))
        .route("/users/{user_id}/subscriptions", get(subscriptions::subscribed_channels))
        .route("/users/{user_id}/tweets", get(tweets::user_tweets))
        .route("/videos", get(videos::list_videos))
        .route("/videos/{video_id}", get(videos::video_detail))
        .route("/videos/{video_id}/comments", get(videos::video_comments))
        .route("/tweets", get(tweets::all_tweets))
        .layer(axum_middleware::from_fn_with_state(state.clone(), optional_auth));

    Router::new()
        .merge(protected)
        .merge(public)
        .route("/health", get(channels::health))
        .fallback(channels::not_found)
        .method_not_allowed_fallback(channels::method_not_allowed)
        .with_state(state)
}
