use axum::{
    Extension,
    extract::{Path, Query, State},
};

use vidora_core::paginate;
use vidora_core::resolver::parse_id;
use vidora_types::api::{Claims, Page, TweetView};

use crate::auth::AppState;
use crate::error::{ApiResult, ok, run_blocking};
use crate::middleware::Viewer;
use crate::pagination::PageQuery;

pub async fn user_tweets(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
    Extension(Viewer(viewer)): Extension<Viewer>,
) -> ApiResult<Page<TweetView>> {
    let owner = parse_id(&user_id)?;
    let page = run_blocking(&state, move |engine| {
        let req = query.request(engine);
        let tweets = engine.aggregator().tweet_list(owner, viewer)?;
        Ok(paginate(tweets, req))
    })
    .await?;
    ok(page, "Tweets fetched successfully")
}

pub async fn all_tweets(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    Extension(Viewer(viewer)): Extension<Viewer>,
) -> ApiResult<Page<TweetView>> {
    let page = run_blocking(&state, move |engine| {
        let req = query.request(engine);
        let tweets = engine.aggregator().all_tweets(viewer)?;
        Ok(paginate(tweets, req))
    })
    .await?;
    ok(page, "Tweets fetched successfully")
}

pub async fn feed(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Page<TweetView>> {
    let page = run_blocking(&state, move |engine| {
        let req = query.request(engine);
        let tweets = engine.aggregator().tweet_feed(claims.sub)?;
        Ok(paginate(tweets, req))
    })
    .await?;
    ok(page, "Feed fetched successfully")
}
