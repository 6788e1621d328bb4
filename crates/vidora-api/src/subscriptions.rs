use axum::{
    Extension,
    extract::{Path, Query, State},
};

use vidora_core::paginate;
use vidora_core::resolver::parse_id;
use vidora_types::api::{Claims, Page, SubscribedChannel, SubscriberEntry, SubscriptionToggle};

use crate::auth::AppState;
use crate::error::{ApiResult, ok, run_blocking};
use crate::middleware::Viewer;
use crate::pagination::PageQuery;

pub async fn toggle_subscription(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<SubscriptionToggle> {
    let channel = parse_id(&channel_id)?;
    let out = run_blocking(&state, move |engine| {
        engine.relationships().toggle_subscription(claims.sub, channel)
    })
    .await?;

    let message = if out.subscribed {
        "Subscribed successfully"
    } else {
        "Unsubscribed successfully"
    };
    ok(out, message)
}

pub async fn channel_subscribers(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<SubscriberEntry>> {
    let channel = parse_id(&channel_id)?;
    let page = run_blocking(&state, move |engine| {
        let req = query.request(engine);
        let subscribers = engine.relationships().list_subscribers(channel)?;
        Ok(paginate(subscribers.into_iter(), req))
    })
    .await?;
    ok(page, "Subscribers fetched successfully")
}

pub async fn subscribed_channels(
    State(state): State<AppState>,
    Path(subscriber_id): Path<String>,
    Query(query): Query<PageQuery>,
    Extension(Viewer(viewer)): Extension<Viewer>,
) -> ApiResult<Page<SubscribedChannel>> {
    let subscriber = parse_id(&subscriber_id)?;
    let page = run_blocking(&state, move |engine| {
        let req = query.request(engine);
        let channels = engine.relationships().list_subscriptions(subscriber, viewer)?;
        Ok(paginate(channels.into_iter(), req))
    })
    .await?;
    ok(page, "Subscribed channels fetched successfully")
}
