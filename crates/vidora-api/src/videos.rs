use axum::{
    Extension,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use vidora_core::aggregate::VideoListParams;
use vidora_core::paginate;
use vidora_core::resolver::parse_id;
use vidora_types::api::{Claims, CommentView, Page, VideoDetail, VideoView};

use crate::auth::AppState;
use crate::error::{ApiResult, ok, run_blocking};
use crate::middleware::Viewer;
use crate::pagination::PageQuery;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListQuery {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

pub async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<VideoListQuery>,
    Extension(Viewer(viewer)): Extension<Viewer>,
) -> ApiResult<Page<VideoView>> {
    let owner = match query.user_id.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(raw) => Some(parse_id(raw)?),
        None => None,
    };
    let params = VideoListParams {
        search: query.search,
        sort_by: query.sort_by,
        order: query.order,
        owner,
    };

    let page = run_blocking(&state, move |engine| {
        let req = query.page.request(engine);
        let videos = engine.aggregator().video_list(&params, viewer)?;
        Ok(paginate(videos, req))
    })
    .await?;
    ok(page, "Videos fetched successfully")
}

pub async fn video_detail(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Extension(Viewer(viewer)): Extension<Viewer>,
) -> ApiResult<VideoDetail> {
    let id = parse_id(&video_id)?;
    let detail = run_blocking(&state, move |engine| {
        engine.aggregator().video_detail(id, viewer)
    })
    .await?;
    ok(detail, "Video fetched successfully")
}

pub async fn video_comments(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(query): Query<PageQuery>,
    Extension(Viewer(viewer)): Extension<Viewer>,
) -> ApiResult<Page<CommentView>> {
    let id = parse_id(&video_id)?;
    let page = run_blocking(&state, move |engine| {
        let req = query.request(engine);
        let comments = engine.aggregator().comment_list(id, viewer)?;
        Ok(paginate(comments, req))
    })
    .await?;
    ok(page, "Comments fetched successfully")
}

pub async fn liked_videos(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Page<VideoView>> {
    let page = run_blocking(&state, move |engine| {
        let req = query.request(engine);
        let videos = engine.aggregator().liked_videos(claims.sub)?;
        Ok(paginate(videos, req))
    })
    .await?;
    ok(page, "Liked videos fetched successfully")
}
