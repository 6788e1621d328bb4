use axum::{
    Extension,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use vidora_core::engagement::{parse_kind, parse_polarity, target_from_refs};
use vidora_core::resolver::parse_id;
use vidora_core::CoreError;
use vidora_types::api::{Claims, ReactionCounts, ReactionOutcome};
use vidora_types::models::{ReactionState, Target};

use crate::auth::AppState;
use crate::error::{ApiResult, ok, run_blocking};
use crate::middleware::Viewer;

#[derive(Debug, Deserialize)]
pub struct PolarityQuery {
    pub polarity: Option<String>,
}

/// Query-string form: exactly one of the three ids plus `toggleLike`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeQuery {
    pub toggle_like: Option<String>,
    pub video_id: Option<String>,
    pub comment_id: Option<String>,
    pub tweet_id: Option<String>,
}

fn outcome_message(state: ReactionState) -> &'static str {
    match state {
        ReactionState::Like => "Liked successfully",
        ReactionState::Dislike => "Disliked successfully",
        ReactionState::Neutral => "Reaction removed successfully",
    }
}

fn parse_target(kind: &str, id: &str) -> Result<Target, CoreError> {
    Ok(Target::new(parse_kind(kind)?, parse_id(id)?))
}

pub async fn set_reaction(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    Query(query): Query<PolarityQuery>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<ReactionOutcome> {
    let target = parse_target(&kind, &id)?;
    let polarity = parse_polarity(query.polarity.as_deref().unwrap_or_default())?;

    let outcome = run_blocking(&state, move |engine| {
        engine.engagement().set_reaction(claims.sub, target, polarity)
    })
    .await?;

    ok(outcome, outcome_message(outcome.state))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    Query(query): Query<ToggleLikeQuery>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<ReactionOutcome> {
    let raw = query
        .toggle_like
        .as_deref()
        .ok_or_else(|| CoreError::InvalidTarget("toggleLike is required".into()))?;
    let polarity = parse_polarity(raw)?;
    let target = target_from_refs(
        query.video_id.as_deref(),
        query.comment_id.as_deref(),
        query.tweet_id.as_deref(),
    )?;

    let outcome = run_blocking(&state, move |engine| {
        engine.engagement().set_reaction(claims.sub, target, polarity)
    })
    .await?;

    ok(outcome, outcome_message(outcome.state))
}

pub async fn reaction_counts(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    Extension(Viewer(viewer)): Extension<Viewer>,
) -> ApiResult<ReactionCounts> {
    let target = parse_target(&kind, &id)?;
    let counts = run_blocking(&state, move |engine| engine.engagement().counts(target, viewer)).await?;
    ok(counts, "Reaction counts fetched successfully")
}
