//! Tri-state reactions on videos, comments and tweets.

use tracing::{debug, info};
use uuid::Uuid;

use vidora_db::{Database, StoreError, content, engagements, expect_one};
use vidora_types::api::{ReactionCounts, ReactionOutcome};
use vidora_types::models::{Polarity, ReactionState, Target, TargetKind};

use crate::error::{CoreError, CoreResult};
use crate::resolver::{Resolution, Resolver, parse_id};

/// The write a reaction request turns into, given what is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Create(Polarity),
    Flip(Polarity),
    Clear,
}

impl Transition {
    pub fn plan(existing: Option<Polarity>, desired: Polarity) -> Self {
        match existing {
            None => Transition::Create(desired),
            Some(current) if current == desired => Transition::Clear,
            Some(_) => Transition::Flip(desired),
        }
    }

    pub fn resulting_state(self) -> ReactionState {
        match self {
            Transition::Create(p) | Transition::Flip(p) => Some(p).into(),
            Transition::Clear => ReactionState::Neutral,
        }
    }
}

/// Build a target from the three optional id slots of the combined toggle
/// endpoint. Exactly one must be present.
pub fn target_from_refs(
    video: Option<&str>,
    comment: Option<&str>,
    tweet: Option<&str>,
) -> CoreResult<Target> {
    let given: Vec<(TargetKind, &str)> = [
        (TargetKind::Video, video),
        (TargetKind::Comment, comment),
        (TargetKind::Tweet, tweet),
    ]
    .into_iter()
    .filter_map(|(kind, raw)| raw.filter(|r| !r.trim().is_empty()).map(|r| (kind, r)))
    .collect();

    match given.as_slice() {
        [(kind, raw)] => Ok(Target::new(*kind, parse_id(raw)?)),
        [] => Err(CoreError::InvalidTarget(
            "one of videoId, commentId or tweetId is required".into(),
        )),
        _ => Err(CoreError::InvalidTarget(
            "only one of videoId, commentId or tweetId may be given".into(),
        )),
    }
}

pub fn parse_polarity(raw: &str) -> CoreResult<Polarity> {
    Polarity::parse(raw)
        .ok_or_else(|| CoreError::InvalidTarget(format!("unsupported polarity '{}'", raw)))
}

pub fn parse_kind(raw: &str) -> CoreResult<TargetKind> {
    TargetKind::parse(raw)
        .ok_or_else(|| CoreError::InvalidTarget(format!("unsupported target kind '{}'", raw)))
}

pub struct EngagementStore<'a> {
    db: &'a Database,
}

impl<'a> EngagementStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn get_reaction(&self, actor: Uuid, target: Target) -> CoreResult<ReactionState> {
        Ok(self.db.find_engagement(actor, target)?.into())
    }

    /// Apply one reaction request. The read of the stored polarity and the
    /// resulting write share one immediate transaction, so concurrent
    /// requests for the same pair serialize.
    pub fn set_reaction(
        &self,
        actor: Uuid,
        target: Target,
        desired: Polarity,
    ) -> CoreResult<ReactionOutcome> {
        let resolver = Resolver::new(self.db);
        resolver.require_user(actor)?;
        let found = resolver.require(target.kind.into(), target.id)?;
        self.ensure_visible(target, &found, Some(actor))?;

        let applied = self.db.with_tx(|conn| {
            // The target may have been deleted since the check above.
            if content::lookup_entity(conn, target.kind.into(), target.id)?.is_none() {
                return Ok(None);
            }

            let existing = engagements::find(conn, actor, target)?;
            let transition = Transition::plan(existing.map(|(_, p)| p), desired);

            match (transition, existing) {
                (Transition::Create(p), _) => {
                    engagements::insert(conn, actor, target, p)?;
                }
                (Transition::Flip(p), Some((id, _))) => {
                    expect_one(engagements::set_polarity(conn, id, p)?, "flip engagement")?;
                }
                (Transition::Clear, Some((id, _))) => {
                    expect_one(engagements::delete(conn, id)?, "clear engagement")?;
                }
                (_, None) => {
                    return Err(StoreError::Corrupt(format!(
                        "{:?} planned without a stored row",
                        transition
                    )));
                }
            }

            let (likes, dislikes) = engagements::count(conn, target)?;
            Ok(Some((transition, likes, dislikes)))
        })?;

        let (transition, total_likes, total_dislikes) =
            applied.ok_or_else(|| CoreError::NotFound(format!("{} not found", target)))?;
        let state = transition.resulting_state();

        info!("Reaction {:?} by {} on {}: {:?}", desired, actor, target, state);
        Ok(ReactionOutcome {
            state,
            is_liked: state.is_liked(),
            is_disliked: state.is_disliked(),
            total_likes,
            total_dislikes,
        })
    }

    pub fn count_reactions(&self, target: Target, polarity: Polarity) -> CoreResult<u64> {
        let (likes, dislikes) = self.db.count_engagements(target)?;
        Ok(match polarity {
            Polarity::Like => likes,
            Polarity::Dislike => dislikes,
        })
    }

    /// Both totals plus what `viewer` currently feels. Anonymous viewers
    /// always read as neutral.
    pub fn counts(&self, target: Target, viewer: Option<Uuid>) -> CoreResult<ReactionCounts> {
        let found = Resolver::new(self.db).require(target.kind.into(), target.id)?;
        self.ensure_visible(target, &found, viewer)?;

        let (total_likes, total_dislikes) = self.db.count_engagements(target)?;
        let viewer_state = match viewer {
            Some(v) => self.get_reaction(v, target)?,
            None => ReactionState::Neutral,
        };

        Ok(ReactionCounts {
            total_likes,
            total_dislikes,
            viewer_state,
        })
    }

    /// Remove every reaction on `target`. Called by whoever deletes content.
    pub fn delete_all_for_target(&self, target: Target) -> CoreResult<u64> {
        let removed = self
            .db
            .with_tx(|conn| engagements::delete_for_target(conn, target))?;
        debug!("Removed {} engagements on {}", removed, target);
        Ok(removed)
    }

    /// Delete a content entity and, in the same transaction, its reactions.
    pub fn delete_target(&self, target: Target) -> CoreResult<u64> {
        self.db
            .delete_content(target)?
            .ok_or_else(|| CoreError::NotFound(format!("{} not found", target)))
    }

    fn ensure_visible(
        &self,
        target: Target,
        found: &Resolution,
        viewer: Option<Uuid>,
    ) -> CoreResult<()> {
        if found.visible_to(viewer) {
            Ok(())
        } else {
            Err(CoreError::NotFound(format!("{} not found", target)))
        }
    }
}
