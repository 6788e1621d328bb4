use uuid::Uuid;

use vidora_db::Database;
use vidora_db::models::EntityRef;
use vidora_types::models::EntityKind;

use crate::error::{CoreError, CoreResult};

/// Existence and ownership of a referenced entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub exists: bool,
    pub owner_id: Option<Uuid>,
    /// Set for videos and comments; a comment carries its parent video's flag.
    pub is_published: Option<bool>,
    /// Owner of the video `is_published` belongs to.
    pub video_owner_id: Option<Uuid>,
}

impl Resolution {
    fn from_ref(found: Option<EntityRef>) -> Self {
        match found {
            Some(r) => Self {
                exists: true,
                owner_id: r.owner_id,
                is_published: r.is_published,
                video_owner_id: r.video_owner_id,
            },
            None => Self {
                exists: false,
                owner_id: None,
                is_published: None,
                video_owner_id: None,
            },
        }
    }

    /// Whether `viewer` may see the entity. Unpublished videos, and comments
    /// on them, are visible to the video's owner only.
    pub fn visible_to(&self, viewer: Option<Uuid>) -> bool {
        match self.is_published {
            Some(false) => viewer.is_some() && viewer == self.video_owner_id,
            _ => self.exists,
        }
    }
}

/// Parse an opaque id from a request. Anything that is not a UUID is outside
/// the store's key space.
pub fn parse_id(raw: &str) -> CoreResult<Uuid> {
    raw.trim()
        .parse::<Uuid>()
        .map_err(|_| CoreError::InvalidReference(format!("'{}' is not a valid id", raw)))
}

pub struct Resolver<'a> {
    db: &'a Database,
}

impl<'a> Resolver<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn resolve(&self, kind: EntityKind, id: Uuid) -> CoreResult<Resolution> {
        Ok(Resolution::from_ref(self.db.lookup_entity(kind, id)?))
    }

    pub fn resolve_raw(&self, kind: EntityKind, raw: &str) -> CoreResult<Resolution> {
        self.resolve(kind, parse_id(raw)?)
    }

    /// Resolve and fail with `NotFound` when nothing is stored under `id`.
    pub fn require(&self, kind: EntityKind, id: Uuid) -> CoreResult<Resolution> {
        let res = self.resolve(kind, id)?;
        if !res.exists {
            return Err(CoreError::NotFound(format!("{} {} not found", kind, id)));
        }
        Ok(res)
    }

    /// Users named as actor, subscriber or channel must exist; an unknown
    /// user id is an invalid reference rather than a missing resource.
    pub fn require_user(&self, id: Uuid) -> CoreResult<()> {
        if !self.resolve(EntityKind::User, id)?.exists {
            return Err(CoreError::InvalidReference(format!("user {} does not exist", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_id("not-an-id"),
            Err(CoreError::InvalidReference(_))
        ));
        assert!(matches!(parse_id(""), Err(CoreError::InvalidReference(_))));
    }

    #[test]
    fn test_visibility() {
        let owner = Uuid::new_v4();
        let draft = Resolution {
            exists: true,
            owner_id: Some(owner),
            is_published: Some(false),
            video_owner_id: Some(owner),
        };
        assert!(draft.visible_to(Some(owner)));
        assert!(!draft.visible_to(Some(Uuid::new_v4())));
        assert!(!draft.visible_to(None));

        let tweet = Resolution {
            exists: true,
            owner_id: Some(owner),
            is_published: None,
            video_owner_id: None,
        };
        assert!(tweet.visible_to(None));

        let commenter = Uuid::new_v4();
        let hidden_comment = Resolution {
            exists: true,
            owner_id: Some(commenter),
            is_published: Some(false),
            video_owner_id: Some(owner),
        };
        assert!(hidden_comment.visible_to(Some(owner)));
        assert!(!hidden_comment.visible_to(Some(commenter)));
        assert!(!Resolution::from_ref(None).visible_to(Some(owner)));
    }
}
