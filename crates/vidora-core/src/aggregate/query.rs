//! Query shape for enriched collections, validated before it touches the store.

use uuid::Uuid;

use crate::aggregate::search::SearchTerms;
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Videos,
    Comments,
    Tweets,
}

/// Which videos survive the publication gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    All,
    Published,
    PublishedOrOwnedBy(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Views,
    Duration,
    Title,
}

impl SortField {
    /// Accepts camelCase and snake_case names.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        match raw.trim() {
            "createdAt" | "created_at" => Ok(Self::CreatedAt),
            "updatedAt" | "updated_at" => Ok(Self::UpdatedAt),
            "views" => Ok(Self::Views),
            "duration" => Ok(Self::Duration),
            "title" => Ok(Self::Title),
            other => Err(CoreError::InvalidTarget(format!(
                "cannot sort by '{}'",
                other
            ))),
        }
    }

    fn video_only(self) -> bool {
        matches!(self, Self::Views | Self::Duration | Self::Title)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> CoreResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "1" => Ok(Self::Asc),
            "desc" | "-1" => Ok(Self::Desc),
            other => Err(CoreError::InvalidTarget(format!(
                "unknown sort order '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Sort {
    pub fn recency() -> Self {
        Self {
            field: SortField::CreatedAt,
            order: SortOrder::Desc,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Filter {
    pub owner: Option<Uuid>,
    /// Restrict to content owned by any of these users. Empty matches nothing.
    pub owners_in: Option<Vec<Uuid>>,
    pub parent_video: Option<Uuid>,
    /// Videos this actor currently likes.
    pub liked_by: Option<Uuid>,
    pub visibility: Visibility,
    pub search: Option<SearchTerms>,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            owner: None,
            owners_in: None,
            parent_video: None,
            liked_by: None,
            visibility: Visibility::All,
            search: None,
        }
    }
}

/// Derived data attached to each row. Views built without the engagement
/// join carry a zeroed summary; without the profile join, no owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinSet {
    pub engagement: bool,
    pub owner_profile: bool,
}

impl JoinSet {
    pub fn all() -> Self {
        Self {
            engagement: true,
            owner_profile: true,
        }
    }

    pub fn none() -> Self {
        Self {
            engagement: false,
            owner_profile: false,
        }
    }
}

/// `sort = None` keeps the order the source produced (recency for every
/// store listing, like-recency for liked videos).
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub collection: Collection,
    pub filter: Filter,
    pub sort: Option<Sort>,
    pub joins: JoinSet,
}

impl QuerySpec {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            filter: Filter::default(),
            sort: None,
            joins: JoinSet::all(),
        }
    }

    pub fn videos() -> Self {
        let mut spec = Self::new(Collection::Videos);
        spec.filter.visibility = Visibility::Published;
        spec
    }

    pub fn comments_on(video_id: Uuid) -> Self {
        let mut spec = Self::new(Collection::Comments);
        spec.filter.parent_video = Some(video_id);
        spec
    }

    pub fn tweets() -> Self {
        Self::new(Collection::Tweets)
    }

    pub fn owned_by(mut self, owner: Uuid) -> Self {
        self.filter.owner = Some(owner);
        self
    }

    pub fn owned_by_any(mut self, owners: Vec<Uuid>) -> Self {
        self.filter.owners_in = Some(owners);
        self
    }

    pub fn liked_by(mut self, actor: Uuid) -> Self {
        self.filter.liked_by = Some(actor);
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.filter.visibility = visibility;
        self
    }

    pub fn search(mut self, terms: Option<SearchTerms>) -> Self {
        self.filter.search = terms;
        self
    }

    pub fn sorted(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn joins(mut self, joins: JoinSet) -> Self {
        self.joins = joins;
        self
    }

    /// Reject shapes no collection supports.
    pub fn validate(&self) -> CoreResult<()> {
        let is_videos = self.collection == Collection::Videos;
        let f = &self.filter;

        if f.search.is_some() && !is_videos {
            return Err(shape("search is only supported on videos"));
        }
        if f.liked_by.is_some() && !is_videos {
            return Err(shape("liked-by filter is only supported on videos"));
        }
        if f.visibility != Visibility::All && !is_videos {
            return Err(shape("publication filter is only supported on videos"));
        }
        if let Some(sort) = self.sort {
            if sort.field.video_only() && !is_videos {
                return Err(shape("sort field is only supported on videos"));
            }
        }
        match (self.collection, f.parent_video) {
            (Collection::Comments, None) => Err(shape("comments require a parent video")),
            (Collection::Comments, Some(_)) => Ok(()),
            (_, Some(_)) => Err(shape("parent video filter is only supported on comments")),
            (_, None) => Ok(()),
        }
    }
}

fn shape(msg: &str) -> CoreError {
    CoreError::InvalidTarget(format!("unsupported query: {}", msg))
}
