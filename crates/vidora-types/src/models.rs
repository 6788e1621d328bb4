use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Reactions --

/// Direction of a reaction. Stored as the `liked` boolean on an engagement row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Like,
    Dislike,
}

impl Polarity {
    pub fn from_liked(liked: bool) -> Self {
        if liked { Self::Like } else { Self::Dislike }
    }

    pub fn is_like(self) -> bool {
        matches!(self, Self::Like)
    }

    /// Accepts `like`/`dislike` as well as the `true`/`false` form used by
    /// the combined toggle endpoint.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "like" | "true" => Some(Self::Like),
            "dislike" | "false" => Some(Self::Dislike),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
        }
    }
}

/// What an actor currently feels about a target. `Neutral` means no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionState {
    Like,
    Dislike,
    Neutral,
}

impl ReactionState {
    pub fn polarity(self) -> Option<Polarity> {
        match self {
            Self::Like => Some(Polarity::Like),
            Self::Dislike => Some(Polarity::Dislike),
            Self::Neutral => None,
        }
    }

    pub fn is_liked(self) -> bool {
        self == Self::Like
    }

    pub fn is_disliked(self) -> bool {
        self == Self::Dislike
    }
}

impl From<Option<Polarity>> for ReactionState {
    fn from(polarity: Option<Polarity>) -> Self {
        match polarity {
            Some(Polarity::Like) => Self::Like,
            Some(Polarity::Dislike) => Self::Dislike,
            None => Self::Neutral,
        }
    }
}

// -- Targets --

/// Content kinds an engagement can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Video,
    Comment,
    Tweet,
}

impl TargetKind {
    /// Accepts singular and plural path segments (`video`, `videos`, ...).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "video" | "videos" => Some(Self::Video),
            "comment" | "comments" => Some(Self::Comment),
            "tweet" | "tweets" => Some(Self::Tweet),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Comment => "comment",
            Self::Tweet => "tweet",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single content entity a reaction refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub kind: TargetKind,
    pub id: Uuid,
}

impl Target {
    pub fn new(kind: TargetKind, id: Uuid) -> Self {
        Self { kind, id }
    }

    pub fn video(id: Uuid) -> Self {
        Self::new(TargetKind::Video, id)
    }

    pub fn comment(id: Uuid) -> Self {
        Self::new(TargetKind::Comment, id)
    }

    pub fn tweet(id: Uuid) -> Self {
        Self::new(TargetKind::Tweet, id)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Every kind of id the reference resolver can look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Video,
    Comment,
    Tweet,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Video => "video",
            Self::Comment => "comment",
            Self::Tweet => "tweet",
        }
    }
}

impl From<TargetKind> for EntityKind {
    fn from(kind: TargetKind) -> Self {
        match kind {
            TargetKind::Video => Self::Video,
            TargetKind::Comment => Self::Comment,
            TargetKind::Tweet => Self::Tweet,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -- Profiles --

/// Public projection of a user. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar: Option<String>,
}

/// Engagement fields derived for one target and one viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementSummary {
    pub total_likes: u64,
    pub total_dislikes: u64,
    pub is_liked: bool,
    pub is_disliked: bool,
}
