//! Published edition model shared by news articles and speeches.
//!
//! # Responsibility
//! - Define the edition record every announcement type is built on.
//! - Expose the `PublishableDocument` capability used by aggregation.
//!
//! # Invariants
//! - A `published` edition always carries `published_at`.
//! - `first_published_at` is never later than `published_at`.
//! - `identity.slug` is URL-safe.

use crate::model::metadata::{PolicyArea, PolicyId, RoleAppointment};
use crate::model::slug::is_url_safe;
use crate::model::validation::{ValidationErrors, ValidationReason};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type EditionId = Uuid;
pub type DocumentId = Uuid;

/// Concrete announcement type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    NewsArticle,
    Speech,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewsArticle => "news_article",
            Self::Speech => "speech",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "news_article" => Some(Self::NewsArticle),
            "speech" => Some(Self::Speech),
            _ => None,
        }
    }
}

/// Editorial workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationState {
    Draft,
    Submitted,
    Published,
    Archived,
}

impl PublicationState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "submitted" => Some(Self::Submitted),
            "published" => Some(Self::Published),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Stable public identity of a document across its editions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentIdentity {
    pub document_id: DocumentId,
    pub slug: String,
}

/// One edition of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edition {
    pub id: EditionId,
    pub identity: DocumentIdentity,
    pub title: String,
    pub state: PublicationState,
    /// Featured editions are promoted separately and left out of feeds.
    pub featured: bool,
    /// Political editions are attributed to the government in power when
    /// they were first published.
    pub political: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub first_published_at: Option<DateTime<Utc>>,
    /// Document relations to policy pages.
    pub related_policy_ids: Vec<PolicyId>,
}

impl Edition {
    /// Creates a draft edition with freshly generated ids.
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity: DocumentIdentity {
                document_id: Uuid::new_v4(),
                slug: slug.into(),
            },
            title: title.into(),
            state: PublicationState::Draft,
            featured: false,
            political: false,
            published_at: None,
            first_published_at: None,
            related_policy_ids: Vec::new(),
        }
    }

    /// Moves the edition to `published` at `at`.
    ///
    /// `first_published_at` is only set the first time.
    pub fn publish(&mut self, at: DateTime<Utc>) {
        self.state = PublicationState::Published;
        self.published_at = Some(at);
        self.first_published_at.get_or_insert(at);
    }

    pub fn is_published(&self) -> bool {
        self.state == PublicationState::Published
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.id.is_nil() {
            errors.add("id", ValidationReason::Invalid);
        }
        if self.identity.document_id.is_nil() {
            errors.add("document_id", ValidationReason::Invalid);
        }
        if self.title.trim().is_empty() {
            errors.add("title", ValidationReason::Blank);
        }
        if self.identity.slug.is_empty() {
            errors.add("slug", ValidationReason::Blank);
        } else if !is_url_safe(&self.identity.slug) {
            errors.add("slug", ValidationReason::Invalid);
        }
        if self.is_published() && self.published_at.is_none() {
            errors.add("published_at", ValidationReason::Blank);
        }
        if let (Some(first), Some(latest)) = (self.first_published_at, self.published_at) {
            if first > latest {
                errors.add("first_published_at", ValidationReason::Invalid);
            }
        }
        errors.into_result()
    }
}

/// News article with the policy areas it is tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub edition: Edition,
    pub policy_areas: Vec<PolicyArea>,
}

impl NewsArticle {
    pub fn new(edition: Edition) -> Self {
        Self {
            edition,
            policy_areas: Vec::new(),
        }
    }
}

/// Speech with the role appointment it was delivered under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speech {
    pub edition: Edition,
    pub role_appointment: Option<RoleAppointment>,
}

impl Speech {
    pub fn new(edition: Edition) -> Self {
        Self {
            edition,
            role_appointment: None,
        }
    }
}

/// Any announcement that can appear in a mixed feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Announcement {
    NewsArticle(NewsArticle),
    Speech(Speech),
}

impl From<NewsArticle> for Announcement {
    fn from(value: NewsArticle) -> Self {
        Self::NewsArticle(value)
    }
}

impl From<Speech> for Announcement {
    fn from(value: Speech) -> Self {
        Self::Speech(value)
    }
}

/// Read capability shared by every publishable document type.
///
/// Aggregation and attribution only go through this trait, so new document
/// types join the feeds by implementing `edition` and `kind`.
pub trait PublishableDocument {
    fn edition(&self) -> &Edition;
    fn kind(&self) -> DocumentKind;

    fn id(&self) -> EditionId {
        self.edition().id
    }

    fn slug(&self) -> &str {
        &self.edition().identity.slug
    }

    fn published_at(&self) -> Option<DateTime<Utc>> {
        self.edition().published_at
    }

    fn first_published_at(&self) -> Option<DateTime<Utc>> {
        self.edition().first_published_at
    }

    /// Calendar day (UTC) of first publication.
    fn first_published_on(&self) -> Option<NaiveDate> {
        self.first_published_at().map(|at| at.date_naive())
    }

    fn is_featured(&self) -> bool {
        self.edition().featured
    }

    fn is_published(&self) -> bool {
        self.edition().is_published()
    }

    fn is_political(&self) -> bool {
        self.edition().political
    }
}

impl PublishableDocument for NewsArticle {
    fn edition(&self) -> &Edition {
        &self.edition
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::NewsArticle
    }
}

impl PublishableDocument for Speech {
    fn edition(&self) -> &Edition {
        &self.edition
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::Speech
    }
}

impl PublishableDocument for Announcement {
    fn edition(&self) -> &Edition {
        match self {
            Self::NewsArticle(article) => article.edition(),
            Self::Speech(speech) => speech.edition(),
        }
    }

    fn kind(&self) -> DocumentKind {
        match self {
            Self::NewsArticle(article) => article.kind(),
            Self::Speech(speech) => speech.kind(),
        }
    }
}
