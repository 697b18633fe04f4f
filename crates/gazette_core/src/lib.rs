//! Content core for a government publishing site.
//! This crate owns the publishing and government-registry invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, DatabaseConfig, FeedConfig, GazetteConfig, LoggingConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::edition::{
    Announcement, DocumentIdentity, DocumentKind, Edition, EditionId, NewsArticle,
    PublicationState, PublishableDocument, Speech,
};
pub use model::government::{Government, GovernmentId, NewGovernment};
pub use model::metadata::{Person, Policy, PolicyArea, Role, RoleAppointment};
pub use model::slug::slugify;
pub use model::validation::{FieldError, ValidationErrors, ValidationReason};
pub use repo::document_repo::{DocumentQuery, DocumentRepository, SqliteDocumentRepository};
pub use repo::government_repo::{GovernmentRepository, SqliteGovernmentRepository};
pub use repo::metadata_repo::{MetadataRepository, SqliteMetadataRepository};
pub use repo::{RepoError, RepoResult};
pub use service::announcement_service::{
    merge_by_published_at, AnnouncementService, AnnouncementsIndex, FeedWindows,
};
pub use service::government_service::GovernmentService;
pub use service::speech_service::{SpeechPage, SpeechService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
