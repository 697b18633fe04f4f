//! Speech listing and detail use-cases.

use crate::model::edition::{PublishableDocument, Speech};
use crate::model::metadata::Policy;
use crate::repo::document_repo::{DocumentQuery, DocumentRepository};
use crate::repo::RepoResult;
use log::debug;
use serde::Serialize;

/// Read model for one speech page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeechPage {
    pub speech: Speech,
    /// Published policies only, ordered by title.
    pub related_policies: Vec<Policy>,
}

pub struct SpeechService<R: DocumentRepository> {
    repo: R,
}

impl<R: DocumentRepository> SpeechService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Every published speech, newest first.
    pub fn index(&self) -> RepoResult<Vec<Speech>> {
        self.repo.published_speeches(&DocumentQuery::default())
    }

    /// The published speech at `slug` with its related published policies.
    ///
    /// Returns `None` for unknown slugs and for speeches that are not
    /// published.
    pub fn show(&self, slug: &str) -> RepoResult<Option<SpeechPage>> {
        let Some(speech) = self.repo.find_published_speech(slug)? else {
            debug!("event=speech_show module=service status=not_found slug={slug}");
            return Ok(None);
        };
        let related_policies = self.repo.related_published_policies(speech.id())?;
        Ok(Some(SpeechPage {
            speech,
            related_policies,
        }))
    }
}
