//! Government registry use-cases.
//!
//! # Responsibility
//! - Validate and create governments, deriving their slug once.
//! - Rename and conclude governments without touching the slug.
//! - Resolve the current government and the government on a given date.
//!
//! # Invariants
//! - Names and slugs are unique; storage indexes back the checks up.
//! - Government ranges never overlap, so at most one is ongoing.

use crate::model::edition::PublishableDocument;
use crate::model::government::{is_storable_date, Government, GovernmentId, NewGovernment};
use crate::model::slug::{disambiguate, slugify};
use crate::model::validation::{ValidationErrors, ValidationReason};
use crate::repo::government_repo::GovernmentRepository;
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use log::{info, warn};
use uuid::Uuid;

/// Slug base for names with nothing left after transliteration.
const FALLBACK_SLUG: &str = "government";

/// Use-case service for the government registry.
pub struct GovernmentService<R: GovernmentRepository> {
    repo: R,
}

impl<R: GovernmentRepository> GovernmentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates and persists a new government.
    ///
    /// # Errors
    /// - `RepoError::Validation` listing every failing field: blank name or
    ///   start date, reversed range, taken name, taken or malformed explicit
    ///   slug, or a range overlapping another government.
    pub fn create(&self, request: NewGovernment) -> RepoResult<Government> {
        let mut errors = match request.validate_fields() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if !request.name.trim().is_empty() && self.repo.find_by_name(&request.name)?.is_some() {
            errors.add("name", ValidationReason::Taken);
        }

        let slug = self.pick_slug(&request, &mut errors)?;

        let range_is_valid = !errors.has_field("start_date") && !errors.has_field("end_date");
        if let (Some(start), true) = (request.start_date, range_is_valid) {
            if !self
                .repo
                .overlapping_governments(start, request.end_date, None)?
                .is_empty()
            {
                errors.add("start_date", ValidationReason::Overlaps);
            }
        }

        let (Some(slug), Some(start_date), true) = (slug, request.start_date, errors.is_empty())
        else {
            return Err(reject("government_create", errors));
        };

        let government = Government {
            id: Uuid::new_v4(),
            name: request.name,
            slug,
            start_date,
            end_date: request.end_date,
        };
        self.repo
            .insert_government(&government)
            .map_err(|err| log_write_failure("government_create", err))?;

        info!(
            "event=government_create module=service status=ok government_id={} slug={} ongoing={}",
            government.id,
            government.slug,
            government.is_ongoing()
        );
        Ok(government)
    }

    /// Changes the display name. The slug assigned at creation is kept.
    pub fn rename(&self, id: GovernmentId, name: impl Into<String>) -> RepoResult<Government> {
        let mut government = self.repo.get_government(id)?.ok_or(RepoError::NotFound(id))?;
        let name = name.into();

        let mut errors = ValidationErrors::new();
        if name.trim().is_empty() {
            errors.add("name", ValidationReason::Blank);
        } else if let Some(existing) = self.repo.find_by_name(&name)? {
            if existing.id != id {
                errors.add("name", ValidationReason::Taken);
            }
        }
        if !errors.is_empty() {
            return Err(reject("government_rename", errors));
        }

        government.name = name;
        self.repo
            .update_government(&government)
            .map_err(|err| log_write_failure("government_rename", err))?;

        info!(
            "event=government_rename module=service status=ok government_id={} slug={}",
            government.id, government.slug
        );
        Ok(government)
    }

    /// Sets the last day in power of an ongoing government.
    ///
    /// A government that has already ended keeps its end date; the request
    /// is rejected with `end_date: invalid`.
    pub fn conclude(&self, id: GovernmentId, end_date: NaiveDate) -> RepoResult<Government> {
        let mut government = self.repo.get_government(id)?.ok_or(RepoError::NotFound(id))?;

        let mut errors = ValidationErrors::new();
        if !government.is_ongoing()
            || end_date < government.start_date
            || !is_storable_date(end_date)
        {
            errors.add("end_date", ValidationReason::Invalid);
        } else if !self
            .repo
            .overlapping_governments(government.start_date, Some(end_date), Some(id))?
            .is_empty()
        {
            errors.add("end_date", ValidationReason::Overlaps);
        }
        if !errors.is_empty() {
            return Err(reject("government_conclude", errors));
        }

        government.end_date = Some(end_date);
        self.repo
            .update_government(&government)
            .map_err(|err| log_write_failure("government_conclude", err))?;

        info!(
            "event=government_conclude module=service status=ok government_id={} end_date={}",
            government.id, end_date
        );
        Ok(government)
    }

    pub fn get(&self, id: GovernmentId) -> RepoResult<Option<Government>> {
        self.repo.get_government(id)
    }

    pub fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Government>> {
        self.repo.find_by_slug(slug)
    }

    /// All governments, earliest first.
    pub fn list(&self) -> RepoResult<Vec<Government>> {
        self.repo.list_governments()
    }

    /// The government currently in power, if one is recorded.
    pub fn current(&self) -> RepoResult<Option<Government>> {
        self.repo.current_government()
    }

    /// The government in power on `date`, both range ends inclusive.
    pub fn on_date(&self, date: NaiveDate) -> RepoResult<Option<Government>> {
        self.repo.government_on_date(date)
    }

    /// The government a political document is attributed to: the one in
    /// power on the day it was first published.
    pub fn governing_at(&self, document: &dyn PublishableDocument) -> RepoResult<Option<Government>> {
        if !document.is_political() {
            return Ok(None);
        }
        match document.first_published_on() {
            Some(date) => self.on_date(date),
            None => Ok(None),
        }
    }

    fn pick_slug(
        &self,
        request: &NewGovernment,
        errors: &mut ValidationErrors,
    ) -> RepoResult<Option<String>> {
        if let Some(explicit) = request.slug.as_deref() {
            if errors.has_field("slug") {
                return Ok(None);
            }
            if self.repo.slug_exists(explicit)? {
                errors.add("slug", ValidationReason::Taken);
                return Ok(None);
            }
            return Ok(Some(explicit.to_string()));
        }

        if request.name.trim().is_empty() {
            return Ok(None);
        }

        let mut base = slugify(&request.name);
        if base.is_empty() {
            base = FALLBACK_SLUG.to_string();
        }

        let picked = disambiguate(&base, |candidate| self.repo.slug_exists(candidate))?;
        if picked.is_none() {
            errors.add("slug", ValidationReason::Taken);
        }
        Ok(picked)
    }
}

fn reject(event: &str, errors: ValidationErrors) -> RepoError {
    warn!("event={event} module=service status=rejected fields={errors}");
    RepoError::Validation(errors)
}

fn log_write_failure(event: &str, err: RepoError) -> RepoError {
    warn!("event={event} module=service status=error error={err}");
    err
}
