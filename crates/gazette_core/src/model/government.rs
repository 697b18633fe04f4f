//! Government domain model.
//!
//! # Responsibility
//! - Describe one administration and the date range it governed.
//! - Answer containment and overlap questions on those ranges.
//!
//! # Invariants
//! - `slug` is derived once at creation and never recomputed from `name`.
//! - `end_date == None` means the government is ongoing.
//! - `start_date` and `end_date` are both inclusive.
//! - Stored dates fall in years `0..=9999`, where `YYYY-MM-DD` text order
//!   matches date order.

use crate::model::slug::is_url_safe;
use crate::model::validation::{ValidationErrors, ValidationReason};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type GovernmentId = Uuid;

pub const MIN_STORABLE_YEAR: i32 = 0;
pub const MAX_STORABLE_YEAR: i32 = 9999;

/// Returns whether `date` can be stored without breaking range lookups.
pub fn is_storable_date(date: NaiveDate) -> bool {
    (MIN_STORABLE_YEAR..=MAX_STORABLE_YEAR).contains(&date.year())
}

/// Persisted government record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Government {
    pub id: GovernmentId,
    pub name: String,
    /// Immutable once assigned.
    pub slug: String,
    pub start_date: NaiveDate,
    /// `None` while the government is still in power.
    pub end_date: Option<NaiveDate>,
}

impl Government {
    /// Returns whether this government is currently in power.
    pub fn is_ongoing(&self) -> bool {
        self.end_date.is_none()
    }

    /// Returns whether `date` falls within `[start_date, end_date]`.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && self.end_date.map_or(true, |end| date <= end)
    }

    /// Returns whether this government's range intersects `[start, end]`.
    ///
    /// `end == None` is treated as unbounded.
    pub fn overlaps(&self, start: NaiveDate, end: Option<NaiveDate>) -> bool {
        let starts_before_other_ends = end.map_or(true, |end| self.start_date <= end);
        let ends_after_other_starts = self.end_date.map_or(true, |own_end| start <= own_end);
        starts_before_other_ends && ends_after_other_starts
    }

    /// Checks record-local invariants. Uniqueness and overlap with other
    /// records are checked by the service against storage.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.id.is_nil() {
            errors.add("id", ValidationReason::Invalid);
        }
        if self.name.trim().is_empty() {
            errors.add("name", ValidationReason::Blank);
        }
        if !is_url_safe(&self.slug) {
            errors.add("slug", ValidationReason::Invalid);
        }
        if !is_storable_date(self.start_date) {
            errors.add("start_date", ValidationReason::Invalid);
        }
        if let Some(end) = self.end_date {
            if end < self.start_date || !is_storable_date(end) {
                errors.add("end_date", ValidationReason::Invalid);
            }
        }
        errors.into_result()
    }
}

/// Creation request for a government.
///
/// `start_date` is optional here so a missing value can be reported as a
/// `blank` field error instead of failing earlier at parse time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewGovernment {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Caller-provided slug for import paths. Derived from `name` when `None`.
    pub slug: Option<String>,
}

impl NewGovernment {
    pub fn new(name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start_date: Some(start_date),
            end_date: None,
            slug: None,
        }
    }

    /// Sets the last day in power.
    pub fn ending(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Pins the slug instead of deriving it from the name.
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Checks presence and range rules that need no storage access.
    pub fn validate_fields(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", ValidationReason::Blank);
        }
        match self.start_date {
            None => errors.add("start_date", ValidationReason::Blank),
            Some(start) if !is_storable_date(start) => {
                errors.add("start_date", ValidationReason::Invalid)
            }
            Some(_) => {}
        }
        if let Some(end) = self.end_date {
            let reversed = self.start_date.is_some_and(|start| end < start);
            if reversed || !is_storable_date(end) {
                errors.add("end_date", ValidationReason::Invalid);
            }
        }
        if let Some(slug) = self.slug.as_deref() {
            if !is_url_safe(slug) {
                errors.add("slug", ValidationReason::Invalid);
            }
        }
        errors.into_result()
    }
}
