//! Structured field-level validation failures.

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Why one field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    /// Missing or whitespace-only value.
    Blank,
    /// Another record already uses this value.
    Taken,
    /// Value is present but malformed or inconsistent with another field.
    Invalid,
    /// Date range intersects another record's range.
    Overlaps,
}

impl ValidationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blank => "can't be blank",
            Self::Taken => "has already been taken",
            Self::Invalid => "is invalid",
            Self::Overlaps => "overlaps an existing range",
        }
    }
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: ValidationReason,
}

/// Ordered collection of field errors for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a single failure.
    pub fn single(field: &'static str, reason: ValidationReason) -> Self {
        let mut errors = Self::new();
        errors.add(field, reason);
        errors
    }

    /// Records a failure; duplicates of the same `(field, reason)` are kept once.
    pub fn add(&mut self, field: &'static str, reason: ValidationReason) {
        if !self.contains(field, reason) {
            self.errors.push(FieldError { field, reason });
        }
    }

    pub fn contains(&self, field: &str, reason: ValidationReason) -> bool {
        self.errors
            .iter()
            .any(|error| error.field == field && error.reason == reason)
    }

    /// Returns whether any failure was recorded for `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Folds another set of failures into this one.
    pub fn merge(&mut self, other: ValidationErrors) {
        for error in other.errors {
            self.add(error.field, error.reason);
        }
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "validation failed");
        }
        for (index, error) in self.errors.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{} {}", error.field, error.reason.as_str())?;
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}
