//! Domain model for published editions and governments.
//!
//! # Responsibility
//! - Define canonical records shared by repositories and services.
//! - Own field-level validation and slug derivation rules.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that is never nil.
//! - Validation failures are reported per field, never as free text only.

pub mod edition;
pub mod government;
pub mod metadata;
pub mod slug;
pub mod validation;
