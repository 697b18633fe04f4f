//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into page-level read models and
//!   validated writes.
//! - Keep callers (CLI, web layer) decoupled from storage details.

pub mod announcement_service;
pub mod government_service;
pub mod speech_service;
