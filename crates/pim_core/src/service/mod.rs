//! Catalog use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, pre-save hooks and repository writes.
//! - Keep CLI and other callers decoupled from storage details.

pub mod attribute_service;
pub mod family_service;
