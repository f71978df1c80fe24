//! Catalog modeling domain types.
//!
//! # Responsibility
//! - Define attributes, families, family variants and variant attribute sets.
//! - Provide structural validation used before persistence.
//!
//! # Invariants
//! - Every entity is identified by a stable, unique `code`.
//! - A family owns its variants; a variant points back to its family by code.

pub mod attribute;
pub mod error;
pub mod family;
pub mod family_variant;
