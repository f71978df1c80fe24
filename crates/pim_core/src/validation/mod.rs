//! Constraint validation for catalog entities.
//!
//! # Responsibility
//! - Evaluate business constraints against in-memory families.
//! - Report failures as structured violations instead of errors.
//!
//! # Invariants
//! - Validation never mutates the validated family.
//! - Violation order is deterministic: constraint order, then variant order.

pub mod axis_usage;
pub mod violation;

pub use axis_usage::FamilyAttributesUsedAsAxis;
pub use violation::{FamilyConstraint, FamilyValidator, Violation, ViolationList};
