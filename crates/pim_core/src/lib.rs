//! Catalog modeling core of the PIM.
//! This crate is the single source of truth for family and family variant
//! consistency rules.

pub mod db;
pub mod hooks;
pub mod logging;
pub mod model;
pub mod normalizer;
pub mod repo;
pub mod service;
pub mod validation;

pub use hooks::variant_pruning::remove_deleted_attributes_from_family_variants;
pub use hooks::{run_pre_save_hooks, PreSaveHook, RemoveAttributeFromFamilyVariants, SaveSubject};
pub use logging::{
    default_log_level, init_logging, init_logging_if_configured, logging_status, LogSettings,
};
pub use model::attribute::{Attribute, AttributeCode, AttributeType};
pub use model::error::ModelError;
pub use model::family::Family;
pub use model::family_variant::{FamilyVariant, VariantAttributeSet};
pub use normalizer::{normalize_family, NormalizeOptions};
pub use repo::attribute_repo::{AttributeRepository, SqliteAttributeRepository};
pub use repo::family_repo::{FamilyRepository, SqliteFamilyRepository};
pub use repo::{RepoError, RepoResult};
pub use service::attribute_service::AttributeService;
pub use service::family_service::{FamilyService, FamilyServiceError};
pub use validation::{
    FamilyAttributesUsedAsAxis, FamilyConstraint, FamilyValidator, Violation, ViolationList,
};

/// Minimal health-check API for smoke tests.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
