//! Family use-case service.
//!
//! # Responsibility
//! - Run constraint validation before any family write.
//! - Run pre-save hooks (variant pruning) once validation passed.
//! - Expose the "remove attribute from family" use-case.
//!
//! # Invariants
//! - A family with violations is never handed to the repository.
//! - Hooks only see families that passed validation.
//! - A rejected removal leaves the persisted family untouched.

use crate::hooks::{default_hooks, run_pre_save_hooks, PreSaveHook, SaveSubject};
use crate::model::error::ModelError;
use crate::model::family::Family;
use crate::repo::family_repo::FamilyRepository;
use crate::repo::RepoError;
use crate::validation::{FamilyValidator, ViolationList};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from family service operations.
#[derive(Debug)]
pub enum FamilyServiceError {
    FamilyNotFound(String),
    /// Removal target is not part of the family attribute list.
    AttributeNotInFamily { family: String, attribute: String },
    /// The identifier attribute is mandatory in every family.
    IdentifierAttributeRemoval { family: String, attribute: String },
    /// Constraint validation failed; nothing was persisted.
    Rejected(ViolationList),
    /// Structural model error.
    Model(ModelError),
    Repo(RepoError),
}

impl Display for FamilyServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FamilyNotFound(code) => write!(f, "family not found: {code}"),
            Self::AttributeNotInFamily { family, attribute } => write!(
                f,
                "attribute `{attribute}` does not belong to family `{family}`"
            ),
            Self::IdentifierAttributeRemoval { family, attribute } => write!(
                f,
                "identifier attribute `{attribute}` cannot be removed from family `{family}`"
            ),
            Self::Rejected(violations) => {
                write!(f, "family rejected: {}", violations.messages().join(" "))
            }
            Self::Model(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FamilyServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Model(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelError> for FamilyServiceError {
    fn from(value: ModelError) -> Self {
        match value {
            ModelError::IdentifierAttributeRemoval { family, attribute } => {
                Self::IdentifierAttributeRemoval { family, attribute }
            }
            other => Self::Model(other),
        }
    }
}

impl From<RepoError> for FamilyServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Family service facade over repository implementations.
pub struct FamilyService<R: FamilyRepository> {
    repo: R,
    validator: FamilyValidator,
    hooks: Vec<Box<dyn PreSaveHook>>,
}

impl<R: FamilyRepository> FamilyService<R> {
    /// Creates a service with the default validator and hooks.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            validator: FamilyValidator::default(),
            hooks: default_hooks(),
        }
    }

    pub fn with_validator(mut self, validator: FamilyValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Appends one hook after the default ones.
    pub fn with_hook(mut self, hook: impl PreSaveHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Loads one family or fails with `FamilyNotFound`.
    pub fn get_family(&self, code: &str) -> Result<Family, FamilyServiceError> {
        self.repo
            .get_family(code)?
            .ok_or_else(|| FamilyServiceError::FamilyNotFound(code.to_string()))
    }

    /// Validates, runs pre-save hooks, then persists the family.
    ///
    /// Hooks work on a staged copy; `family` only takes the hooked state once
    /// the repository write succeeded, and stays untouched on any error.
    ///
    /// # Errors
    /// - `Rejected` when any constraint reports a violation.
    /// - `Model`/`Repo` for structural or storage failures.
    pub fn save_family(&self, family: &mut Family) -> Result<(), FamilyServiceError> {
        family.validate()?;

        let violations = self.validator.validate(family);
        if !violations.is_empty() {
            warn!(
                "event=family_save module=service status=rejected family={} violations={}",
                family.code,
                violations.len()
            );
            return Err(FamilyServiceError::Rejected(violations));
        }

        let mut staged = family.clone();
        run_pre_save_hooks(&self.hooks, SaveSubject::Family(&mut staged));

        if let Err(err) = self.repo.save_family(&staged) {
            warn!(
                "event=family_save module=service status=error family={} error={err}",
                family.code
            );
            return Err(err.into());
        }
        *family = staged;
        Ok(())
    }

    /// Removes one attribute from a family and saves it.
    ///
    /// Returns the violation list: empty when the family was saved with the
    /// removal cascaded into its variants, non-empty when the removal was
    /// rejected and nothing was persisted.
    pub fn remove_attribute_from_family(
        &self,
        family_code: &str,
        attribute_code: &str,
    ) -> Result<ViolationList, FamilyServiceError> {
        let mut family = self.get_family(family_code)?;
        if family.remove_attribute(attribute_code)?.is_none() {
            return Err(FamilyServiceError::AttributeNotInFamily {
                family: family_code.to_string(),
                attribute: attribute_code.to_string(),
            });
        }

        match self.save_family(&mut family) {
            Ok(()) => {
                info!(
                    "event=family_attribute_remove module=service status=ok family={} attribute={}",
                    family_code, attribute_code
                );
                Ok(ViolationList::new())
            }
            Err(FamilyServiceError::Rejected(violations)) => Ok(violations),
            Err(other) => Err(other),
        }
    }

    /// Attribute codes used as axis by any variant of the family.
    pub fn attribute_codes_used_as_axis(
        &self,
        family_code: &str,
    ) -> Result<Vec<String>, FamilyServiceError> {
        let family = self.get_family(family_code)?;
        Ok(family
            .attribute_codes_used_as_axis()
            .into_iter()
            .map(str::to_string)
            .collect())
    }
}
