//! Structural errors raised by catalog model operations.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Model-level error for invalid structure or refused mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Code is empty, too long, or contains unsupported characters.
    InvalidCode { entity: &'static str, code: String },
    /// The same attribute code appears twice in one family.
    DuplicateAttribute { family: String, attribute: String },
    /// The same variant code appears twice in one family.
    DuplicateFamilyVariant {
        family: String,
        family_variant: String,
    },
    /// Variant back-reference does not point to its owning family.
    FamilyMismatch {
        family_variant: String,
        expected: String,
        actual: String,
    },
    /// Variant attribute set level is zero or used twice.
    InvalidLevel { family_variant: String, level: u32 },
    /// The identifier attribute is mandatory in every family.
    IdentifierAttributeRemoval { family: String, attribute: String },
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCode { entity, code } => write!(f, "invalid {entity} code `{code}`"),
            Self::DuplicateAttribute { family, attribute } => {
                write!(f, "attribute `{attribute}` appears twice in family `{family}`")
            }
            Self::DuplicateFamilyVariant {
                family,
                family_variant,
            } => write!(
                f,
                "family variant `{family_variant}` appears twice in family `{family}`"
            ),
            Self::FamilyMismatch {
                family_variant,
                expected,
                actual,
            } => write!(
                f,
                "family variant `{family_variant}` belongs to `{actual}`, expected `{expected}`"
            ),
            Self::InvalidLevel {
                family_variant,
                level,
            } => write!(
                f,
                "invalid variant attribute set level {level} in family variant `{family_variant}`"
            ),
            Self::IdentifierAttributeRemoval { family, attribute } => write!(
                f,
                "identifier attribute `{attribute}` cannot be removed from family `{family}`"
            ),
        }
    }
}

impl Error for ModelError {}
