//! Attribute domain model.
//!
//! # Responsibility
//! - Define the typed field referenced by families and family variants.
//! - Own the code format rule shared by every catalog entity.
//!
//! # Invariants
//! - `code` is the immutable identity of an attribute.
//! - Exactly one attribute type (`identifier`) marks the product identifier.

use crate::model::error::ModelError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Stable identifier for attributes. Kept as an alias to make intent explicit.
pub type AttributeCode = String;

const MAX_CODE_CHARS: usize = 100;

static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid code regex"));

/// Value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// Product identifier (SKU). Mandatory in every family.
    Identifier,
    Text,
    Number,
    Boolean,
    /// Single choice among options. Typical variation axis.
    SimpleSelect,
    /// Value with a unit, e.g. a size or a weight.
    Metric,
}

impl AttributeType {
    /// Stable string used in storage and API payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::SimpleSelect => "simple_select",
            Self::Metric => "metric",
        }
    }

    /// Parses the stable string form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "identifier" => Some(Self::Identifier),
            "text" => Some(Self::Text),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "simple_select" => Some(Self::SimpleSelect),
            "metric" => Some(Self::Metric),
            _ => None,
        }
    }
}

/// Typed field identified by a unique code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    pub code: AttributeCode,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
}

impl Attribute {
    pub fn new(code: impl Into<AttributeCode>, attribute_type: AttributeType) -> Self {
        Self {
            code: code.into(),
            attribute_type,
        }
    }

    /// Returns whether this attribute is the product identifier.
    pub fn is_identifier(&self) -> bool {
        self.attribute_type == AttributeType::Identifier
    }

    /// Checks the attribute code format.
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_code("attribute", &self.code)
    }
}

/// Validates a catalog entity code: ASCII letters, digits and underscores,
/// at most 100 chars.
pub(crate) fn validate_code(entity: &'static str, code: &str) -> Result<(), ModelError> {
    if code.chars().count() > MAX_CODE_CHARS || !CODE_RE.is_match(code) {
        return Err(ModelError::InvalidCode {
            entity,
            code: code.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_code, Attribute, AttributeType};

    #[test]
    fn attribute_type_string_form_is_stable() {
        for kind in [
            AttributeType::Identifier,
            AttributeType::Text,
            AttributeType::Number,
            AttributeType::Boolean,
            AttributeType::SimpleSelect,
            AttributeType::Metric,
        ] {
            assert_eq!(AttributeType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(AttributeType::parse("date"), None);
    }

    #[test]
    fn validate_code_rejects_blank_and_punctuation() {
        assert!(validate_code("attribute", "").is_err());
        assert!(validate_code("attribute", "shoe size").is_err());
        assert!(validate_code("attribute", "size-eu").is_err());
        assert!(validate_code("attribute", "size_eu_42").is_ok());
    }

    #[test]
    fn validate_code_rejects_overlong_codes() {
        let code = "a".repeat(101);
        assert!(validate_code("attribute", &code).is_err());
        assert!(validate_code("attribute", &code[..100]).is_ok());
    }

    #[test]
    fn identifier_flag_follows_type() {
        assert!(Attribute::new("sku", AttributeType::Identifier).is_identifier());
        assert!(!Attribute::new("size", AttributeType::SimpleSelect).is_identifier());
    }
}
