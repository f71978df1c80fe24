//! Family domain model.
//!
//! # Responsibility
//! - Own the ordered attribute list applicable to a category of products.
//! - Own the family variants that split those products along axes.
//!
//! # Invariants
//! - Attribute codes are unique within a family; insertion order is kept.
//! - The identifier attribute can never be removed.
//! - Every owned variant points back to this family's `code`.

use crate::model::attribute::{validate_code, Attribute};
use crate::model::error::ModelError;
use crate::model::family_variant::FamilyVariant;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Named grouping of attributes plus its family variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    pub code: String,
    attributes: Vec<Attribute>,
    family_variants: Vec<FamilyVariant>,
}

impl Family {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            attributes: Vec::new(),
            family_variants: Vec::new(),
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Attribute codes in insertion order.
    pub fn attribute_codes(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .map(|attribute| attribute.code.as_str())
            .collect()
    }

    pub fn has_attribute(&self, code: &str) -> bool {
        self.attributes.iter().any(|attribute| attribute.code == code)
    }

    /// Adds an attribute. Returns `false` when the code is already present.
    pub fn add_attribute(&mut self, attribute: Attribute) -> bool {
        if self.has_attribute(&attribute.code) {
            return false;
        }
        self.attributes.push(attribute);
        true
    }

    /// Removes one attribute from the family attribute list.
    ///
    /// Only the family list is changed; family variants are reconciled by the
    /// pre-save pruning hook once the removal passes validation.
    ///
    /// # Errors
    /// - `IdentifierAttributeRemoval` when `code` names the identifier.
    pub fn remove_attribute(&mut self, code: &str) -> Result<Option<Attribute>, ModelError> {
        let Some(position) = self
            .attributes
            .iter()
            .position(|attribute| attribute.code == code)
        else {
            return Ok(None);
        };

        if self.attributes[position].is_identifier() {
            return Err(ModelError::IdentifierAttributeRemoval {
                family: self.code.clone(),
                attribute: code.to_string(),
            });
        }

        Ok(Some(self.attributes.remove(position)))
    }

    pub fn family_variants(&self) -> &[FamilyVariant] {
        &self.family_variants
    }

    pub fn family_variants_mut(&mut self) -> &mut [FamilyVariant] {
        &mut self.family_variants
    }

    pub fn family_variant(&self, code: &str) -> Option<&FamilyVariant> {
        self.family_variants
            .iter()
            .find(|variant| variant.code == code)
    }

    /// Attaches a variant and points its back-reference at this family.
    pub fn add_family_variant(&mut self, mut family_variant: FamilyVariant) {
        family_variant.family_code = self.code.clone();
        self.family_variants.push(family_variant);
    }

    /// Codes used as axis by any variant, first-seen order, no duplicates.
    pub fn attribute_codes_used_as_axis(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.family_variants
            .iter()
            .flat_map(|variant| variant.axis_codes())
            .filter(|code| seen.insert(*code))
            .collect()
    }

    /// Checks codes, uniqueness and variant back-references.
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_code("family", &self.code)?;

        let mut attribute_codes = HashSet::new();
        for attribute in &self.attributes {
            attribute.validate()?;
            if !attribute_codes.insert(attribute.code.as_str()) {
                return Err(ModelError::DuplicateAttribute {
                    family: self.code.clone(),
                    attribute: attribute.code.clone(),
                });
            }
        }

        let mut variant_codes = HashSet::new();
        for variant in &self.family_variants {
            variant.validate()?;
            if variant.family_code != self.code {
                return Err(ModelError::FamilyMismatch {
                    family_variant: variant.code.clone(),
                    expected: self.code.clone(),
                    actual: variant.family_code.clone(),
                });
            }
            if !variant_codes.insert(variant.code.as_str()) {
                return Err(ModelError::DuplicateFamilyVariant {
                    family: self.code.clone(),
                    family_variant: variant.code.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Family;
    use crate::model::attribute::{Attribute, AttributeType};
    use crate::model::error::ModelError;
    use crate::model::family_variant::{FamilyVariant, VariantAttributeSet};

    fn select(code: &str) -> Attribute {
        Attribute::new(code, AttributeType::SimpleSelect)
    }

    #[test]
    fn add_attribute_keeps_order_and_rejects_duplicates() {
        let mut family = Family::new("shoes");
        assert!(family.add_attribute(Attribute::new("sku", AttributeType::Identifier)));
        assert!(family.add_attribute(select("size")));
        assert!(!family.add_attribute(select("size")));
        assert_eq!(family.attribute_codes(), vec!["sku", "size"]);
    }

    #[test]
    fn remove_attribute_refuses_identifier() {
        let mut family = Family::new("shoes");
        family.add_attribute(Attribute::new("sku", AttributeType::Identifier));
        family.add_attribute(select("size"));

        let err = family.remove_attribute("sku").unwrap_err();
        assert!(matches!(err, ModelError::IdentifierAttributeRemoval { .. }));
        assert!(family.has_attribute("sku"));

        let removed = family.remove_attribute("size").unwrap();
        assert_eq!(removed.map(|attribute| attribute.code), Some("size".to_string()));
        assert_eq!(family.remove_attribute("size").unwrap(), None);
    }

    #[test]
    fn add_family_variant_sets_back_reference() {
        let mut family = Family::new("shoes");
        family.add_family_variant(FamilyVariant::new("shoes_size", "other"));
        assert_eq!(family.family_variants()[0].family_code, "shoes");
        assert!(family.validate().is_ok());
    }

    #[test]
    fn attribute_codes_used_as_axis_are_deduplicated() {
        let mut family = Family::new("shoes");
        let mut by_size = FamilyVariant::new("shoes_size", "shoes");
        by_size.add_variant_attribute_set(VariantAttributeSet::new(1).with_axes([select("size")]));
        let mut by_size_color = FamilyVariant::new("shoes_size_color", "shoes");
        by_size_color
            .add_variant_attribute_set(VariantAttributeSet::new(1).with_axes([select("color")]));
        by_size_color
            .add_variant_attribute_set(VariantAttributeSet::new(2).with_axes([select("size")]));
        family.add_family_variant(by_size);
        family.add_family_variant(by_size_color);

        assert_eq!(family.attribute_codes_used_as_axis(), vec!["size", "color"]);
    }

    #[test]
    fn validate_reports_duplicate_variants() {
        let mut family = Family::new("shoes");
        family.add_family_variant(FamilyVariant::new("shoes_size", "shoes"));
        family.add_family_variant(FamilyVariant::new("shoes_size", "shoes"));
        assert!(matches!(
            family.validate(),
            Err(ModelError::DuplicateFamilyVariant { .. })
        ));
    }
}
