//! Guard against removing attributes still used as variation axes.
//!
//! # Invariants
//! - Evaluated on the post-removal family: an attribute being removed is
//!   already absent from the family attribute codes.
//! - One violation per (variant, missing axis) pair.

use crate::model::family::Family;
use crate::model::family_variant::FamilyVariant;
use crate::validation::violation::{render_message, FamilyConstraint, Violation};
use log::debug;
use std::collections::HashSet;

/// Default message template for a missing axis attribute.
pub const MISSING_AXIS_MESSAGE: &str =
    "Attribute \"%attribute%\" is an axis in \"%family_variant%\" family variant. It must belong to the family.";

/// Rejects families whose variants use axes the family no longer has.
#[derive(Debug, Clone)]
pub struct FamilyAttributesUsedAsAxis {
    message: String,
}

impl FamilyAttributesUsedAsAxis {
    pub const NAME: &'static str = "family_attributes_used_as_axis";

    pub fn new() -> Self {
        Self::with_message(MISSING_AXIS_MESSAGE)
    }

    /// Uses a custom template; `%attribute%` and `%family_variant%` are
    /// substituted.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn violations_for_variant(
        &self,
        family_attribute_codes: &HashSet<&str>,
        family_variant: &FamilyVariant,
    ) -> Vec<Violation> {
        family_variant
            .axis_codes()
            .into_iter()
            .filter(|code| !family_attribute_codes.contains(code))
            .map(|code| Violation {
                constraint: Self::NAME,
                attribute: code.to_string(),
                family_variant: family_variant.code.clone(),
                message: render_message(
                    &self.message,
                    &[
                        ("%attribute%", code),
                        ("%family_variant%", family_variant.code.as_str()),
                    ],
                ),
            })
            .collect()
    }
}

impl Default for FamilyAttributesUsedAsAxis {
    fn default() -> Self {
        Self::new()
    }
}

impl FamilyConstraint for FamilyAttributesUsedAsAxis {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn validate(&self, family: &Family) -> Vec<Violation> {
        let family_attribute_codes: HashSet<&str> = family.attribute_codes().into_iter().collect();

        let violations: Vec<Violation> = family
            .family_variants()
            .iter()
            .flat_map(|variant| self.violations_for_variant(&family_attribute_codes, variant))
            .collect();

        if !violations.is_empty() {
            debug!(
                "event=axis_usage_check module=validation status=rejected family={} violations={}",
                family.code,
                violations.len()
            );
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::FamilyAttributesUsedAsAxis;
    use crate::model::attribute::{Attribute, AttributeType};
    use crate::model::family::Family;
    use crate::model::family_variant::{FamilyVariant, VariantAttributeSet};
    use crate::validation::violation::FamilyConstraint;

    fn select(code: &str) -> Attribute {
        Attribute::new(code, AttributeType::SimpleSelect)
    }

    fn variant_with_axes(code: &str, axes: &[&str]) -> FamilyVariant {
        let mut variant = FamilyVariant::new(code, "shoes");
        variant.add_variant_attribute_set(
            VariantAttributeSet::new(1).with_axes(axes.iter().map(|axis| select(axis))),
        );
        variant
    }

    fn shoes() -> Family {
        let mut family = Family::new("shoes");
        family.add_attribute(Attribute::new("sku", AttributeType::Identifier));
        family.add_attribute(select("size"));
        family.add_attribute(select("color"));
        family
    }

    #[test]
    fn family_without_variants_never_violates() {
        let mut family = shoes();
        family.remove_attribute("size").unwrap();
        assert!(FamilyAttributesUsedAsAxis::new().validate(&family).is_empty());
    }

    #[test]
    fn axis_present_in_family_is_accepted() {
        let mut family = shoes();
        family.add_family_variant(variant_with_axes("shoes_size_color", &["size", "color"]));
        assert!(FamilyAttributesUsedAsAxis::new().validate(&family).is_empty());
    }

    #[test]
    fn removed_axis_yields_one_violation_per_variant() {
        let mut family = shoes();
        family.add_family_variant(variant_with_axes("shoes_size", &["size"]));
        family.add_family_variant(variant_with_axes("shoes_size_color", &["size", "color"]));
        family.add_family_variant(variant_with_axes("shoes_color", &["color"]));
        family.remove_attribute("size").unwrap();

        let violations = FamilyAttributesUsedAsAxis::new().validate(&family);
        let pairs: Vec<(&str, &str)> = violations
            .iter()
            .map(|v| (v.attribute.as_str(), v.family_variant.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("size", "shoes_size"), ("size", "shoes_size_color")]
        );
        assert!(violations
            .iter()
            .all(|v| v.constraint == FamilyAttributesUsedAsAxis::NAME));
    }

    #[test]
    fn message_names_attribute_and_variant() {
        let mut family = shoes();
        family.add_family_variant(variant_with_axes("shoes_size_color", &["size", "color"]));
        family.remove_attribute("size").unwrap();

        let violations = FamilyAttributesUsedAsAxis::new().validate(&family);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "Attribute \"size\" is an axis in \"shoes_size_color\" family variant. It must belong to the family."
        );
    }

    #[test]
    fn custom_template_is_rendered() {
        let mut family = shoes();
        family.add_family_variant(variant_with_axes("shoes_color", &["color"]));
        family.remove_attribute("color").unwrap();

        let violations =
            FamilyAttributesUsedAsAxis::with_message("%attribute%@%family_variant%")
                .validate(&family);
        assert_eq!(violations[0].message, "color@shoes_color");
    }
}
