//! Violation values and the family validator registry.

use crate::model::family::Family;
use crate::validation::axis_usage::FamilyAttributesUsedAsAxis;
use serde::Serialize;

/// One structured validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Stable name of the constraint that produced this violation.
    pub constraint: &'static str,
    /// Attribute code the violation is about.
    pub attribute: String,
    /// Family variant code the violation is about.
    pub family_variant: String,
    /// Rendered, user-facing message.
    pub message: String,
}

/// Ordered violation collection returned by validators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ViolationList {
    items: Vec<Violation>,
}

impl ViolationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.items.push(violation);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.items.iter()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.items
            .iter()
            .map(|violation| violation.message.as_str())
            .collect()
    }
}

impl Extend<Violation> for ViolationList {
    fn extend<T: IntoIterator<Item = Violation>>(&mut self, iter: T) {
        self.items.extend(iter);
    }
}

impl IntoIterator for ViolationList {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ViolationList {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Business constraint evaluated against a whole family.
pub trait FamilyConstraint {
    /// Stable constraint name, copied into every produced violation.
    fn name(&self) -> &'static str;
    fn validate(&self, family: &Family) -> Vec<Violation>;
}

/// Ordered set of family constraints.
pub struct FamilyValidator {
    constraints: Vec<Box<dyn FamilyConstraint>>,
}

impl FamilyValidator {
    /// Creates a validator without constraints.
    pub fn empty() -> Self {
        Self {
            constraints: Vec::new(),
        }
    }

    pub fn with_constraint(mut self, constraint: impl FamilyConstraint + 'static) -> Self {
        self.constraints.push(Box::new(constraint));
        self
    }

    pub fn constraint_names(&self) -> Vec<&'static str> {
        self.constraints
            .iter()
            .map(|constraint| constraint.name())
            .collect()
    }

    /// Runs every constraint in registration order.
    pub fn validate(&self, family: &Family) -> ViolationList {
        let mut violations = ViolationList::new();
        for constraint in &self.constraints {
            violations.extend(constraint.validate(family));
        }
        violations
    }
}

impl Default for FamilyValidator {
    fn default() -> Self {
        Self::empty().with_constraint(FamilyAttributesUsedAsAxis::new())
    }
}

/// Replaces `%placeholder%` tokens in a message template.
pub(crate) fn render_message(template: &str, parameters: &[(&str, &str)]) -> String {
    parameters
        .iter()
        .fold(template.to_string(), |message, (placeholder, value)| {
            message.replace(placeholder, value)
        })
}

#[cfg(test)]
mod tests {
    use super::{render_message, FamilyConstraint, FamilyValidator, Violation};
    use crate::model::family::Family;

    struct AlwaysFails;

    impl FamilyConstraint for AlwaysFails {
        fn name(&self) -> &'static str {
            "always_fails"
        }

        fn validate(&self, family: &Family) -> Vec<Violation> {
            vec![Violation {
                constraint: self.name(),
                attribute: String::new(),
                family_variant: String::new(),
                message: format!("{} is invalid", family.code),
            }]
        }
    }

    #[test]
    fn render_message_replaces_every_placeholder() {
        let message = render_message(
            "Attribute \"%attribute%\" in \"%family_variant%\"",
            &[("%attribute%", "size"), ("%family_variant%", "shoes_size")],
        );
        assert_eq!(message, "Attribute \"size\" in \"shoes_size\"");
    }

    #[test]
    fn validator_runs_constraints_in_registration_order() {
        let validator = FamilyValidator::default().with_constraint(AlwaysFails);
        assert_eq!(
            validator.constraint_names(),
            vec!["family_attributes_used_as_axis", "always_fails"]
        );

        let violations = validator.validate(&Family::new("shoes"));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations.messages(), vec!["shoes is invalid"]);
    }

    #[test]
    fn empty_validator_accepts_everything() {
        let violations = FamilyValidator::empty().validate(&Family::new("shoes"));
        assert!(violations.is_empty());
    }
}
