//! Family variant domain model.
//!
//! # Responsibility
//! - Describe how products of one family are split along axis attributes.
//! - Group attributes into level-ordered variant attribute sets.
//!
//! # Invariants
//! - `family_code` is a non-owning back-reference to exactly one family.
//! - Variant attribute sets are kept sorted by `level`, levels start at 1.
//! - Within one set, axis and attribute codes are unique.

use crate::model::attribute::{validate_code, Attribute};
use crate::model::error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Level-scoped grouping of attributes inside one family variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantAttributeSet {
    pub level: u32,
    axes: Vec<Attribute>,
    attributes: Vec<Attribute>,
}

impl VariantAttributeSet {
    pub fn new(level: u32) -> Self {
        Self {
            level,
            axes: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Builder-style helper used by fixtures and loaders.
    pub fn with_axes(mut self, axes: impl IntoIterator<Item = Attribute>) -> Self {
        for axis in axes {
            self.add_axis(axis);
        }
        self
    }

    /// Builder-style helper used by fixtures and loaders.
    pub fn with_attributes(mut self, attributes: impl IntoIterator<Item = Attribute>) -> Self {
        for attribute in attributes {
            self.add_attribute(attribute);
        }
        self
    }

    pub fn axes(&self) -> &[Attribute] {
        &self.axes
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Adds an axis. Returns `false` when the code is already an axis here.
    pub fn add_axis(&mut self, axis: Attribute) -> bool {
        if self.axes.iter().any(|existing| existing.code == axis.code) {
            return false;
        }
        self.axes.push(axis);
        true
    }

    /// Adds an attribute. Returns `false` when the code is already present.
    pub fn add_attribute(&mut self, attribute: Attribute) -> bool {
        if self.has_attribute(&attribute.code) {
            return false;
        }
        self.attributes.push(attribute);
        true
    }

    pub fn has_attribute(&self, code: &str) -> bool {
        self.attributes.iter().any(|attribute| attribute.code == code)
    }

    /// Removes one attribute by code. Removing an absent code is a no-op.
    ///
    /// Axes are never touched.
    pub fn remove_attribute(&mut self, code: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|attribute| attribute.code != code);
        self.attributes.len() != before
    }
}

/// Split definition of one family into product variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyVariant {
    pub code: String,
    pub family_code: String,
    variant_attribute_sets: Vec<VariantAttributeSet>,
}

impl FamilyVariant {
    pub fn new(code: impl Into<String>, family_code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            family_code: family_code.into(),
            variant_attribute_sets: Vec::new(),
        }
    }

    /// Adds one set, keeping sets ordered by level.
    pub fn add_variant_attribute_set(&mut self, set: VariantAttributeSet) {
        let position = self
            .variant_attribute_sets
            .partition_point(|existing| existing.level <= set.level);
        self.variant_attribute_sets.insert(position, set);
    }

    pub fn variant_attribute_sets(&self) -> &[VariantAttributeSet] {
        &self.variant_attribute_sets
    }

    pub fn variant_attribute_sets_mut(&mut self) -> &mut [VariantAttributeSet] {
        &mut self.variant_attribute_sets
    }

    pub fn variant_attribute_set(&self, level: u32) -> Option<&VariantAttributeSet> {
        self.variant_attribute_sets
            .iter()
            .find(|set| set.level == level)
    }

    pub fn number_of_levels(&self) -> usize {
        self.variant_attribute_sets.len()
    }

    /// Axes of every level, deduplicated by code, in level order.
    pub fn axes(&self) -> Vec<&Attribute> {
        collect_unique(self.variant_attribute_sets.iter().flat_map(|set| set.axes()))
    }

    /// Attributes of every level, deduplicated by code, in level order.
    pub fn attributes(&self) -> Vec<&Attribute> {
        collect_unique(
            self.variant_attribute_sets
                .iter()
                .flat_map(|set| set.attributes()),
        )
    }

    pub fn axis_codes(&self) -> Vec<&str> {
        self.axes()
            .into_iter()
            .map(|attribute| attribute.code.as_str())
            .collect()
    }

    /// Checks code format and level numbering.
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_code("family variant", &self.code)?;

        let mut levels = HashSet::new();
        for set in &self.variant_attribute_sets {
            if set.level == 0 || !levels.insert(set.level) {
                return Err(ModelError::InvalidLevel {
                    family_variant: self.code.clone(),
                    level: set.level,
                });
            }
            for attribute in set.axes().iter().chain(set.attributes()) {
                attribute.validate()?;
            }
        }

        Ok(())
    }
}

fn collect_unique<'a>(attributes: impl Iterator<Item = &'a Attribute>) -> Vec<&'a Attribute> {
    let mut seen = HashSet::new();
    attributes
        .filter(|attribute| seen.insert(attribute.code.as_str()))
        .collect()
}
