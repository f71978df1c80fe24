//! Cascade of family attribute removals into family variants.
//!
//! Whenever an attribute is removed from a family, it must also disappear
//! from every variant attribute set of the family variants.
//!
//! # Invariants
//! - Only variant attribute set *attributes* are pruned; axes are kept.
//! - Variants and sets are visited in stored order.
//! - Running the pruner twice changes nothing the second time.

use crate::hooks::{PreSaveHook, SaveSubject};
use crate::model::family::Family;
use crate::model::family_variant::FamilyVariant;
use log::{debug, info};
use std::collections::HashSet;

/// Pre-save hook pruning removed family attributes from family variants.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveAttributeFromFamilyVariants;

impl PreSaveHook for RemoveAttributeFromFamilyVariants {
    fn name(&self) -> &'static str {
        "remove_attribute_from_family_variants"
    }

    fn pre_save(&self, subject: SaveSubject<'_>) {
        match subject {
            SaveSubject::Family(family) => {
                remove_deleted_attributes_from_family_variants(family);
            }
            other => debug!(
                "event=family_variant_prune module=hooks status=skipped subject={}",
                other.kind()
            ),
        }
    }
}

/// Removes from every family variant the attributes the family no longer has.
///
/// Returns the number of set memberships removed.
pub fn remove_deleted_attributes_from_family_variants(family: &mut Family) -> usize {
    let family_attribute_codes: HashSet<String> = family
        .attribute_codes()
        .into_iter()
        .map(str::to_string)
        .collect();
    let family_code = family.code.clone();

    let mut removed = 0;
    for family_variant in family.family_variants_mut() {
        let extra = extra_attribute_codes(&family_attribute_codes, family_variant);
        if extra.is_empty() {
            continue;
        }

        let pruned = remove_from_variant_attribute_sets(family_variant, &extra);
        if pruned > 0 {
            info!(
                "event=family_variant_prune module=hooks status=ok family={} family_variant={} attributes={} removed={}",
                family_code,
                family_variant.code,
                extra.join(","),
                pruned
            );
        }
        removed += pruned;
    }

    removed
}

/// Codes referenced by the variant (attributes and axes) missing from the family.
fn extra_attribute_codes(
    family_attribute_codes: &HashSet<String>,
    family_variant: &FamilyVariant,
) -> Vec<String> {
    let mut seen = HashSet::new();
    family_variant
        .attributes()
        .into_iter()
        .chain(family_variant.axes())
        .map(|attribute| attribute.code.as_str())
        .filter(|code| !family_attribute_codes.contains(*code) && seen.insert(*code))
        .map(str::to_string)
        .collect()
}

fn remove_from_variant_attribute_sets(
    family_variant: &mut FamilyVariant,
    extra: &[String],
) -> usize {
    let mut removed = 0;
    for set in family_variant.variant_attribute_sets_mut() {
        for code in extra {
            if set.remove_attribute(code) {
                removed += 1;
            }
        }
    }
    removed
}
