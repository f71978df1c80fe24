//! Internal-API JSON view of a family.
//!
//! # Responsibility
//! - Shape a family for the edit form, including axis usage so the UI can
//!   lock attributes that cannot be removed.
//!
//! # Invariants
//! - `attributes` keeps family order.
//! - `attributes_used_as_axis` has no duplicates, first-seen variant order.

use crate::model::attribute::Attribute;
use crate::model::family::Family;
use serde::Serialize;
use serde_json::Value;

/// Form identifier the edit UI routes on.
pub const FAMILY_EDIT_FORM: &str = "pim-family-edit-form";

/// Normalization switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Emit attributes as `{code}` only instead of `{code, type}`.
    pub full_attributes: bool,
}

#[derive(Serialize)]
#[serde(untagged)]
enum NormalizedAttribute<'a> {
    CodeOnly { code: &'a str },
    Typed(&'a Attribute),
}

#[derive(Serialize)]
struct NormalizedMeta<'a> {
    code: &'a str,
    form: &'static str,
}

#[derive(Serialize)]
struct NormalizedFamily<'a> {
    code: &'a str,
    attributes: Vec<NormalizedAttribute<'a>>,
    family_variants: Vec<&'a str>,
    attributes_used_as_axis: Vec<&'a str>,
    meta: NormalizedMeta<'a>,
}

/// Normalizes a family for the internal API.
pub fn normalize_family(family: &Family, options: &NormalizeOptions) -> serde_json::Result<Value> {
    let attributes = family
        .attributes()
        .iter()
        .map(|attribute| {
            if options.full_attributes {
                NormalizedAttribute::CodeOnly {
                    code: attribute.code.as_str(),
                }
            } else {
                NormalizedAttribute::Typed(attribute)
            }
        })
        .collect();

    serde_json::to_value(NormalizedFamily {
        code: family.code.as_str(),
        attributes,
        family_variants: family
            .family_variants()
            .iter()
            .map(|variant| variant.code.as_str())
            .collect(),
        attributes_used_as_axis: family.attribute_codes_used_as_axis(),
        meta: NormalizedMeta {
            code: family.code.as_str(),
            form: FAMILY_EDIT_FORM,
        },
    })
}
