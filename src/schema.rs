//! Manifest types and the changeable-option schema.
//!
//! The schema is derived from accumulated option usage: options that never
//! vary are dropped, `{false, true}` collapses to `"bool"`, and every surviving
//! option is checked against the catalog docs.
use crate::catalog::{Catalog, OptionDoc, Preset};
use crate::error::{GenerateError, GenerateResult};
use crate::value::{OptionMap, OptionValue, ParamValue};
use regex::Regex;
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Changeable options keyed by option name.
pub type OptionSchema = BTreeMap<String, ChangeableOption>;

/// One registration of an STL under one selection clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StlRecord {
    pub stl: String,
    pub input: String,
    pub parameters: OptionMap,
}

/// Values a user can pick for an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeableOption {
    /// Serialized as the literal `"bool"`.
    Bool,
    /// Allowed values, in documentation order when docs enumerate them.
    Values(Vec<ParamValue>),
}

impl ChangeableOption {
    fn observed(&self) -> BTreeSet<ParamValue> {
        match self {
            ChangeableOption::Bool => [ParamValue::Bool(false), ParamValue::Bool(true)].into(),
            ChangeableOption::Values(values) => values.iter().cloned().collect(),
        }
    }
}

impl Serialize for ChangeableOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ChangeableOption::Bool => serializer.serialize_str("bool"),
            ChangeableOption::Values(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
        }
    }
}

/// The `stl_options.json` document consumed by the STL selector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    pub stls: Vec<StlRecord>,
    pub options: OptionSchema,
    pub docs: Vec<OptionDoc>,
    pub required: Vec<String>,
    pub presets: Vec<Preset>,
}

/// Reduce accumulated option usage to the options a user can change.
///
/// `selection_keys` are options only ever used to select STLs; a boolean one
/// stays changeable even when the build only uses one of its values.
pub fn changeable_options(
    available: &OptionMap,
    selection_keys: &BTreeSet<String>,
) -> GenerateResult<OptionSchema> {
    let mut options = OptionSchema::new();
    for (name, usage) in available {
        let values = match usage {
            OptionValue::Set(values) => values.clone(),
            OptionValue::Scalar(value) => BTreeSet::from([value.clone()]),
            OptionValue::Mapping(nested) => {
                if nested.len() > 1 || selection_keys.contains(name) {
                    return Err(GenerateError::NestedOption { key: name.clone() });
                }
                continue;
            }
        };

        if values.len() > 1 {
            let option = if is_bool_pair(&values) {
                ChangeableOption::Bool
            } else {
                ChangeableOption::Values(values.into_iter().collect())
            };
            options.insert(name.clone(), option);
        } else if selection_keys.contains(name) {
            let option = if values.iter().all(|v| v.as_bool().is_some()) {
                ChangeableOption::Bool
            } else {
                ChangeableOption::Values(values.into_iter().collect())
            };
            options.insert(name.clone(), option);
        } else {
            tracing::debug!(option = %name, "dropping option with a single value");
        }
    }
    Ok(options)
}

fn is_bool_pair(values: &BTreeSet<ParamValue>) -> bool {
    values.len() == 2 && values.iter().all(|value| value.as_bool().is_some())
}

/// Check every changeable option against the docs and adopt documented order.
pub fn apply_option_docs(options: &mut OptionSchema, docs: &[OptionDoc]) -> GenerateResult<()> {
    for (key, option) in options.iter_mut() {
        let doc = docs
            .iter()
            .find(|doc| &doc.key == key)
            .ok_or_else(|| GenerateError::UndocumentedOption { key: key.clone() })?;
        if doc.description.is_none() {
            return Err(GenerateError::MissingDescription { key: key.clone() });
        }
        if doc.default.is_none() {
            return Err(GenerateError::MissingDefault { key: key.clone() });
        }
        let Some(sub_options) = &doc.options else {
            continue;
        };

        let documented: Vec<ParamValue> = sub_options.iter().map(|sub| sub.key.clone()).collect();
        let documented_set: BTreeSet<ParamValue> = documented.iter().cloned().collect();
        let observed = option.observed();
        if documented_set != observed {
            return Err(GenerateError::SubOptionMismatch {
                key: key.clone(),
                undocumented: observed.difference(&documented_set).cloned().collect(),
                unobserved: documented_set.difference(&observed).cloned().collect(),
            });
        }
        *option = ChangeableOption::Values(documented);
    }
    Ok(())
}

/// A catalog entry that does not line up with the generated STL set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogDrift {
    /// A required pattern that matches no registered STL.
    UnmatchedRequired { pattern: String },
    /// A preset sets an option that is not in the schema.
    UnknownPresetOption { preset: String, option: String },
}

/// Log and return catalog entries that look inconsistent with the generated
/// STL set.
///
/// None of these are fatal: presets and required patterns are advisory for
/// the selector UI.
pub fn warn_catalog_drift(manifest: &Manifest, catalog: &Catalog) -> Vec<CatalogDrift> {
    let mut drift = Vec::new();
    for pattern in &catalog.required_stls {
        let Ok(regex) = Regex::new(pattern) else {
            continue;
        };
        if !manifest.stls.iter().any(|record| regex.is_match(&record.stl)) {
            tracing::warn!(pattern = %pattern, "required STL pattern matches no registered STL");
            drift.push(CatalogDrift::UnmatchedRequired {
                pattern: pattern.clone(),
            });
        }
    }
    for preset in &catalog.presets {
        for key in preset.parameters.keys() {
            if !manifest.options.contains_key(key) {
                tracing::warn!(
                    preset = %preset.key,
                    option = %key,
                    "preset sets an option that is not changeable"
                );
                drift.push(CatalogDrift::UnknownPresetOption {
                    preset: preset.key.clone(),
                    option: key.clone(),
                });
            }
        }
    }
    drift
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
