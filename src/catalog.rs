//! Option documentation, presets, and required-STL patterns.
//!
//! The catalog is the hand-authored half of the STL selector manifest. It is
//! loaded from JSON (the embedded microscope catalog by default) and validated
//! up front so schema checks later only have to compare it against the build.
use crate::templates;
use crate::value::{ParamMap, ParamValue};
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Current schema version for catalog JSON files.
pub const CATALOG_SCHEMA_VERSION: u32 = 1;

/// Documentation for one user-facing option.
///
/// Fields the generator does not interpret are kept in `extra` so the manifest
/// can echo the docs verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDoc {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SubOption>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One documented value of an enumerated option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubOption {
    pub key: ParamValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A recommended, pre-validated bundle of option values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub key: String,
    pub title: String,
    pub description: String,
    pub parameters: ParamMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub schema_version: u32,
    #[serde(default)]
    pub option_docs: Vec<OptionDoc>,
    #[serde(default)]
    pub presets: Vec<Preset>,
    /// Regexes over STL names; a buildable set needs at least one match each.
    #[serde(default)]
    pub required_stls: Vec<String>,
}

impl Catalog {
    /// Compile the required-STL patterns.
    pub fn required_patterns(&self) -> Result<Vec<Regex>> {
        self.required_stls
            .iter()
            .map(|pattern| {
                Regex::new(pattern).with_context(|| format!("compile required pattern {pattern:?}"))
            })
            .collect()
    }
}

/// Parse and validate the embedded microscope catalog.
pub fn default_catalog() -> Result<Catalog> {
    let catalog: Catalog = serde_json::from_str(templates::MICROSCOPE_CATALOG_JSON)
        .context("parse embedded microscope catalog")?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

/// Load and validate a catalog from a JSON file.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let bytes = fs::read(path).with_context(|| format!("read catalog {}", path.display()))?;
    let catalog: Catalog = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse catalog JSON {}", path.display()))?;
    validate_catalog(&catalog).with_context(|| format!("validate catalog {}", path.display()))?;
    Ok(catalog)
}

/// Validate catalog structure independent of any build.
pub fn validate_catalog(catalog: &Catalog) -> Result<()> {
    if catalog.schema_version != CATALOG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported catalog schema_version {} (expected {CATALOG_SCHEMA_VERSION})",
            catalog.schema_version
        ));
    }

    let mut doc_keys = BTreeSet::new();
    for doc in &catalog.option_docs {
        if doc.key.trim().is_empty() {
            return Err(anyhow!("option docs entries must have a non-empty key"));
        }
        if !doc_keys.insert(doc.key.as_str()) {
            return Err(anyhow!("option '{}' is documented more than once", doc.key));
        }
        if let Some(options) = &doc.options {
            let mut seen = BTreeSet::new();
            for option in options {
                if !seen.insert(&option.key) {
                    return Err(anyhow!(
                        "sub-option {} of '{}' is documented more than once",
                        option.key,
                        doc.key
                    ));
                }
            }
        }
    }

    let mut preset_keys = BTreeSet::new();
    for preset in &catalog.presets {
        if !preset_keys.insert(preset.key.as_str()) {
            return Err(anyhow!("preset '{}' is defined more than once", preset.key));
        }
    }

    catalog.required_patterns()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_catalog() -> Catalog {
        serde_json::from_str(
            r#"{
                "schema_version": 1,
                "option_docs": [
                    {"key": "riser", "default": "sample", "description": "Riser type"}
                ],
                "presets": [],
                "required_stls": ["^main_body_.*\\.stl"]
            }"#,
        )
        .expect("parse catalog")
    }

    #[test]
    fn embedded_catalog_is_valid() {
        let catalog = default_catalog().expect("default catalog");
        assert_eq!(catalog.schema_version, CATALOG_SCHEMA_VERSION);
        assert_eq!(catalog.presets.len(), 3);
        assert_eq!(catalog.required_stls.len(), 3);
        let stand = catalog
            .option_docs
            .iter()
            .find(|doc| doc.key == "microscope_stand:box_h")
            .expect("box_h docs");
        assert_eq!(stand.default, Some(ParamValue::Int(30)));
        assert_eq!(stand.advanced, Some(true));
    }

    #[test]
    fn rejects_unknown_schema_version() {
        let mut catalog = minimal_catalog();
        catalog.schema_version = 7;
        let err = validate_catalog(&catalog).expect_err("bad version");
        assert!(err.to_string().contains("schema_version 7"));
    }

    #[test]
    fn rejects_duplicate_doc_keys() {
        let mut catalog = minimal_catalog();
        catalog.option_docs.push(catalog.option_docs[0].clone());
        let err = validate_catalog(&catalog).expect_err("duplicate");
        assert!(err.to_string().contains("'riser'"));
    }

    #[test]
    fn rejects_invalid_required_pattern() {
        let mut catalog = minimal_catalog();
        catalog.required_stls.push("^(feet".to_string());
        assert!(validate_catalog(&catalog).is_err());
    }

    #[test]
    fn unknown_doc_fields_survive_roundtrip() {
        let doc: OptionDoc = serde_json::from_str(
            r#"{"key": "base", "default": "bucket", "description": "Base", "group": "stand"}"#,
        )
        .expect("parse doc");
        assert_eq!(doc.extra["group"], serde_json::json!("stand"));
        let json = serde_json::to_value(&doc).expect("serialize doc");
        assert_eq!(json["group"], "stand");
        assert!(json.get("options").is_none());
    }

    #[test]
    fn sub_options_without_titles_are_echoed_verbatim() {
        let text = r#"{"key":"riser","default":"sample","description":"Riser type","options":[{"key":"sample"},{"key":"slide","title":"Slide riser"}]}"#;
        let doc: OptionDoc = serde_json::from_str(text).expect("parse doc");
        let options = doc.options.as_ref().expect("sub-options");
        assert_eq!(options[0].title, None);
        assert_eq!(options[1].title.as_deref(), Some("Slide riser"));

        let json = serde_json::to_value(&doc).expect("serialize doc");
        let original: serde_json::Value = serde_json::from_str(text).expect("parse text");
        assert_eq!(json, original);
    }
}
