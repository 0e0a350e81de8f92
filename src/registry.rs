//! STL option registry.
//!
//! Every generated STL is registered with the option values that justify
//! picking it. Registrations are only collected here; `finalize` consumes the
//! registry, so validation runs exactly once per generation pass.
use crate::catalog::Catalog;
use crate::error::GenerateResult;
use crate::merge::merge_all;
use crate::schema::{self, Manifest, StlRecord};
use crate::value::{to_option_map, OptionMap, ParamMap};
use std::collections::BTreeSet;
use std::path::Path;

/// Separator between an input's base name and a file-local parameter.
pub const FILE_LOCAL_SEPARATOR: &str = ":";

/// When an STL should be picked: one clause (all must hold) or several
/// clauses of which any may hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Clause(OptionMap),
    OneOf(Vec<OptionMap>),
}

impl Predicate {
    /// A predicate that always holds.
    pub fn always() -> Self {
        Predicate::Clause(OptionMap::new())
    }

    /// Normalize to a non-empty list of clauses.
    pub fn clauses(&self) -> Vec<&OptionMap> {
        match self {
            Predicate::Clause(clause) => vec![clause],
            Predicate::OneOf(clauses) if clauses.is_empty() => vec![&EMPTY_CLAUSE],
            Predicate::OneOf(clauses) => clauses.iter().collect(),
        }
    }
}

static EMPTY_CLAUSE: OptionMap = OptionMap::new();

impl Default for Predicate {
    fn default() -> Self {
        Predicate::always()
    }
}

impl From<OptionMap> for Predicate {
    fn from(clause: OptionMap) -> Self {
        Predicate::Clause(clause)
    }
}

impl From<Vec<OptionMap>> for Predicate {
    fn from(clauses: Vec<OptionMap>) -> Self {
        Predicate::OneOf(clauses)
    }
}

/// Collects STL registrations for one generation pass.
#[derive(Debug, Clone, Default)]
pub struct OptionRegistry {
    records: Vec<StlRecord>,
    selection_keys: BTreeSet<String>,
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an STL once per clause of `select_if`.
    ///
    /// Each record's parameters are the build parameters, then the clause, then
    /// the file-local parameters prefixed with the input's base name; later
    /// groups win on key collisions.
    pub fn register(
        &mut self,
        stl: &str,
        input: &str,
        parameters: &ParamMap,
        file_local_parameters: &ParamMap,
        select_if: &Predicate,
    ) {
        let prefix = format!("{}{FILE_LOCAL_SEPARATOR}", input_base_name(input));
        let clauses = select_if.clauses();
        for clause in &clauses {
            self.selection_keys.extend(clause.keys().cloned());

            let mut effective = to_option_map(parameters);
            effective.extend(clause.iter().map(|(k, v)| (k.clone(), v.clone())));
            effective.extend(
                to_option_map(file_local_parameters)
                    .into_iter()
                    .map(|(k, v)| (format!("{prefix}{k}"), v)),
            );
            self.records.push(StlRecord {
                stl: stl.to_string(),
                input: input.to_string(),
                parameters: effective,
            });
        }
        tracing::debug!(stl, input, clauses = clauses.len(), "registered stl");
    }

    pub fn records(&self) -> &[StlRecord] {
        &self.records
    }

    pub fn selection_keys(&self) -> &BTreeSet<String> {
        &self.selection_keys
    }

    /// Merge all registrations, validate them against the catalog, and build
    /// the manifest.
    pub fn finalize(self, catalog: &Catalog) -> GenerateResult<Manifest> {
        let available = merge_all(self.records.iter().map(|record| &record.parameters))?;
        let mut options = schema::changeable_options(&available, &self.selection_keys)?;
        schema::apply_option_docs(&mut options, &catalog.option_docs)?;

        let mut stls = self.records;
        stls.sort_by(|a, b| a.stl.cmp(&b.stl));

        tracing::info!(
            stls = stls.len(),
            options = options.len(),
            "stl option schema validated"
        );

        let manifest = Manifest {
            stls,
            options,
            docs: catalog.option_docs.clone(),
            required: catalog.required_stls.clone(),
            presets: catalog.presets.clone(),
        };
        schema::warn_catalog_drift(&manifest, catalog);
        Ok(manifest)
    }
}

/// Input path without its final extension, e.g. `cameras/picamera_2_cover`.
fn input_base_name(input: &str) -> String {
    Path::new(input)
        .with_extension("")
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
