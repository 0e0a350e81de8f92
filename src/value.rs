//! Option values shared by build parameters, selection predicates and the
//! accumulated option schema.
//!
//! Values are totally ordered so they can be kept in `BTreeSet`s; the JSON
//! manifest then gets sorted lists for free.
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A single option value as OpenSCAD and the manifest understand it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Build parameters keyed by option name.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// Option usage keyed by option name.
pub type OptionMap = BTreeMap<String, OptionValue>;

impl ParamValue {
    fn rank(&self) -> u8 {
        match self {
            ParamValue::Bool(_) => 0,
            ParamValue::Int(_) => 1,
            ParamValue::Float(_) => 2,
            ParamValue::Str(_) => 3,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ParamValue {}

impl PartialOrd for ParamValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ParamValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ParamValue::Bool(a), ParamValue::Bool(b)) => a.cmp(b),
            (ParamValue::Int(a), ParamValue::Int(b)) => a.cmp(b),
            (ParamValue::Float(a), ParamValue::Float(b)) => a.total_cmp(b),
            (ParamValue::Str(a), ParamValue::Str(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(value) => write!(f, "{value}"),
            ParamValue::Int(value) => write!(f, "{value}"),
            ParamValue::Float(value) => write!(f, "{value}"),
            ParamValue::Str(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

/// Value recorded against an option key while collecting usage.
///
/// `Set` means "any one of these" in a selection clause and "every value seen"
/// once accumulated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Scalar(ParamValue),
    Set(BTreeSet<ParamValue>),
    #[allow(dead_code)]
    Mapping(OptionMap),
}

impl OptionValue {
    /// Build a `Set` from anything convertible to values.
    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        OptionValue::Set(values.into_iter().map(Into::into).collect())
    }

    /// Short type label used in merge diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            OptionValue::Scalar(_) => "scalar",
            OptionValue::Set(_) => "set",
            OptionValue::Mapping(_) => "mapping",
        }
    }
}

impl From<ParamValue> for OptionValue {
    fn from(value: ParamValue) -> Self {
        OptionValue::Scalar(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Scalar(value.into())
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Scalar(value.into())
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Scalar(value.into())
    }
}

/// Lift build parameters into option usage.
pub fn to_option_map(params: &ParamMap) -> OptionMap {
    params
        .iter()
        .map(|(key, value)| (key.clone(), OptionValue::Scalar(value.clone())))
        .collect()
}

/// Build a [`ParamMap`] from `(name, value)` pairs.
pub fn param_map<const N: usize>(entries: [(&str, ParamValue); N]) -> ParamMap {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Build an [`OptionMap`] from `(name, value)` pairs.
pub fn option_map<const N: usize>(entries: [(&str, OptionValue); N]) -> OptionMap {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
