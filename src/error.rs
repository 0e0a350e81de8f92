//! Fatal errors raised while collecting and validating STL options.
//!
//! Every variant aborts the generation pass before any file is written.

use crate::value::ParamValue;
use thiserror::Error;

/// Result type for option collection and schema validation.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Errors that can occur while building the task graph or the option schema.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum GenerateError {
    /// Two usages disagree on whether a key holds a nested mapping.
    #[error("expecting '{expected}' at key '{key}', got {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A nested mapping survived into the changeable-option schema.
    #[error("option '{key}' holds nested options, which the STL selector cannot offer")]
    NestedOption { key: String },

    #[error("no documentation found for '{key}' option, please add it to the option docs")]
    UndocumentedOption { key: String },

    #[error("no description found for '{key}' option, please add it to the option docs")]
    MissingDescription { key: String },

    #[error("no default value found for '{key}' option, please add it to the option docs")]
    MissingDefault { key: String },

    /// Documented sub-options differ from the values the build actually uses.
    #[error(
        "invalid sub-options in option docs for '{key}': used but undocumented {undocumented:?}, documented but unused {unobserved:?}"
    )]
    SubOptionMismatch {
        key: String,
        undocumented: Vec<ParamValue>,
        unobserved: Vec<ParamValue>,
    },

    /// The same output file was declared by two tasks.
    #[error("output '{output}' is declared more than once")]
    DuplicateOutput { output: String },
}
