//! Name canonicalization and cross-dataset entity resolution.
//!
//! The stages run in strict sequence per dataset: normalize the raw name
//! column, detect divergence against the reference registry, fuzzy-match
//! every mismatched name, overlay curated overrides, and write the winning
//! names back by original row index. Individual unresolved names degrade to
//! the raw value; only structural problems in the override ledger abort a
//! dataset's resolution.

pub mod divergence;
pub mod fuzzy;
pub mod normalize;
pub mod overrides;
pub mod resolution;

use thiserror::Error;

/// Structural failures that abort one dataset's resolution. Per-name
/// failures (no confident match, name normalizing to empty) are defined
/// outcomes, not errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolutionError {
    #[error(
        "conflicting overrides for dataset '{dataset}' at row {index}: '{first}' vs '{second}'"
    )]
    ConflictingOverride {
        dataset: String,
        index: usize,
        first: String,
        second: String,
    },

    #[error("override for dataset '{dataset}' targets row {index}, but the dataset has {len} rows")]
    IndexOutOfRange {
        dataset: String,
        index: usize,
        len: usize,
    },
}
