#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command runners behind the shipped binaries.
pub mod apps;
/// Evaluation configuration.
pub mod config;
/// Centralized constants used across key derivation, metrics, and outputs.
pub mod constants;
/// Per-sample correctness predicate.
pub mod correctness;
/// Sample record and verdict types.
pub mod data;
/// Per-problem grouping of sample records.
pub mod grouping;
/// Loading compiler output and taxonomy side data.
pub mod ingestion;
/// Problem identity derivation from sample ids.
pub mod key;
/// Pass@K statistics.
pub mod metrics;
/// Outcome buckets and representative selection.
pub mod outcome;
/// Multi-level taxonomy rollups.
pub mod taxonomy;
/// Output transports (filesystem today).
pub mod transport;
/// Shared type aliases.
pub mod types;
/// Code normalization and filename helpers.
pub mod utils;

mod errors;

pub use config::EvalConfig;
pub use correctness::{CorrectnessPredicate, VerdictField};
pub use data::{LevelEntry, SampleRecord, Verdict};
pub use errors::EvalError;
pub use grouping::{ProblemGroup, ProblemGroups, group_records};
pub use ingestion::{TaxonomyTable, load_records};
pub use key::{KeyDeriver, KeySource};
pub use metrics::{PassAtKOptions, PassAtKReport, ProblemStats, compute_pass_at_k};
pub use outcome::{ClassifiedProblem, ExtractionSummary, Outcome, OutcomeReport, classify_outcomes};
pub use taxonomy::{LevelRow, LevelSummary, LevelTable, TaxonomySchema, aggregate_levels};
pub use types::{CodeText, LevelLabel, LevelName, ProblemId, SampleId};
