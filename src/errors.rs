use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::{LevelName, SampleId};

/// Error type for evaluation configuration, taxonomy, IO, and parsing failures.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Invalid caller configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A taxonomy lookup has the wrong shape.
    #[error("inconsistent taxonomy at sample '{sample_id}': {details}")]
    Taxonomy {
        /// Offending sample.
        sample_id: SampleId,
        /// What is wrong with its lookup.
        details: String,
    },
    /// A level name differs from the schema at the same position.
    #[error("taxonomy level {index} is named '{found}' at sample '{sample_id}', expected '{expected}'")]
    LevelMismatch {
        /// Offending sample.
        sample_id: SampleId,
        /// Position in the lookup.
        index: usize,
        /// Level name from the schema.
        expected: LevelName,
        /// Level name the sample carries.
        found: LevelName,
    },
    /// A sample has no taxonomy lookup.
    #[error("no taxonomy lookup available for sample '{sample_id}'")]
    MissingTaxonomy {
        /// Sample left without a lookup.
        sample_id: SampleId,
    },
    /// A row of an input file is not valid JSON for its type.
    #[error("failed to parse {} line {line}: {source}", path.display())]
    Parse {
        /// Input file.
        path: PathBuf,
        /// 1-based line (JSON lines) or the serde line (arrays).
        line: usize,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// JSON serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}
