use crate::constants::key::DEFAULT_GENERATION_MARKER;
use crate::constants::metrics::DEFAULT_K;
use crate::constants::outcome::DEFAULT_ARTIFACT_EXTENSION;
use crate::correctness::{CorrectnessPredicate, VerdictField};
use crate::key::{KeyDeriver, KeySource};
use crate::metrics::PassAtKOptions;
use crate::types::GenerationMarker;

/// Top-level evaluation configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Separator between a problem base id and its generation index.
    pub generation_marker: GenerationMarker,
    /// Record field that carries the authoritative identity.
    pub key_source: KeySource,
    /// Nominal K used for report naming.
    pub k: usize,
    /// Generations every problem is expected to have.
    ///
    /// Required for outcome bucketing; `None` makes classification fail
    /// instead of guessing.
    pub expected_k: Option<usize>,
    /// Extra k values for the unbiased pass@k estimator.
    pub estimator_ks: Vec<usize>,
    /// Verdict flag the taxonomy rollup treats as solved.
    pub correctness_field: VerdictField,
    /// File extension for extracted artifacts (empty for none).
    pub artifact_extension: String,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            generation_marker: DEFAULT_GENERATION_MARKER.to_string(),
            key_source: KeySource::SampleId,
            k: DEFAULT_K,
            expected_k: Some(DEFAULT_K),
            estimator_ks: Vec::new(),
            correctness_field: VerdictField::Complete,
            artifact_extension: DEFAULT_ARTIFACT_EXTENSION.to_string(),
        }
    }
}

impl EvalConfig {
    /// Key deriver for this configuration.
    pub fn key_deriver(&self) -> KeyDeriver {
        KeyDeriver::new(self.generation_marker.clone(), self.key_source)
    }

    /// Pass@K options for this configuration.
    pub fn pass_at_k_options(&self) -> PassAtKOptions {
        PassAtKOptions {
            k: self.k,
            estimator_ks: self.estimator_ks.clone(),
        }
    }

    /// Correctness predicate for this configuration.
    pub fn correctness(&self) -> CorrectnessPredicate {
        CorrectnessPredicate::new(self.correctness_field)
    }
}
