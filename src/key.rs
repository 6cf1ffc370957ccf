//! Canonical problem identity derived from per-generation sample ids.

use crate::constants::key::DEFAULT_GENERATION_MARKER;
use crate::data::SampleRecord;
use crate::types::{GenerationMarker, ProblemId};

/// Which record field carries the authoritative identity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeySource {
    /// Derive the problem from `sample_id` (or `name`).
    #[default]
    SampleId,
    /// Derive the problem from `problem_id`.
    ProblemId,
}

/// Maps sample ids of the form `<base><marker><index>` to `<base>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyDeriver {
    marker: GenerationMarker,
    source: KeySource,
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self::new(DEFAULT_GENERATION_MARKER, KeySource::default())
    }
}

impl KeyDeriver {
    /// Create a deriver for `marker`, reading identities from `source`.
    pub fn new(marker: impl Into<GenerationMarker>, source: KeySource) -> Self {
        Self {
            marker: marker.into(),
            source,
        }
    }

    /// The generation marker in use.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Strip the generation suffix from `sample_id`.
    ///
    /// Only a marker followed by a non-empty run of ASCII digits counts as a
    /// generation suffix, so `imo_geometry` stays `imo_geometry` under the
    /// default `_g` marker. Anything else is its own base id.
    pub fn derive<'a>(&self, sample_id: &'a str) -> &'a str {
        self.split(sample_id)
            .map(|(base, _)| base)
            .unwrap_or(sample_id)
    }

    /// Parsed generation index, when `sample_id` carries one.
    pub fn generation_index(&self, sample_id: &str) -> Option<u32> {
        self.split(sample_id)
            .and_then(|(_, index)| index.parse::<u32>().ok())
    }

    /// Problem identity for `record` under the configured key source.
    pub fn key_for(&self, record: &SampleRecord) -> ProblemId {
        self.derive(self.source_id(record)).to_string()
    }

    /// Generation index for `record` under the configured key source.
    pub fn index_for(&self, record: &SampleRecord) -> Option<u32> {
        self.generation_index(self.source_id(record))
    }

    fn source_id<'a>(&self, record: &'a SampleRecord) -> &'a str {
        match self.source {
            KeySource::SampleId => &record.sample_id,
            KeySource::ProblemId => &record.problem_id,
        }
    }

    fn split<'a>(&self, sample_id: &'a str) -> Option<(&'a str, &'a str)> {
        if self.marker.is_empty() {
            return None;
        }
        let (base, index) = sample_id.rsplit_once(self.marker.as_str())?;
        if !index.is_empty() && index.bytes().all(|byte| byte.is_ascii_digit()) {
            Some((base, index))
        } else {
            None
        }
    }
}
