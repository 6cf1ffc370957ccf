//! Sample records, compiler verdicts, and taxonomy level entries.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::utils::strip_preamble;

pub use crate::types::{CodeText, LevelLabel, LevelName, ProblemId, SampleId};

/// Outcome reported by the external compiler for one candidate.
///
/// Only `pass` and `complete` are interpreted; every other field is carried
/// through untouched in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Candidate compiled (or ran) without error.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub pass: bool,
    /// Candidate fully discharged its goal. Stricter than `pass`.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub complete: bool,
    /// Opaque diagnostics (errors, warnings, timings, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Verdict {
    /// Verdict with the two interpreted flags set and no diagnostics.
    pub fn new(pass: bool, complete: bool) -> Self {
        Self {
            pass,
            complete,
            extra: Map::new(),
        }
    }
}

/// Missing, null, and non-boolean values all read as `false`.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(false))
}

/// One `{level_name: level_label}` entry of a per-sample taxonomy lookup.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelEntry(pub IndexMap<LevelName, Value>);

impl LevelEntry {
    /// Build an entry holding a single level/label pair.
    pub fn new(level: impl Into<LevelName>, label: impl Into<LevelLabel>) -> Self {
        let mut map = IndexMap::new();
        map.insert(level.into(), Value::String(label.into()));
        Self(map)
    }

    /// Number of keys in the entry (well-formed entries hold exactly one).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the entry has no keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The level/label pair when the entry is well formed.
    pub fn single(&self) -> Option<(&str, LevelLabel)> {
        if self.0.len() != 1 {
            return None;
        }
        self.0
            .iter()
            .next()
            .map(|(name, label)| (name.as_str(), label_text(label)))
    }
}

/// Render a JSON label as plain text (strings lose their quotes).
pub fn label_text(value: &Value) -> LevelLabel {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// One compilation attempt for one generated candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSampleRecord")]
pub struct SampleRecord {
    /// Per-generation id, usually `<problem><marker><index>`.
    pub sample_id: SampleId,
    /// Explicit problem identity supplied alongside the sample.
    pub problem_id: ProblemId,
    /// Candidate proof text.
    pub code: CodeText,
    /// Compiler outcome.
    #[serde(rename = "compilation_result")]
    pub verdict: Verdict,
    /// Ordered per-level taxonomy labels for this sample.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_lookup: Option<Vec<LevelEntry>>,
}

impl SampleRecord {
    /// Record with an explicit id, code, and verdict; `problem_id` mirrors the sample id.
    pub fn new(sample_id: impl Into<SampleId>, code: impl Into<CodeText>, verdict: Verdict) -> Self {
        let sample_id = sample_id.into();
        Self {
            problem_id: sample_id.clone(),
            sample_id,
            code: code.into(),
            verdict,
            level_lookup: None,
        }
    }

    /// Override the explicit problem id.
    pub fn with_problem_id(mut self, problem_id: impl Into<ProblemId>) -> Self {
        self.problem_id = problem_id.into();
        self
    }

    /// Attach a taxonomy lookup.
    pub fn with_levels(mut self, levels: Vec<LevelEntry>) -> Self {
        self.level_lookup = Some(levels);
        self
    }
}

/// Wire shape of a compiler output row. Every field is optional so partial rows
/// degrade to defaults instead of failing the run.
#[derive(Deserialize)]
struct RawSampleRecord {
    #[serde(default)]
    sample_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    problem_id: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    full_code: Option<String>,
    #[serde(default)]
    compilation_result: Option<Value>,
    #[serde(default, alias = "id_maps")]
    level_lookup: Option<Vec<LevelEntry>>,
}

impl From<RawSampleRecord> for SampleRecord {
    fn from(raw: RawSampleRecord) -> Self {
        let sample_id = raw
            .sample_id
            .or(raw.name)
            .or_else(|| raw.problem_id.clone())
            .unwrap_or_default();
        let problem_id = raw.problem_id.unwrap_or_else(|| sample_id.clone());
        let code = match (raw.code, raw.full_code) {
            (Some(code), _) => code,
            (None, Some(full)) => strip_preamble(&full),
            (None, None) => String::new(),
        };
        let verdict = raw
            .compilation_result
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default();
        Self {
            sample_id,
            problem_id,
            code,
            verdict,
            level_lookup: raw.level_lookup,
        }
    }
}
