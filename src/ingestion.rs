//! Loading compiler output and the side taxonomy dataset.
//!
//! Both inputs are accepted as a JSON array or as JSON lines. Loading happens
//! once, up front; the evaluation core only ever sees materialized records.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::data::{LevelEntry, SampleRecord};
use crate::errors::EvalError;
use crate::key::KeyDeriver;
use crate::types::{CodeText, ProblemId, SampleId};

/// Parse a JSON array or JSON-lines document into rows.
///
/// Blank lines are skipped in JSON-lines mode. Errors carry the 1-based line.
pub fn parse_rows<T>(text: &str, path: &Path) -> Result<Vec<T>, EvalError>
where
    T: DeserializeOwned,
{
    if text.trim_start().starts_with('[') {
        return serde_json::from_str(text).map_err(|source| EvalError::Parse {
            path: path.to_path_buf(),
            line: source.line(),
            source,
        });
    }
    let mut rows = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row = serde_json::from_str(line).map_err(|source| EvalError::Parse {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Read compiler output records from `path`.
pub fn load_records(path: &Path) -> Result<Vec<SampleRecord>, EvalError> {
    let text = fs::read_to_string(path)?;
    let records: Vec<SampleRecord> = parse_rows(&text, path)?;
    info!(path = %path.display(), records = records.len(), "loaded sample records");
    Ok(records)
}

/// One row of the full-records dataset that carries taxonomy and source code.
#[derive(Debug, Deserialize)]
struct FullRecord {
    problem_id: ProblemId,
    #[serde(default, alias = "level_lookup")]
    id_maps: Option<Vec<LevelEntry>>,
    #[serde(default)]
    full_code: Option<CodeText>,
}

/// Taxonomy and full-code lookups keyed by the id the side dataset uses.
#[derive(Clone, Debug, Default)]
pub struct TaxonomyTable {
    levels: HashMap<ProblemId, Vec<LevelEntry>>,
    codes: HashMap<SampleId, CodeText>,
}

impl TaxonomyTable {
    /// Read a full-records dataset from `path`.
    pub fn load(path: &Path) -> Result<Self, EvalError> {
        let text = fs::read_to_string(path)?;
        let rows: Vec<FullRecord> = parse_rows(&text, path)?;
        let table = Self::from_rows(rows);
        info!(
            path = %path.display(),
            taxonomy_entries = table.levels.len(),
            code_entries = table.codes.len(),
            "loaded full records"
        );
        Ok(table)
    }

    fn from_rows(rows: Vec<FullRecord>) -> Self {
        let mut table = Self::default();
        for row in rows {
            if let Some(code) = row.full_code
                && !code.is_empty()
            {
                table.codes.insert(row.problem_id.clone(), code);
            }
            if let Some(levels) = row.id_maps {
                table.levels.insert(row.problem_id, levels);
            }
        }
        table
    }

    /// Register a taxonomy lookup for `id`.
    pub fn insert(&mut self, id: impl Into<ProblemId>, levels: Vec<LevelEntry>) {
        self.levels.insert(id.into(), levels);
    }

    /// Number of ids with a taxonomy lookup.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// True when no taxonomy was loaded.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Full source code per id, for artifact extraction.
    pub fn code_overrides(&self) -> &HashMap<SampleId, CodeText> {
        &self.codes
    }

    /// Fill `level_lookup` for records that lack one.
    ///
    /// Lookup order: sample id, explicit problem id, then the derived base id.
    /// A record left without a taxonomy is a fatal configuration error.
    pub fn attach(
        &self,
        records: Vec<SampleRecord>,
        keys: &KeyDeriver,
    ) -> Result<Vec<SampleRecord>, EvalError> {
        let mut joined = 0usize;
        let attached = records
            .into_iter()
            .map(|mut record| {
                if record.level_lookup.is_some() {
                    return Ok(record);
                }
                let levels = self
                    .levels
                    .get(&record.sample_id)
                    .or_else(|| self.levels.get(&record.problem_id))
                    .or_else(|| self.levels.get(&keys.key_for(&record)))
                    .ok_or_else(|| EvalError::MissingTaxonomy {
                        sample_id: record.sample_id.clone(),
                    })?;
                record.level_lookup = Some(levels.clone());
                joined += 1;
                Ok(record)
            })
            .collect::<Result<Vec<_>, EvalError>>()?;
        debug!(joined, records = attached.len(), "attached taxonomy lookups");
        Ok(attached)
    }
}
