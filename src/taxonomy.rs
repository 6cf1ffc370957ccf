//! Multi-level correctness rollups over a per-sample taxonomy.
//!
//! Each sample carries an ordered list of `{level_name: label}` entries. The
//! list must have the same length and the same level name at each position
//! for every sample; [`TaxonomySchema::from_records`] checks this once and
//! any violation aborts the run.
//!
//! Within a label, generations of the same problem are counted once: a
//! problem is solved under a label when any of its samples carrying that label
//! is correct.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::correctness::CorrectnessPredicate;
use crate::data::SampleRecord;
use crate::errors::EvalError;
use crate::key::KeyDeriver;
use crate::metrics::percentage;
use crate::types::{LevelLabel, LevelName, ProblemId};

/// Validated level order shared by every sample of a dataset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaxonomySchema {
    levels: Vec<LevelName>,
}

impl TaxonomySchema {
    /// Schema with an explicit level order.
    pub fn new(levels: Vec<LevelName>) -> Self {
        Self { levels }
    }

    /// Derive the schema from the first record and check every record against it.
    ///
    /// An empty input yields a schema with no levels.
    pub fn from_records(records: &[SampleRecord]) -> Result<Self, EvalError> {
        let Some(first) = records.first() else {
            return Ok(Self::default());
        };
        let lookup = first
            .level_lookup
            .as_ref()
            .ok_or_else(|| EvalError::MissingTaxonomy {
                sample_id: first.sample_id.clone(),
            })?;
        let mut levels = Vec::with_capacity(lookup.len());
        for (index, entry) in lookup.iter().enumerate() {
            let (name, _) = entry.single().ok_or_else(|| EvalError::Taxonomy {
                sample_id: first.sample_id.clone(),
                details: format!(
                    "level entry {index} must hold exactly one key, found {}",
                    entry.len()
                ),
            })?;
            levels.push(name.to_string());
        }
        let schema = Self { levels };
        for record in records {
            schema.labels(record)?;
        }
        debug!(
            records = records.len(),
            depth = schema.depth(),
            levels = ?schema.levels,
            "validated taxonomy schema"
        );
        Ok(schema)
    }

    /// Number of taxonomy levels.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Level names in order.
    pub fn levels(&self) -> &[LevelName] {
        &self.levels
    }

    /// Labels of `record` at every level, checked against this schema.
    pub fn labels(&self, record: &SampleRecord) -> Result<Vec<LevelLabel>, EvalError> {
        let lookup = record
            .level_lookup
            .as_ref()
            .ok_or_else(|| EvalError::MissingTaxonomy {
                sample_id: record.sample_id.clone(),
            })?;
        if lookup.len() != self.levels.len() {
            return Err(EvalError::Taxonomy {
                sample_id: record.sample_id.clone(),
                details: format!(
                    "expected {} taxonomy levels, found {}",
                    self.levels.len(),
                    lookup.len()
                ),
            });
        }
        let mut labels = Vec::with_capacity(lookup.len());
        for (index, (entry, expected)) in lookup.iter().zip(&self.levels).enumerate() {
            let (name, label) = entry.single().ok_or_else(|| EvalError::Taxonomy {
                sample_id: record.sample_id.clone(),
                details: format!(
                    "level entry {index} must hold exactly one key, found {}",
                    entry.len()
                ),
            })?;
            if name != expected {
                return Err(EvalError::LevelMismatch {
                    sample_id: record.sample_id.clone(),
                    index,
                    expected: expected.clone(),
                    found: name.to_string(),
                });
            }
            labels.push(label);
        }
        Ok(labels)
    }
}

/// Counts for one label at one level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRow {
    /// Label value at this level.
    pub label: LevelLabel,
    /// Distinct problems under the label with at least one correct sample.
    pub solved_problems: usize,
    /// Distinct problems under the label.
    pub total_problems: usize,
    /// Samples under the label that count as correct.
    pub correct_samples: usize,
    /// Samples under the label.
    pub total_samples: usize,
}

/// Per-label rollup for one taxonomy level, rows sorted by label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTable {
    /// Level name, e.g. `source`.
    pub level: LevelName,
    /// One row per label.
    pub rows: Vec<LevelRow>,
}

/// Headline numbers for one taxonomy level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSummary {
    /// Level name.
    pub level: LevelName,
    /// Distinct (label, problem) pairs at this level.
    pub problem_num: usize,
    /// Solved (label, problem) pairs at this level.
    pub solved_num: usize,
    /// `solved_num / problem_num * 100` with two decimals.
    pub solved_ratio: String,
    /// Distinct labels at this level.
    pub label_num: usize,
    /// Labels with at least one correct sample.
    pub solved_label_num: usize,
}

impl LevelTable {
    /// Collapse the table into its headline numbers.
    pub fn summary(&self) -> LevelSummary {
        let problem_num = self.rows.iter().map(|row| row.total_problems).sum();
        let solved_num = self.rows.iter().map(|row| row.solved_problems).sum();
        LevelSummary {
            level: self.level.clone(),
            problem_num,
            solved_num,
            solved_ratio: format!("{:.2}", percentage(solved_num, problem_num)),
            label_num: self.rows.len(),
            solved_label_num: self
                .rows
                .iter()
                .filter(|row| row.correct_samples > 0)
                .count(),
        }
    }
}

#[derive(Default)]
struct LabelTally {
    problems: IndexMap<ProblemId, bool>,
    correct_samples: usize,
    total_samples: usize,
}

/// Roll correctness up across every level of `schema`, one table per level.
pub fn aggregate_levels(
    records: &[SampleRecord],
    schema: &TaxonomySchema,
    predicate: &CorrectnessPredicate,
    keys: &KeyDeriver,
) -> Result<Vec<LevelTable>, EvalError> {
    let mut tallies: Vec<BTreeMap<LevelLabel, LabelTally>> =
        (0..schema.depth()).map(|_| BTreeMap::new()).collect();

    for record in records {
        let labels = schema.labels(record)?;
        let correct = predicate.is_correct(record);
        let problem_id = keys.key_for(record);
        for (level_tallies, label) in tallies.iter_mut().zip(labels) {
            let tally = level_tallies.entry(label).or_default();
            tally.total_samples += 1;
            if correct {
                tally.correct_samples += 1;
            }
            let solved = tally.problems.entry(problem_id.clone()).or_insert(false);
            *solved |= correct;
        }
    }

    let tables: Vec<LevelTable> = schema
        .levels()
        .iter()
        .zip(tallies)
        .map(|(level, level_tallies)| LevelTable {
            level: level.clone(),
            rows: level_tallies
                .into_iter()
                .map(|(label, tally)| LevelRow {
                    label,
                    solved_problems: tally.problems.values().filter(|solved| **solved).count(),
                    total_problems: tally.problems.len(),
                    correct_samples: tally.correct_samples,
                    total_samples: tally.total_samples,
                })
                .collect(),
        })
        .collect();
    debug!(
        records = records.len(),
        levels = tables.len(),
        field = predicate.field().as_str(),
        "aggregated taxonomy levels"
    );
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correctness::VerdictField;
    use crate::data::{LevelEntry, Verdict};

    fn sample(id: &str, pass: bool, source: &str, topic: &str) -> SampleRecord {
        SampleRecord::new(id, "by simp", Verdict::new(pass, pass)).with_levels(vec![
            LevelEntry::new("source", source),
            LevelEntry::new("topic", topic),
        ])
    }

    fn aggregate(records: &[SampleRecord]) -> Vec<LevelTable> {
        let schema = TaxonomySchema::from_records(records).unwrap();
        aggregate_levels(
            records,
            &schema,
            &CorrectnessPredicate::new(VerdictField::Pass),
            &KeyDeriver::default(),
        )
        .unwrap()
    }

    #[test]
    fn generations_of_one_problem_count_once_per_label() {
        let records = vec![
            sample("p1_g0", false, "minif2f", "algebra"),
            sample("p1_g1", true, "minif2f", "algebra"),
            sample("p2_g0", false, "minif2f", "number_theory"),
            sample("p3_g0", true, "putnam", "algebra"),
        ];
        let tables = aggregate(&records);
        assert_eq!(tables.len(), 2);

        let source = &tables[0];
        assert_eq!(source.level, "source");
        assert_eq!(source.rows[0].label, "minif2f");
        assert_eq!(source.rows[0].total_problems, 2);
        assert_eq!(source.rows[0].solved_problems, 1);
        assert_eq!(source.rows[0].total_samples, 3);
        assert_eq!(source.rows[0].correct_samples, 1);
        assert_eq!(source.rows[1].label, "putnam");
        assert_eq!(source.rows[1].solved_problems, 1);

        let topic = &tables[1];
        let labels: Vec<&str> = topic.rows.iter().map(|row| row.label.as_str()).collect();
        assert_eq!(labels, vec!["algebra", "number_theory"]);
        assert_eq!(topic.rows[0].total_problems, 2);
        assert_eq!(topic.rows[0].solved_problems, 2);
    }

    #[test]
    fn summary_reports_two_decimal_ratio() {
        let records = vec![
            sample("a_g0", true, "s", "x"),
            sample("b_g0", false, "s", "y"),
            sample("c_g0", false, "s", "z"),
        ];
        let tables = aggregate(&records);
        let summary = tables[1].summary();
        assert_eq!(summary.problem_num, 3);
        assert_eq!(summary.solved_num, 1);
        assert_eq!(summary.solved_ratio, "33.33");
        assert_eq!(summary.label_num, 3);
        assert_eq!(summary.solved_label_num, 1);
    }

    #[test]
    fn placeholder_code_is_not_solved() {
        let mut record = sample("p_g0", true, "s", "x");
        record.code = "by apply?".to_string();
        let tables = aggregate(&[record]);
        assert_eq!(tables[0].rows[0].solved_problems, 0);
        assert_eq!(tables[0].summary().solved_ratio, "0.00");
    }

    #[test]
    fn depth_mismatch_is_fatal() {
        let records = vec![
            sample("a_g0", true, "s", "x"),
            SampleRecord::new("b_g0", "", Verdict::default())
                .with_levels(vec![LevelEntry::new("source", "s")]),
        ];
        let err = TaxonomySchema::from_records(&records).unwrap_err();
        assert!(matches!(err, EvalError::Taxonomy { ref sample_id, .. } if sample_id == "b_g0"));
    }

    #[test]
    fn level_name_mismatch_is_fatal() {
        let records = vec![
            sample("a_g0", true, "s", "x"),
            SampleRecord::new("b_g0", "", Verdict::default()).with_levels(vec![
                LevelEntry::new("topic", "x"),
                LevelEntry::new("source", "s"),
            ]),
        ];
        let err = TaxonomySchema::from_records(&records).unwrap_err();
        assert!(matches!(err, EvalError::LevelMismatch { index: 0, .. }));
    }

    #[test]
    fn missing_lookup_and_multi_key_entries_are_fatal() {
        let bare = SampleRecord::new("a_g0", "", Verdict::default());
        assert!(matches!(
            TaxonomySchema::from_records(&[bare]),
            Err(EvalError::MissingTaxonomy { .. })
        ));

        let mut wide = LevelEntry::new("source", "s");
        wide.0.insert("topic".to_string(), serde_json::json!("x"));
        let record = SampleRecord::new("b_g0", "", Verdict::default()).with_levels(vec![wide]);
        assert!(matches!(
            TaxonomySchema::from_records(&[record]),
            Err(EvalError::Taxonomy { .. })
        ));
    }

    #[test]
    fn empty_input_has_no_levels() {
        let schema = TaxonomySchema::from_records(&[]).unwrap();
        assert_eq!(schema.depth(), 0);
        let tables = aggregate_levels(
            &[],
            &schema,
            &CorrectnessPredicate::default(),
            &KeyDeriver::default(),
        )
        .unwrap();
        assert!(tables.is_empty());
    }

    #[test]
    fn records_are_rechecked_against_an_explicit_schema() {
        let schema = TaxonomySchema::new(vec!["difficulty".to_string()]);
        let records = vec![sample("a_g0", true, "s", "x")];
        let result = aggregate_levels(
            &records,
            &schema,
            &CorrectnessPredicate::default(),
            &KeyDeriver::default(),
        );
        assert!(result.is_err());
    }
}
