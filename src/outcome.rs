//! Outcome buckets and representative-sample selection.
//!
//! Every problem lands in exactly one [`Outcome`] and carries exactly one
//! representative record: the first passing generation in canonical order, or
//! the first generation when none passed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::outcome::{FULLY_FAILED_DIR, FULLY_PASSED_DIR, PARTIALLY_PASSED_DIR};
use crate::data::SampleRecord;
use crate::errors::EvalError;
use crate::grouping::{ProblemGroup, ProblemGroups};
use crate::types::{CodeText, ProblemId, SampleId};
use crate::utils::sanitize_file_stem;

/// Outcome bucket for one problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "bucket")]
pub enum Outcome {
    /// Every one of the expected generations passed.
    FullyPassed,
    /// Some generations passed, or all of an incomplete batch passed.
    PartiallyPassed {
        /// Passing generations.
        passed: usize,
        /// Generations present for the problem.
        total: usize,
    },
    /// No generation passed.
    FullyFailed,
}

impl Outcome {
    /// Bucket a problem from its pass counts.
    pub fn from_counts(passed: usize, total: usize, expected_k: usize) -> Self {
        if passed == 0 {
            Outcome::FullyFailed
        } else if passed == total && total == expected_k {
            Outcome::FullyPassed
        } else {
            Outcome::PartiallyPassed { passed, total }
        }
    }

    /// Directory name used for artifacts in this bucket.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Outcome::FullyPassed => FULLY_PASSED_DIR,
            Outcome::PartiallyPassed { .. } => PARTIALLY_PASSED_DIR,
            Outcome::FullyFailed => FULLY_FAILED_DIR,
        }
    }
}

/// One problem with its bucket and representative sample.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassifiedProblem {
    /// Derived problem identity.
    pub problem_id: ProblemId,
    /// Bucket the problem landed in.
    pub outcome: Outcome,
    /// Passing generations.
    pub passed: usize,
    /// Generations present.
    pub total: usize,
    /// Sample whose code is extracted for this problem.
    pub representative: SampleRecord,
}

impl ClassifiedProblem {
    /// Artifact file name; partial passes embed their `<passed>of<total>` counts.
    pub fn artifact_name(&self, extension: &str) -> String {
        let stem = sanitize_file_stem(&self.problem_id);
        let stem = match self.outcome {
            Outcome::PartiallyPassed { passed, total } => format!("{stem}_{passed}of{total}"),
            Outcome::FullyPassed | Outcome::FullyFailed => stem,
        };
        if extension.is_empty() {
            stem
        } else {
            format!("{stem}.{extension}")
        }
    }

    /// Artifact body: an override for the representative's sample id when one
    /// is present and non-empty, otherwise the representative's own code.
    pub fn artifact_code<'a>(&'a self, overrides: &'a HashMap<SampleId, CodeText>) -> &'a str {
        overrides
            .get(&self.representative.sample_id)
            .filter(|code| !code.is_empty())
            .map(String::as_str)
            .unwrap_or(self.representative.code.as_str())
    }
}

/// Classification of every problem of a run, in group order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutcomeReport {
    /// Generations every problem was expected to have.
    pub expected_k: usize,
    /// One entry per problem.
    pub problems: Vec<ClassifiedProblem>,
}

/// Per-bucket counts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    /// Problems in `fully_passed/`.
    pub fully_passed: usize,
    /// Problems in `partially_passed/`.
    pub partially_passed: usize,
    /// Problems in `fully_failed/`.
    pub fully_failed: usize,
    /// Sum of the three buckets.
    pub total: usize,
}

/// Provenance entry for a partially passed problem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialEntry {
    /// Derived problem identity.
    pub problem_id: ProblemId,
    /// Passing generations.
    pub passed: usize,
    /// Generations present.
    pub total: usize,
}

/// JSON summary written next to extracted artifacts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    /// Per-bucket counts.
    pub summary: OutcomeCounts,
    /// Fully passed problem ids, in group order.
    pub fully_passed_problems: Vec<ProblemId>,
    /// Partially passed problems with their counts.
    pub partially_passed_problems: Vec<PartialEntry>,
    /// Fully failed problem ids, in group order.
    pub fully_failed_problems: Vec<ProblemId>,
}

impl OutcomeReport {
    /// Problems in one bucket kind (partial passes match regardless of counts).
    pub fn in_bucket(&self, dir_name: &str) -> impl Iterator<Item = &ClassifiedProblem> {
        self.problems
            .iter()
            .filter(move |problem| problem.outcome.dir_name() == dir_name)
    }

    /// Counts and id lists per bucket.
    pub fn summary(&self) -> ExtractionSummary {
        let mut summary = ExtractionSummary::default();
        for problem in &self.problems {
            match problem.outcome {
                Outcome::FullyPassed => {
                    summary.summary.fully_passed += 1;
                    summary.fully_passed_problems.push(problem.problem_id.clone());
                }
                Outcome::PartiallyPassed { passed, total } => {
                    summary.summary.partially_passed += 1;
                    summary.partially_passed_problems.push(PartialEntry {
                        problem_id: problem.problem_id.clone(),
                        passed,
                        total,
                    });
                }
                Outcome::FullyFailed => {
                    summary.summary.fully_failed += 1;
                    summary.fully_failed_problems.push(problem.problem_id.clone());
                }
            }
        }
        summary.summary.total = self.problems.len();
        summary
    }
}

/// Bucket every problem against `expected_k` generations and pick representatives.
///
/// A missing or zero `expected_k` is a configuration error: without it a
/// truncated batch could be reported as fully passed.
pub fn classify_outcomes(
    groups: &ProblemGroups,
    expected_k: Option<usize>,
) -> Result<OutcomeReport, EvalError> {
    let expected_k = match expected_k {
        Some(k) if k > 0 => k,
        Some(_) => {
            return Err(EvalError::Configuration(
                "expected_k must be greater than zero for outcome bucketing".to_string(),
            ));
        }
        None => {
            return Err(EvalError::Configuration(
                "expected_k is required for outcome bucketing".to_string(),
            ));
        }
    };

    let mut problems = Vec::with_capacity(groups.len());
    let mut irregular = 0usize;
    for group in groups {
        let Some(representative) = select_representative(group) else {
            continue;
        };
        let passed = group.passed_count();
        let total = group.len();
        if total != expected_k {
            irregular += 1;
            warn!(
                problem_id = %group.problem_id,
                samples = total,
                expected_k,
                "problem sample count differs from expected k"
            );
        }
        problems.push(ClassifiedProblem {
            problem_id: group.problem_id.clone(),
            outcome: Outcome::from_counts(passed, total, expected_k),
            passed,
            total,
            representative: representative.clone(),
        });
    }
    info!(
        problems = problems.len(),
        irregular, expected_k, "classified problem outcomes"
    );
    Ok(OutcomeReport {
        expected_k,
        problems,
    })
}

/// First passing member in canonical order, else the first member.
pub fn select_representative(group: &ProblemGroup) -> Option<&SampleRecord> {
    let members = group.canonical_members();
    members
        .iter()
        .find(|record| record.verdict.pass)
        .or_else(|| members.first())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Verdict;
    use crate::grouping::group_records;
    use crate::key::KeyDeriver;

    fn sample(id: &str, pass: bool) -> SampleRecord {
        SampleRecord::new(id, format!("proof {id}"), Verdict::new(pass, false))
    }

    fn classify(records: Vec<SampleRecord>, expected_k: usize) -> OutcomeReport {
        let groups = group_records(records, &KeyDeriver::default());
        classify_outcomes(&groups, Some(expected_k)).unwrap()
    }

    #[test]
    fn half_passing_pair_is_partial_with_first_pass_as_representative() {
        let report = classify(vec![sample("p1_g0", true), sample("p1_g1", false)], 2);
        let problem = &report.problems[0];
        assert_eq!(problem.outcome, Outcome::PartiallyPassed { passed: 1, total: 2 });
        assert_eq!(problem.representative.sample_id, "p1_g0");
        assert_eq!(problem.artifact_name("lean"), "p1_1of2.lean");
    }

    #[test]
    fn full_and_empty_batches_bucket_at_the_extremes() {
        let mut records: Vec<SampleRecord> =
            (0..32).map(|i| sample(&format!("good_g{i}"), true)).collect();
        records.extend((0..32).map(|i| sample(&format!("bad_g{i}"), false)));
        let report = classify(records, 32);
        assert_eq!(report.problems[0].outcome, Outcome::FullyPassed);
        assert_eq!(report.problems[0].artifact_name("lean"), "good.lean");
        assert_eq!(report.problems[1].outcome, Outcome::FullyFailed);
        assert_eq!(report.problems[1].representative.sample_id, "bad_g0");
    }

    #[test]
    fn truncated_batch_that_all_passed_is_only_partial() {
        let report = classify(vec![sample("t_g0", true), sample("t_g1", true)], 4);
        assert_eq!(
            report.problems[0].outcome,
            Outcome::PartiallyPassed { passed: 2, total: 2 }
        );
    }

    #[test]
    fn representative_is_stable_under_member_reordering() {
        let forward = classify(vec![sample("f_g0", false), sample("f_g1", false)], 2);
        let reversed = classify(vec![sample("f_g1", false), sample("f_g0", false)], 2);
        assert_eq!(forward.problems[0].representative.sample_id, "f_g0");
        assert_eq!(reversed.problems[0].representative.sample_id, "f_g0");

        let passing = classify(
            vec![sample("q_g3", true), sample("q_g0", false), sample("q_g1", true)],
            3,
        );
        assert_eq!(passing.problems[0].representative.sample_id, "q_g1");
    }

    #[test]
    fn missing_or_zero_expected_k_is_fatal() {
        let groups = group_records(vec![sample("p_g0", true)], &KeyDeriver::default());
        assert!(matches!(
            classify_outcomes(&groups, None),
            Err(EvalError::Configuration(_))
        ));
        assert!(matches!(
            classify_outcomes(&groups, Some(0)),
            Err(EvalError::Configuration(_))
        ));
    }

    #[test]
    fn summary_lists_each_bucket() {
        let report = classify(
            vec![
                sample("a_g0", true),
                sample("b_g0", false),
                sample("c_g0", true),
                sample("c_g1", false),
            ],
            1,
        );
        let summary = report.summary();
        assert_eq!(summary.summary.fully_passed, 1);
        assert_eq!(summary.summary.fully_failed, 1);
        assert_eq!(summary.summary.partially_passed, 1);
        assert_eq!(summary.summary.total, 3);
        assert_eq!(summary.fully_passed_problems, vec!["a".to_string()]);
        assert_eq!(summary.partially_passed_problems[0].passed, 1);
        assert_eq!(summary.partially_passed_problems[0].total, 2);
        assert_eq!(report.in_bucket(FULLY_FAILED_DIR).count(), 1);
    }

    #[test]
    fn artifact_code_prefers_non_empty_override() {
        let report = classify(vec![sample("o_g0", true)], 1);
        let problem = &report.problems[0];
        let mut overrides = HashMap::new();
        assert_eq!(problem.artifact_code(&overrides), "proof o_g0");
        overrides.insert("o_g0".to_string(), String::new());
        assert_eq!(problem.artifact_code(&overrides), "proof o_g0");
        overrides.insert("o_g0".to_string(), "full proof".to_string());
        assert_eq!(problem.artifact_code(&overrides), "full proof");
        assert_eq!(problem.artifact_name(""), "o");
    }
}
