//! Pass@K statistics over grouped samples, plus the unbiased pass@k estimator.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::metrics::{DEFAULT_K, ESTIMATE_KEY_PREFIX};
use crate::grouping::ProblemGroups;
use crate::types::ProblemId;

/// Inputs for [`compute_pass_at_k`] beyond the grouped records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassAtKOptions {
    /// Nominal generations per problem, recorded in the report.
    pub k: usize,
    /// Extra k values for the unbiased pass@k estimator (empty disables it).
    pub estimator_ks: Vec<usize>,
}

impl Default for PassAtKOptions {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            estimator_ks: Vec::new(),
        }
    }
}

/// Per-problem pass counts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemStats {
    /// Derived problem identity.
    pub problem_id: ProblemId,
    /// Samples with `pass == true`.
    pub passed_samples: usize,
    /// Samples in the group.
    pub total_samples: usize,
    /// At least one sample passed.
    pub passed: bool,
}

/// Problem- and sample-level pass statistics for one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PassAtKReport {
    /// Nominal K this report was computed for.
    pub k: usize,
    /// Percentage of problems with at least one passing generation.
    pub pass_at_k: f64,
    /// Distinct problems.
    pub total_problems: usize,
    /// Problems with at least one passing generation.
    pub passed_problems: usize,
    /// Sample records across all problems.
    pub total_samples: usize,
    /// Sample records that passed.
    pub passed_samples: usize,
    /// Percentage of individual samples that passed.
    pub sample_pass_rate: f64,
    /// Group size -> number of problems with that many samples.
    pub sample_count_distribution: BTreeMap<usize, usize>,
    /// Counts per problem, in group order.
    pub per_problem_stats: Vec<ProblemStats>,
    /// Mean unbiased pass@k estimate (percent) keyed `pass@<k>`.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub estimated_pass_at: IndexMap<String, f64>,
}

/// Percentage with a zero denominator short-circuited to 0.
pub fn percentage(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

/// Compute pass@K where a problem passes if any of its generations passes.
pub fn compute_pass_at_k(groups: &ProblemGroups, options: &PassAtKOptions) -> PassAtKReport {
    let mut sample_count_distribution: BTreeMap<usize, usize> = BTreeMap::new();
    let mut per_problem_stats = Vec::with_capacity(groups.len());
    let mut passed_problems = 0usize;

    for group in groups {
        *sample_count_distribution.entry(group.len()).or_insert(0) += 1;
        let passed_samples = group.passed_count();
        let passed = passed_samples > 0;
        if passed {
            passed_problems += 1;
        }
        per_problem_stats.push(ProblemStats {
            problem_id: group.problem_id.clone(),
            passed_samples,
            total_samples: group.len(),
            passed,
        });
    }

    // Sample-level counts come from the flat record view, not from the groups' tallies.
    let total_samples = groups.records().count();
    let passed_samples = groups.records().filter(|record| record.verdict.pass).count();

    let estimated_pass_at = options
        .estimator_ks
        .iter()
        .map(|&k| {
            let key = format!("{ESTIMATE_KEY_PREFIX}{k}");
            (key, mean_estimate(&per_problem_stats, k))
        })
        .collect();

    PassAtKReport {
        k: options.k,
        pass_at_k: percentage(passed_problems, groups.len()),
        total_problems: groups.len(),
        passed_problems,
        total_samples,
        passed_samples,
        sample_pass_rate: percentage(passed_samples, total_samples),
        sample_count_distribution,
        per_problem_stats,
        estimated_pass_at,
    }
}

fn mean_estimate(stats: &[ProblemStats], k: usize) -> f64 {
    if stats.is_empty() {
        return 0.0;
    }
    let sum: f64 = stats
        .iter()
        .map(|entry| estimate_pass_at_k(entry.total_samples, entry.passed_samples, k))
        .sum();
    sum / stats.len() as f64 * 100.0
}

/// Unbiased pass@k estimate for one problem with `n` samples, `c` of them correct.
///
/// Computes `1 - C(n-c, k) / C(n, k)` in log space.
///
/// * `c == 0` or `k == 0` => 0.0
/// * `c >= n` or `k > n` => 1.0
pub fn estimate_pass_at_k(n: usize, c: usize, k: usize) -> f64 {
    if c == 0 || k == 0 {
        return 0.0;
    }
    if c >= n || k > n {
        return 1.0;
    }
    let mut log_ratio = 0.0f64;
    for i in 0..k {
        if n - c <= i {
            return 1.0;
        }
        let numerator = (n - c - i) as f64;
        let denominator = (n - i) as f64;
        log_ratio += numerator.ln() - denominator.ln();
    }
    1.0 - log_ratio.exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SampleRecord, Verdict};
    use crate::grouping::group_records;
    use crate::key::KeyDeriver;

    fn batch(problem: &str, total: usize, passing: usize) -> Vec<SampleRecord> {
        (0..total)
            .map(|idx| {
                SampleRecord::new(
                    format!("{problem}_g{idx}"),
                    "by simp",
                    Verdict::new(idx < passing, idx < passing),
                )
            })
            .collect()
    }

    #[test]
    fn pass_at_k_counts_problems_with_any_success() {
        let mut records = batch("full", 32, 32);
        records.extend(batch("none", 32, 0));
        let groups = group_records(records, &KeyDeriver::default());
        let report = compute_pass_at_k(&groups, &PassAtKOptions::default());
        assert_eq!(report.k, 32);
        assert_eq!(report.total_problems, 2);
        assert_eq!(report.passed_problems, 1);
        assert!((report.pass_at_k - 50.0).abs() < 1e-9);
        assert_eq!(report.total_samples, 64);
        assert_eq!(report.passed_samples, 32);
        assert!((report.sample_pass_rate - 50.0).abs() < 1e-9);
        assert_eq!(report.sample_count_distribution.get(&32), Some(&2));
    }

    #[test]
    fn pass_at_k_on_empty_input_is_zero() {
        let groups = group_records(Vec::new(), &KeyDeriver::default());
        let report = compute_pass_at_k(&groups, &PassAtKOptions::default());
        assert_eq!(report.pass_at_k, 0.0);
        assert_eq!(report.sample_pass_rate, 0.0);
        assert_eq!(report.total_problems, 0);
        assert!(report.per_problem_stats.is_empty());
        assert!(report.sample_count_distribution.is_empty());
    }

    #[test]
    fn distribution_surfaces_irregular_sampling() {
        let mut records = batch("a", 4, 1);
        records.extend(batch("b", 4, 0));
        records.extend(batch("c", 2, 2));
        let groups = group_records(records, &KeyDeriver::default());
        let report = compute_pass_at_k(&groups, &PassAtKOptions { k: 4, ..Default::default() });
        assert_eq!(report.sample_count_distribution.get(&4), Some(&2));
        assert_eq!(report.sample_count_distribution.get(&2), Some(&1));
        let c = &report.per_problem_stats[2];
        assert_eq!(c.problem_id, "c");
        assert_eq!((c.passed_samples, c.total_samples, c.passed), (2, 2, true));
    }

    #[test]
    fn report_serializes_without_estimates_by_default() {
        let groups = group_records(batch("p", 2, 1), &KeyDeriver::default());
        let report = compute_pass_at_k(&groups, &PassAtKOptions::default());
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("estimated_pass_at").is_none());
        assert_eq!(value["sample_count_distribution"]["2"], 1);
        let back: PassAtKReport = serde_json::from_value(value).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn estimator_matches_closed_form() {
        assert_eq!(estimate_pass_at_k(10, 0, 1), 0.0);
        assert_eq!(estimate_pass_at_k(10, 10, 5), 1.0);
        assert_eq!(estimate_pass_at_k(5, 1, 8), 1.0);
        assert_eq!(estimate_pass_at_k(5, 4, 3), 1.0);
        assert!((estimate_pass_at_k(10, 5, 1) - 0.5).abs() < 1e-9);
        // 1 - C(2,2)/C(4,2) = 1 - 1/6
        assert!((estimate_pass_at_k(4, 2, 2) - 5.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn estimated_pass_at_averages_over_problems() {
        let mut records = batch("a", 4, 2);
        records.extend(batch("b", 4, 0));
        let groups = group_records(records, &KeyDeriver::default());
        let options = PassAtKOptions {
            k: 4,
            estimator_ks: vec![1, 4],
        };
        let report = compute_pass_at_k(&groups, &options);
        assert!((report.estimated_pass_at["pass@1"] - 25.0).abs() < 1e-9);
        assert!((report.estimated_pass_at["pass@4"] - 50.0).abs() < 1e-9);
    }
}
