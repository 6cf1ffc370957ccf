use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::constants::outcome::{
    EXTRACTION_REPORT_FILENAME, FULLY_FAILED_DIR, FULLY_PASSED_DIR, PARTIALLY_PASSED_DIR,
};
use crate::constants::taxonomy::{
    LEVEL_TABLE_SUFFIX, META_SUMMARY_FILENAME, TABLE_DELIMITER, TABLE_HEADER,
};
use crate::errors::EvalError;
use crate::metrics::PassAtKReport;
use crate::outcome::{ExtractionSummary, OutcomeReport};
use crate::taxonomy::{LevelSummary, LevelTable};
use crate::types::{CodeText, SampleId};
use crate::utils::sanitize_file_stem;

/// Write `value` as pretty JSON, creating parent directories as needed.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), EvalError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let raw = serde_json::to_vec_pretty(value)?;
    fs::write(path, raw)?;
    Ok(())
}

/// Default report location: `pass_at_<k>_results.json` beside the input file.
pub fn default_pass_at_k_path(input: &Path, k: usize) -> PathBuf {
    let file_name = format!("pass_at_{k}_results.json");
    match input.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Persist a pass@K report.
pub fn write_pass_at_k_report(path: &Path, report: &PassAtKReport) -> Result<(), EvalError> {
    write_json(path, report)?;
    info!(path = %path.display(), pass_at_k = report.pass_at_k, "wrote pass@k report");
    Ok(())
}

/// Write one artifact per problem under its bucket directory plus the JSON
/// extraction summary. Returns the summary that was written.
///
/// Fails before touching the filesystem when two problem ids map to the same
/// artifact path.
pub fn write_outcome_artifacts(
    out_dir: &Path,
    report: &OutcomeReport,
    overrides: &HashMap<SampleId, CodeText>,
    extension: &str,
) -> Result<ExtractionSummary, EvalError> {
    let planned = plan_artifact_paths(out_dir, report, extension)?;
    for dir in [FULLY_PASSED_DIR, PARTIALLY_PASSED_DIR, FULLY_FAILED_DIR] {
        fs::create_dir_all(out_dir.join(dir))?;
    }
    for (problem, path) in report.problems.iter().zip(&planned) {
        fs::write(path, problem.artifact_code(overrides))?;
        debug!(
            problem_id = %problem.problem_id,
            sample_id = %problem.representative.sample_id,
            path = %path.display(),
            "wrote outcome artifact"
        );
    }
    let summary = report.summary();
    write_json(&out_dir.join(EXTRACTION_REPORT_FILENAME), &summary)?;
    info!(
        out_dir = %out_dir.display(),
        fully_passed = summary.summary.fully_passed,
        partially_passed = summary.summary.partially_passed,
        fully_failed = summary.summary.fully_failed,
        "wrote outcome artifacts"
    );
    Ok(summary)
}

fn plan_artifact_paths(
    out_dir: &Path,
    report: &OutcomeReport,
    extension: &str,
) -> Result<Vec<PathBuf>, EvalError> {
    let mut owners: HashMap<PathBuf, &str> = HashMap::with_capacity(report.problems.len());
    let mut planned = Vec::with_capacity(report.problems.len());
    for problem in &report.problems {
        let path = out_dir
            .join(problem.outcome.dir_name())
            .join(problem.artifact_name(extension));
        if let Some(first) = owners.insert(path.clone(), problem.problem_id.as_str()) {
            return Err(EvalError::Configuration(format!(
                "problems '{first}' and '{}' both map to artifact {}",
                problem.problem_id,
                path.display()
            )));
        }
        planned.push(path);
    }
    Ok(planned)
}

/// Render a level table as tab-separated text with every field quoted.
pub fn render_level_table(table: &LevelTable) -> String {
    let mut out = String::new();
    push_row(&mut out, TABLE_HEADER.iter().map(|field| field.to_string()));
    for row in &table.rows {
        push_row(
            &mut out,
            [
                row.label.clone(),
                row.solved_problems.to_string(),
                row.total_problems.to_string(),
                row.correct_samples.to_string(),
                row.total_samples.to_string(),
            ],
        );
    }
    out
}

fn push_row(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(TABLE_DELIMITER);
        }
        first = false;
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    }
    out.push('\n');
}

/// Path of the tabular file for `level` inside `out_dir`.
pub fn level_table_path(out_dir: &Path, level: &str) -> PathBuf {
    out_dir.join(format!("{}{LEVEL_TABLE_SUFFIX}", sanitize_file_stem(level)))
}

/// Write one table per level plus the JSON per-level summary.
pub fn write_level_tables(
    out_dir: &Path,
    tables: &[LevelTable],
) -> Result<Vec<LevelSummary>, EvalError> {
    fs::create_dir_all(out_dir)?;
    let mut summaries = Vec::with_capacity(tables.len());
    for table in tables {
        fs::write(level_table_path(out_dir, &table.level), render_level_table(table))?;
        summaries.push(table.summary());
    }
    write_json(&out_dir.join(META_SUMMARY_FILENAME), &summaries)?;
    info!(
        out_dir = %out_dir.display(),
        levels = summaries.len(),
        "wrote taxonomy summaries"
    );
    Ok(summaries)
}
