use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum, error::ErrorKind};

use crate::config::EvalConfig;
use crate::constants::key::DEFAULT_GENERATION_MARKER;
use crate::constants::outcome::{
    DEFAULT_ARTIFACT_EXTENSION, FULLY_FAILED_DIR, FULLY_PASSED_DIR, PARTIALLY_PASSED_DIR,
};
use crate::correctness::VerdictField;
use crate::grouping::group_records;
use crate::ingestion::{TaxonomyTable, load_records};
use crate::key::KeySource;
use crate::metrics::{PassAtKReport, compute_pass_at_k};
use crate::outcome::classify_outcomes;
use crate::taxonomy::{TaxonomySchema, aggregate_levels};
use crate::transport::fs::{
    default_pass_at_k_path, write_level_tables, write_outcome_artifacts, write_pass_at_k_report,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KeySourceArg {
    SampleId,
    ProblemId,
}

impl From<KeySourceArg> for KeySource {
    fn from(value: KeySourceArg) -> Self {
        match value {
            KeySourceArg::SampleId => KeySource::SampleId,
            KeySourceArg::ProblemId => KeySource::ProblemId,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FieldArg {
    Complete,
    Pass,
}

impl From<FieldArg> for VerdictField {
    fn from(value: FieldArg) -> Self {
        match value {
            FieldArg::Complete => VerdictField::Complete,
            FieldArg::Pass => VerdictField::Pass,
        }
    }
}

#[derive(Debug, Args)]
struct KeyArgs {
    #[arg(
        long = "marker",
        value_name = "TEXT",
        default_value = DEFAULT_GENERATION_MARKER,
        help = "Separator between a problem id and its generation index"
    )]
    marker: String,
    #[arg(
        long = "key-source",
        value_enum,
        default_value = "sample-id",
        help = "Record field the problem identity is derived from"
    )]
    key_source: KeySourceArg,
}

impl KeyArgs {
    fn apply(&self, config: &mut EvalConfig) {
        config.generation_marker = self.marker.clone();
        config.key_source = self.key_source.into();
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "pass_at_k",
    disable_help_subcommand = true,
    about = "Compute pass@K over compiled proof candidates",
    long_about = "Group per-sample compilation results by problem and report the share of problems with at least one passing generation, alongside sample-level pass rates.",
    after_help = "The report is written to pass_at_<K>_results.json next to the input unless --output is given."
)]
struct PassAtKCli {
    #[arg(value_name = "COMPILATION_FILE", help = "Compilation results (JSON array or JSON lines)")]
    input: PathBuf,
    #[arg(
        value_name = "K",
        default_value_t = 32,
        value_parser = parse_positive_usize,
        help = "Nominal generations per problem"
    )]
    k: usize,
    #[arg(long, value_name = "PATH", help = "Optional report path override")]
    output: Option<PathBuf>,
    #[arg(
        long = "estimate",
        value_name = "K",
        value_delimiter = ',',
        value_parser = parse_positive_usize,
        help = "Also report the unbiased pass@k estimate for these k values"
    )]
    estimate: Vec<usize>,
    #[command(flatten)]
    keys: KeyArgs,
}

#[derive(Debug, Parser)]
#[command(
    name = "extract_outcomes",
    disable_help_subcommand = true,
    about = "Extract one representative proof per problem, bucketed by outcome",
    long_about = "Classify each problem as fully passed, partially passed, or fully failed against the expected number of generations and write its representative proof under the bucket directory."
)]
struct ExtractOutcomesCli {
    #[arg(long = "input", value_name = "PATH", help = "Compilation results (JSON array or JSON lines)")]
    input: PathBuf,
    #[arg(
        long = "full-records",
        value_name = "PATH",
        help = "Optional full records whose full_code replaces the compiled snippet"
    )]
    full_records: Option<PathBuf>,
    #[arg(long = "output-dir", value_name = "DIR", help = "Directory for artifacts and the report")]
    output_dir: PathBuf,
    #[arg(
        long = "expected-k",
        value_name = "K",
        value_parser = parse_positive_usize,
        help = "Generations every problem should have; full passes of smaller batches count as partial"
    )]
    expected_k: usize,
    #[arg(
        long = "extension",
        default_value = DEFAULT_ARTIFACT_EXTENSION,
        help = "File extension for extracted artifacts"
    )]
    extension: String,
    #[command(flatten)]
    keys: KeyArgs,
}

#[derive(Debug, Parser)]
#[command(
    name = "summarize_levels",
    disable_help_subcommand = true,
    about = "Roll up solved problems per taxonomy level",
    long_about = "Join compilation results with a per-sample taxonomy and write one solved/total table per level plus a JSON summary."
)]
struct SummarizeLevelsCli {
    #[arg(long = "input-path", value_name = "PATH", help = "Compilation results (JSON array or JSON lines)")]
    input: PathBuf,
    #[arg(
        long = "full-record-path",
        value_name = "PATH",
        help = "Full records carrying id_maps; optional when records embed their own taxonomy"
    )]
    full_records: Option<PathBuf>,
    #[arg(long = "output-dir", value_name = "DIR", help = "Directory for level tables")]
    output_dir: PathBuf,
    #[arg(
        long = "field",
        value_enum,
        default_value = "complete",
        help = "Verdict flag that counts as solved"
    )]
    field: FieldArg,
    #[command(flatten)]
    keys: KeyArgs,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the pass@K report over `args_iter` (program name excluded).
pub fn run_pass_at_k<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    init_tracing();

    let Some(cli) =
        parse_cli::<PassAtKCli, _>(std::iter::once("pass_at_k".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let mut config = EvalConfig {
        k: cli.k,
        estimator_ks: cli.estimate,
        ..EvalConfig::default()
    };
    cli.keys.apply(&mut config);

    if !cli.input.exists() {
        return Err(format!("compilation file not found: {}", cli.input.display()).into());
    }

    let records = load_records(&cli.input)?;
    let groups = group_records(records, &config.key_deriver());
    let report = compute_pass_at_k(&groups, &config.pass_at_k_options());
    print_pass_at_k(&report);

    let output = cli
        .output
        .unwrap_or_else(|| default_pass_at_k_path(&cli.input, config.k));
    write_pass_at_k_report(&output, &report)?;
    println!("Detailed results saved to {}", output.display());
    Ok(())
}

/// Run outcome extraction over `args_iter` (program name excluded).
pub fn run_extract_outcomes<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    init_tracing();

    let Some(cli) = parse_cli::<ExtractOutcomesCli, _>(
        std::iter::once("extract_outcomes".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let mut config = EvalConfig {
        expected_k: Some(cli.expected_k),
        artifact_extension: cli.extension,
        ..EvalConfig::default()
    };
    cli.keys.apply(&mut config);

    let records = load_records(&cli.input)?;
    let full_records = match &cli.full_records {
        Some(path) => TaxonomyTable::load(path)?,
        None => TaxonomyTable::default(),
    };
    let groups = group_records(records, &config.key_deriver());
    let report = classify_outcomes(&groups, config.expected_k)?;
    let summary = write_outcome_artifacts(
        &cli.output_dir,
        &report,
        full_records.code_overrides(),
        &config.artifact_extension,
    )?;

    println!("Extraction complete:");
    println!(
        "  fully passed:     {} -> {}",
        summary.summary.fully_passed,
        cli.output_dir.join(FULLY_PASSED_DIR).display()
    );
    println!(
        "  partially passed: {} -> {}",
        summary.summary.partially_passed,
        cli.output_dir.join(PARTIALLY_PASSED_DIR).display()
    );
    println!(
        "  fully failed:     {} -> {}",
        summary.summary.fully_failed,
        cli.output_dir.join(FULLY_FAILED_DIR).display()
    );
    Ok(())
}

/// Run the taxonomy rollup over `args_iter` (program name excluded).
pub fn run_summarize_levels<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    init_tracing();

    let Some(cli) = parse_cli::<SummarizeLevelsCli, _>(
        std::iter::once("summarize_levels".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let mut config = EvalConfig {
        correctness_field: cli.field.into(),
        ..EvalConfig::default()
    };
    cli.keys.apply(&mut config);
    let keys = config.key_deriver();

    let mut records = load_records(&cli.input)?;
    if let Some(path) = &cli.full_records {
        records = TaxonomyTable::load(path)?.attach(records, &keys)?;
    }
    let schema = TaxonomySchema::from_records(&records)?;
    let tables = aggregate_levels(&records, &schema, &config.correctness(), &keys)?;
    let summaries = write_level_tables(&cli.output_dir, &tables)?;

    for summary in &summaries {
        println!(
            "  {:<24} solved {:>6} / {:<6} ({}%)",
            summary.level, summary.solved_num, summary.problem_num, summary.solved_ratio
        );
    }
    println!("Summary saved to {}", cli.output_dir.display());
    Ok(())
}

fn print_pass_at_k(report: &PassAtKReport) {
    println!("Sample count distribution:");
    for (size, problems) in &report.sample_count_distribution {
        println!("  {size} samples: {problems} problems");
    }
    println!();
    println!("Pass@{} results:", report.k);
    println!("  total problems:   {}", report.total_problems);
    println!("  passed problems:  {}", report.passed_problems);
    println!("  pass@{}:          {:.2}%", report.k, report.pass_at_k);
    println!("  total samples:    {}", report.total_samples);
    println!("  passed samples:   {}", report.passed_samples);
    println!("  sample pass rate: {:.2}%", report.sample_pass_rate);
    for (name, value) in &report.estimated_pass_at {
        println!("  {name} (estimated): {value:.2}%");
    }
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("Could not parse '{}' as a positive integer", raw))?;
    if parsed == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
