/// Constants used by problem key derivation.
pub mod key {
    /// Default separator between a problem base id and its generation index.
    pub const DEFAULT_GENERATION_MARKER: &str = "_g";
}

/// Constants used by the correctness predicate.
pub mod correctness {
    /// Placeholder tactics that a compiler may accept but that never close a goal honestly.
    pub const PLACEHOLDER_TACTICS: [&str; 2] = ["apply?", "exact?"];
}

/// Constants used by pass@K reporting.
pub mod metrics {
    /// Nominal number of generations per problem when none is configured.
    pub const DEFAULT_K: usize = 32;
    /// Prefix for keys in the estimated pass@k table (for example `pass@8`).
    pub const ESTIMATE_KEY_PREFIX: &str = "pass@";
}

/// Constants used by outcome extraction.
pub mod outcome {
    /// Directory name for problems where every expected generation passed.
    pub const FULLY_PASSED_DIR: &str = "fully_passed";
    /// Directory name for problems with some, but not all, expected generations passing.
    pub const PARTIALLY_PASSED_DIR: &str = "partially_passed";
    /// Directory name for problems where no generation passed.
    pub const FULLY_FAILED_DIR: &str = "fully_failed";
    /// Default file extension for extracted artifacts.
    pub const DEFAULT_ARTIFACT_EXTENSION: &str = "lean";
    /// Filename of the JSON extraction summary.
    pub const EXTRACTION_REPORT_FILENAME: &str = "extraction_report.json";
}

/// Constants used by taxonomy summaries.
pub mod taxonomy {
    /// Suffix appended to the level name for per-level tabular output.
    pub const LEVEL_TABLE_SUFFIX: &str = "_summarize.csv";
    /// Filename of the JSON per-level summary.
    pub const META_SUMMARY_FILENAME: &str = "meta_summarize.json";
    /// Field separator used by per-level tables.
    pub const TABLE_DELIMITER: char = '\t';
    /// Header row used by per-level tables.
    pub const TABLE_HEADER: [&str; 5] = [
        "label",
        "solved_problems",
        "total_problems",
        "correct_samples",
        "total_samples",
    ];
}

/// Constants used by code normalization.
pub mod utils {
    /// Line prefixes removed from full proof files before extraction.
    pub const PREAMBLE_PREFIXES: [&str; 3] = ["import", "set_option", "open"];
    /// Option name whose zero setting is stripped with the preamble.
    pub const HEARTBEATS_OPTION: &str = "maxHeartbeats";
}
