/// Per-generation sample identifier (unique across a run).
/// Example: `mathd_algebra_10_g3`
pub type SampleId = String;
/// Canonical problem identifier shared by every generation of a problem.
/// Example: `mathd_algebra_10`
pub type ProblemId = String;
/// Name of one taxonomy axis.
/// Examples: `source`, `topic`, `difficulty`
pub type LevelName = String;
/// Label assigned to a sample on one taxonomy axis.
/// Examples: `minif2f`, `algebra`, `hard`
pub type LevelLabel = String;
/// Candidate proof text submitted to the compiler.
/// Example: `theorem foo : 1 + 1 = 2 := by norm_num`
pub type CodeText = String;
/// Marker text separating a base id from its generation index.
/// Example: `_g`
pub type GenerationMarker = String;
