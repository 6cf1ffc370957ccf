//! Per-sample correctness: a verdict flag plus placeholder-tactic rejection.

use crate::constants::correctness::PLACEHOLDER_TACTICS;
use crate::data::SampleRecord;

/// Verdict flag a sample must carry to count as correct.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerdictField {
    /// Compiled without error.
    Pass,
    /// Fully discharged the goal.
    #[default]
    Complete,
}

impl VerdictField {
    /// Stable lowercase name (`pass` / `complete`).
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictField::Pass => "pass",
            VerdictField::Complete => "complete",
        }
    }
}

/// Per-sample "solved" test: the selected verdict flag is set and the code
/// holds no placeholder tactic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorrectnessPredicate {
    field: VerdictField,
    placeholders: Vec<String>,
}

impl Default for CorrectnessPredicate {
    fn default() -> Self {
        Self::new(VerdictField::default())
    }
}

impl CorrectnessPredicate {
    /// Predicate over `field` rejecting the standard placeholder tactics.
    pub fn new(field: VerdictField) -> Self {
        Self {
            field,
            placeholders: PLACEHOLDER_TACTICS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Reject `placeholders` as well. The standard tactics always stay rejected.
    pub fn with_placeholders<I, S>(mut self, placeholders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for marker in placeholders.into_iter().map(Into::into) {
            if !self.placeholders.contains(&marker) {
                self.placeholders.push(marker);
            }
        }
        self
    }

    /// The verdict flag this predicate reads.
    pub fn field(&self) -> VerdictField {
        self.field
    }

    /// Whether `record` counts as solved.
    pub fn is_correct(&self, record: &SampleRecord) -> bool {
        let flag = match self.field {
            VerdictField::Pass => record.verdict.pass,
            VerdictField::Complete => record.verdict.complete,
        };
        flag && !self.has_placeholder(&record.code)
    }

    fn has_placeholder(&self, code: &str) -> bool {
        self.placeholders
            .iter()
            .any(|marker| code.contains(marker.as_str()))
    }
}
