//! Result aggregation
//!
//! Flattens engine output into an ordered list of lines and applies the MRZ
//! acceptance rule.

use tracing::debug;

use crate::vision::{LineResult, RawEngineResult};

/// Number of lines in the MRZ formats this scanner accepts
pub const MRZ_LINE_COUNT: usize = 2;

/// Outcome of aggregating one engine result
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    /// Exactly the expected number of lines, in engine order
    Accepted(Vec<LineResult>),
    /// Anything else; not a capture this cycle
    Rejected { line_count: usize },
}

impl Aggregation {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Aggregation::Accepted(_))
    }

    pub fn into_lines(self) -> Option<Vec<LineResult>> {
        match self {
            Aggregation::Accepted(lines) => Some(lines),
            Aggregation::Rejected { .. } => None,
        }
    }
}

/// All lines across all groups, group order first, then line order
pub fn flatten(raw: RawEngineResult) -> Vec<LineResult> {
    raw.groups
        .into_iter()
        .flat_map(|group| group.lines.into_iter())
        .collect()
}

/// The structural MRZ check: exactly two lines
pub fn is_acceptable(lines: &[LineResult]) -> bool {
    lines.len() == MRZ_LINE_COUNT
}

/// Flatten and apply the acceptance rule
pub fn aggregate(raw: RawEngineResult) -> Aggregation {
    let lines = flatten(raw);
    if is_acceptable(&lines) {
        Aggregation::Accepted(lines)
    } else {
        debug!("Discarding cycle with {} line(s)", lines.len());
        Aggregation::Rejected {
            line_count: lines.len(),
        }
    }
}
