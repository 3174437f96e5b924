//! Result reporting

use crate::store::Target;
use std::fmt;

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub inserted: usize,
    pub target: Target,
}

impl fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "✅ Added {} items to '{}'.", self.inserted, self.target)
    }
}

/// Print the summary line to stdout.
pub fn report(summary: &IngestSummary) {
    println!("{}", summary);
}
