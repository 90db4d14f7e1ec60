//! Completeness reporting over one scrape batch.

use serde::Serialize;

use prodsift_scrape::ProductRecord;

/// Total/complete/incomplete counts for one batch.  Derived, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub total: usize,
    pub complete: usize,
    pub incomplete: usize,
}

/// Percentage split of the report, for the presentation layer's pie/bar
/// rendering.  Both values are `0.0` for an empty report and sum to 100
/// otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CompletionSplit {
    pub complete_pct: f64,
    pub incomplete_pct: f64,
}

impl Report {
    /// Count completeness over the batch.  The empty batch degrades to the
    /// zero report; `complete + incomplete == total` holds in every case.
    pub fn from_records(records: &[ProductRecord]) -> Self {
        let total = records.len();
        let complete = records.iter().filter(|r| r.is_complete()).count();
        Self {
            total,
            complete,
            incomplete: total - complete,
        }
    }

    pub fn completion_split(&self) -> CompletionSplit {
        if self.total == 0 {
            return CompletionSplit::default();
        }
        let complete_pct = self.complete as f64 * 100.0 / self.total as f64;
        CompletionSplit {
            complete_pct,
            incomplete_pct: 100.0 - complete_pct,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
