use crate::model::{QuestionCatalog, SolvedSet};

/// Aggregated view of solved progress, useful for UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressView {
    pub solved_count: usize,
    pub total_count: usize,
    pub percent: u8,
}

/// Derives progress from the catalog and the learner's solved set.
///
/// Only solved ids that are still in the catalog are counted, so the percentage
/// stays within `0..=100` even when the ledger references removed questions.
#[must_use]
pub fn derive_progress(catalog: &QuestionCatalog, solved: &SolvedSet) -> ProgressView {
    let total_count = catalog.len();
    let solved_count = catalog.iter().filter(|q| solved.contains(q.id())).count();
    ProgressView {
        solved_count,
        total_count,
        percent: percent(solved_count, total_count),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn percent(solved: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = (solved.min(total) as f64) * 100.0 / (total as f64);
    ratio.round().clamp(0.0, 100.0) as u8
}
