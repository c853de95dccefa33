//! Question selection: the initial pick, filter-driven re-selection, manual
//! overrides, and difficulty-tiered advancement after a solve.

use thiserror::Error;

use crate::filter::QuestionFilter;
use crate::model::{Difficulty, Question, QuestionCatalog, QuestionId, SolvedSet};

/// Invariant violations inside the selection policy.
///
/// These indicate a defect in the caller; they are never shown to a learner.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionError {
    #[error("cannot advance with an empty catalog")]
    EmptyCatalog,

    #[error("solved question {0} is not in the catalog")]
    UnknownQuestion(QuestionId),
}

/// Where the cursor currently points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    /// The active filter matched nothing.
    #[default]
    Empty,
    Selected(QuestionId),
    /// Terminal after an advance: the catalog is non-empty and every question is solved.
    AllSolved,
}

impl Selection {
    #[must_use]
    pub fn question_id(self) -> Option<QuestionId> {
        match self {
            Selection::Selected(id) => Some(id),
            Selection::Empty | Selection::AllSolved => None,
        }
    }

    #[must_use]
    pub fn is_all_solved(self) -> bool {
        matches!(self, Selection::AllSolved)
    }
}

/// Initial pick over an already filtered list.
///
/// First unsolved `Easy` question in filter order; failing that, the first
/// question in filter order whatever its difficulty or solved state.
#[must_use]
pub fn bootstrap_selection(filtered: &[&Question], solved: &SolvedSet) -> Selection {
    filtered
        .iter()
        .find(|q| q.difficulty() == Difficulty::Easy && !solved.contains(q.id()))
        .or_else(|| filtered.first())
        .map_or(Selection::Empty, |q| Selection::Selected(q.id()))
}

/// Next question after `just_solved` was recorded.
///
/// Tiers are visited from the solved question's tier upward, then wrap to the
/// lower tiers; inside a tier the full catalog is scanned in catalog order.
///
/// # Errors
///
/// Returns `SelectionError::EmptyCatalog` for an empty catalog and
/// `SelectionError::UnknownQuestion` when `just_solved` is not in it.
pub fn next_question(
    catalog: &QuestionCatalog,
    solved: &SolvedSet,
    just_solved: QuestionId,
) -> Result<Selection, SelectionError> {
    if catalog.is_empty() {
        return Err(SelectionError::EmptyCatalog);
    }
    let start = catalog
        .get(just_solved)
        .ok_or(SelectionError::UnknownQuestion(just_solved))?
        .difficulty()
        .tier_index();

    let tiers = Difficulty::TIERS[start..]
        .iter()
        .chain(Difficulty::TIERS[..start].iter());

    for tier in tiers {
        let hit = catalog.iter().find(|q| {
            q.difficulty() == *tier && q.id() != just_solved && !solved.contains(q.id())
        });
        if let Some(question) = hit {
            return Ok(Selection::Selected(question.id()));
        }
    }
    Ok(Selection::AllSolved)
}

/// Cursor over the catalog holding the current question and the active filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionCursor {
    selection: Selection,
    filter: QuestionFilter,
}

impl SelectionCursor {
    #[must_use]
    pub fn new(filter: QuestionFilter) -> Self {
        Self {
            selection: Selection::Empty,
            filter,
        }
    }

    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    #[must_use]
    pub fn current(&self) -> Option<QuestionId> {
        self.selection.question_id()
    }

    #[must_use]
    pub fn filter(&self) -> &QuestionFilter {
        &self.filter
    }

    /// Session-start pick against the active filter.
    pub fn bootstrap(&mut self, catalog: &QuestionCatalog, solved: &SolvedSet) -> Selection {
        let filtered = self.filter.apply(catalog);
        self.selection = bootstrap_selection(&filtered, solved);
        self.selection
    }

    /// Replace the filter; re-selects only when the current question falls out of view.
    ///
    /// Returns `true` when the selection changed.
    pub fn set_filter(
        &mut self,
        filter: QuestionFilter,
        catalog: &QuestionCatalog,
        solved: &SolvedSet,
    ) -> bool {
        self.filter = filter;
        match self.selection {
            Selection::AllSolved => false,
            Selection::Selected(id) if self.in_view(id, catalog) => false,
            Selection::Selected(_) | Selection::Empty => self.reselect(catalog, solved),
        }
    }

    /// Re-check the selection after the catalog or solved set was replaced.
    ///
    /// Returns `true` when the selection changed.
    pub fn revalidate(&mut self, catalog: &QuestionCatalog, solved: &SolvedSet) -> bool {
        match self.selection {
            Selection::Selected(id) if self.in_view(id, catalog) => false,
            Selection::AllSolved if !catalog.is_empty() && catalog.iter().all(|q| solved.contains(q.id())) => {
                false
            }
            _ => self.reselect(catalog, solved),
        }
    }

    /// Learner-driven override; ignored unless `id` is in the filtered view.
    pub fn manual_select(&mut self, id: QuestionId, catalog: &QuestionCatalog) -> bool {
        if !self.in_view(id, catalog) {
            return false;
        }
        self.selection = Selection::Selected(id);
        true
    }

    /// Move past a freshly solved question.
    ///
    /// # Errors
    ///
    /// Propagates `SelectionError` from [`next_question`]; the cursor is left untouched.
    pub fn advance(
        &mut self,
        catalog: &QuestionCatalog,
        solved: &SolvedSet,
        just_solved: QuestionId,
    ) -> Result<Selection, SelectionError> {
        let next = next_question(catalog, solved, just_solved)?;
        self.selection = next;
        Ok(next)
    }

    /// Fallback after an invariant violation.
    pub fn reset(&mut self) {
        self.selection = Selection::Empty;
    }

    fn in_view(&self, id: QuestionId, catalog: &QuestionCatalog) -> bool {
        catalog.get(id).is_some_and(|q| self.filter.matches(q))
    }

    fn reselect(&mut self, catalog: &QuestionCatalog, solved: &SolvedSet) -> bool {
        let before = self.selection;
        self.bootstrap(catalog, solved) != before
    }
}
