//! Client-side practice state: catalog, solved set, cursor and editor buffer.
//!
//! Every operation here is synchronous and side-effect free apart from the
//! state itself; remote I/O and request tagging live in the services layer.

use std::collections::BTreeSet;

use crate::filter::{QuestionFilter, derive_filtered};
use crate::model::{
    EditorBuffer, LearnerId, Question, QuestionCatalog, QuestionId, SolvedSet, Submission,
    SubmissionId,
};
use crate::progress::{ProgressView, derive_progress};
use crate::selection::{Selection, SelectionCursor, SelectionError};

/// Whether a solve may be written to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveAdmission {
    /// Reserved; the caller must follow up with `confirm_solve` or `abort_solve`.
    Proceed,
    AlreadySolved,
    /// Another write for the same question has not been acknowledged yet.
    InFlight,
    NotInCatalog,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PracticeState {
    learner: Option<LearnerId>,
    catalog: QuestionCatalog,
    solved: SolvedSet,
    cursor: SelectionCursor,
    editor: EditorBuffer,
    in_flight: BTreeSet<QuestionId>,
}

impl PracticeState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Accessors
    #[must_use]
    pub fn learner(&self) -> Option<LearnerId> {
        self.learner
    }

    #[must_use]
    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn solved(&self) -> &SolvedSet {
        &self.solved
    }

    #[must_use]
    pub fn selection(&self) -> Selection {
        self.cursor.selection()
    }

    #[must_use]
    pub fn filter(&self) -> &QuestionFilter {
        self.cursor.filter()
    }

    #[must_use]
    pub fn editor(&self) -> &EditorBuffer {
        &self.editor
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.cursor.current().and_then(|id| self.catalog.get(id))
    }

    #[must_use]
    pub fn progress(&self) -> ProgressView {
        derive_progress(&self.catalog, &self.solved)
    }

    #[must_use]
    pub fn filtered(&self) -> Vec<&Question> {
        derive_filtered(&self.catalog, self.cursor.filter())
    }

    #[must_use]
    pub fn is_in_flight(&self, id: QuestionId) -> bool {
        self.in_flight.contains(&id)
    }

    /// Start of a session (or a learner switch): replace everything and pick
    /// the initial question. The active filter is kept.
    ///
    /// Reservations survive a re-bootstrap for the same learner, since their
    /// writes are still on the way to that learner's ledger.
    pub fn bootstrap(
        &mut self,
        learner: Option<LearnerId>,
        catalog: QuestionCatalog,
        solved: SolvedSet,
    ) -> Selection {
        if self.learner != learner {
            self.in_flight.clear();
        }
        self.learner = learner;
        self.catalog = catalog;
        self.solved = solved;
        let selection = self.cursor.bootstrap(&self.catalog, &self.solved);
        self.reset_editor();
        selection
    }

    /// Fold a fresh catalog and ledger snapshot into the current session.
    ///
    /// The selection survives when it is still in view, so in-progress editor
    /// content is kept. Returns `true` when the selection changed.
    pub fn reconcile(&mut self, catalog: QuestionCatalog, solved: SolvedSet) -> bool {
        self.catalog = catalog;
        self.solved = solved;
        let changed = self.cursor.revalidate(&self.catalog, &self.solved);
        if changed {
            self.reset_editor();
        }
        changed
    }

    /// Returns `true` when the selection changed.
    pub fn set_filter(&mut self, filter: QuestionFilter) -> bool {
        let changed = self.cursor.set_filter(filter, &self.catalog, &self.solved);
        if changed {
            self.reset_editor();
        }
        changed
    }

    /// Manual pick from the filtered view. Selecting always reloads starter code.
    pub fn select(&mut self, id: QuestionId) -> bool {
        let accepted = self.cursor.manual_select(id, &self.catalog);
        if accepted {
            self.reset_editor();
        }
        accepted
    }

    pub fn edit_code(&mut self, code: impl Into<String>) -> bool {
        self.editor.edit(code)
    }

    /// First phase of a solve: reserve the question so overlapping requests
    /// for it become no-ops.
    pub fn begin_solve(&mut self, id: QuestionId) -> SolveAdmission {
        if self.solved.contains(id) {
            return SolveAdmission::AlreadySolved;
        }
        if !self.catalog.contains(id) {
            return SolveAdmission::NotInCatalog;
        }
        if !self.in_flight.insert(id) {
            return SolveAdmission::InFlight;
        }
        SolveAdmission::Proceed
    }

    /// Roll back a reservation after the ledger rejected the write.
    pub fn abort_solve(&mut self, id: QuestionId) {
        self.in_flight.remove(&id);
    }

    /// Second phase of a solve: the ledger acknowledged `submission`.
    ///
    /// The solved set is updated first, then the cursor advances.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError` if advancing is impossible; the solved set keeps
    /// the new entry and the cursor is left where it was.
    pub fn confirm_solve(&mut self, submission: Submission) -> Result<Selection, SelectionError> {
        let question_id = submission.question_id();
        self.in_flight.remove(&question_id);
        self.solved.record(submission);
        let next = self
            .cursor
            .advance(&self.catalog, &self.solved, question_id)?;
        self.reset_editor();
        Ok(next)
    }

    /// Settle a solve whose session was rebuilt while the write was pending.
    ///
    /// The acknowledged entry joins the solved set and the reservation is
    /// released, but the cursor belongs to the new session and stays put.
    /// Returns `true` when the question was not solved before.
    pub fn absorb_solve(&mut self, submission: Submission) -> bool {
        self.in_flight.remove(&submission.question_id());
        self.solved.record(submission)
    }

    /// Fallback after an invariant violation.
    pub fn reset_selection(&mut self) {
        self.cursor.reset();
        self.reset_editor();
    }

    /// Mirror a single ledger deletion. The cursor does not move.
    pub fn remove_submission(&mut self, id: SubmissionId) -> Option<Submission> {
        self.solved.remove_submission(id)
    }

    /// Adopt a freshly fetched ledger without touching the cursor or editor.
    pub fn replace_solved(&mut self, solved: SolvedSet) {
        self.solved = solved;
    }

    /// Mirror a full ledger wipe. The cursor does not move.
    pub fn clear_submissions(&mut self) {
        self.solved.clear();
    }

    fn reset_editor(&mut self) {
        self.editor = self
            .current_question()
            .map_or_else(EditorBuffer::blank, EditorBuffer::starter_for);
    }
}
