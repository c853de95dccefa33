use practice_core::model::{EditorBuffer, LearnerId, Question, QuestionId};
use practice_core::{PracticeState, ProgressView, QuestionFilter, Selection};

/// Derived view of the engine, published after every state change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PracticeSnapshot {
    pub learner: Option<LearnerId>,
    pub selection: Selection,
    pub current: Option<Question>,
    pub progress: ProgressView,
    pub filter: QuestionFilter,
    /// Ids matching `filter`, in catalog order.
    pub filtered: Vec<QuestionId>,
    pub editor: EditorBuffer,
}

impl PracticeSnapshot {
    #[must_use]
    pub fn from_state(state: &PracticeState) -> Self {
        Self {
            learner: state.learner(),
            selection: state.selection(),
            current: state.current_question().cloned(),
            progress: state.progress(),
            filter: state.filter().clone(),
            filtered: state.filtered().iter().map(|q| q.id()).collect(),
            editor: state.editor().clone(),
        }
    }
}

/// Outcome of a bootstrap or refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The response was applied; carries the resulting selection.
    Applied(Selection),
    /// A newer bootstrap or a local ledger write superseded this request.
    Stale,
}

/// Outcome of `PracticeEngine::record_solved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    /// Recorded; the cursor moved to the next question.
    Advanced(QuestionId),
    /// Recorded; nothing unsolved remains.
    AllSolved,
    AlreadySolved,
    /// An earlier write for the same question is still pending.
    InFlight,
    /// Anonymous context; nothing was written.
    Inert,
    /// Recorded and counted, but a re-bootstrap replaced the session during the
    /// write, so the cursor was not moved.
    Recorded,
    /// Another learner's session took over; local state was left alone.
    Stale,
    /// Recorded, but advancing failed and the cursor fell back to `Empty`.
    SelectionReset,
}
