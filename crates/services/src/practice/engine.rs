use std::sync::{Mutex, MutexGuard, PoisonError};

use practice_core::model::{
    CodeRun, LearnerContext, LearnerId, Question, QuestionDraft, QuestionId, SubmissionId,
};
use practice_core::{PracticeState, QuestionFilter, Selection, SolveAdmission};
use tokio::sync::watch;

use crate::catalog_service::CatalogService;
use crate::error::{CatalogServiceError, FetchError, RecordError};
use crate::submission_recorder::SubmissionRecorder;

use super::snapshot::{PracticeSnapshot, SolveOutcome, SyncOutcome};

/// Identifies the session a remote response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket {
    generation: u64,
    learner: Option<LearnerId>,
    ledger_epoch: u64,
}

#[derive(Default)]
struct Inner {
    state: PracticeState,
    /// Bumped when a bootstrap starts.
    generation: u64,
    /// Bumped when a bootstrap is applied.
    session: u64,
    /// Bumped by every local ledger write, so older refreshes cannot undo it.
    ledger_epoch: u64,
}

impl Inner {
    fn ticket(&self) -> Ticket {
        Ticket {
            generation: self.generation,
            learner: self.state.learner(),
            ledger_epoch: self.ledger_epoch,
        }
    }
}

/// Drives one practice session against the remote directory and ledger.
///
/// State sits behind a mutex that is never held across an `.await`. Remote
/// responses are tagged with a [`Ticket`] and dropped when the session moved on
/// while they were in flight.
pub struct PracticeEngine {
    catalog: CatalogService,
    recorder: SubmissionRecorder,
    inner: Mutex<Inner>,
    snapshots: watch::Sender<PracticeSnapshot>,
}

impl PracticeEngine {
    #[must_use]
    pub fn new(catalog: CatalogService, recorder: SubmissionRecorder) -> Self {
        let (snapshots, _) = watch::channel(PracticeSnapshot::default());
        Self {
            catalog,
            recorder,
            inner: Mutex::new(Inner::default()),
            snapshots,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) {
        self.snapshots
            .send_replace(PracticeSnapshot::from_state(&inner.state));
    }

    /// Receiver that sees a fresh snapshot after every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PracticeSnapshot> {
        self.snapshots.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> PracticeSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Read-only access to the full state.
    pub fn with_state<R>(&self, f: impl FnOnce(&PracticeState) -> R) -> R {
        f(&self.lock().state)
    }

    /// Start a session for `ctx`, superseding any bootstrap still in flight.
    ///
    /// The catalog and the learner's submissions are fetched concurrently.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if either fetch fails; the previous state is kept.
    pub async fn bootstrap(&self, ctx: &LearnerContext) -> Result<SyncOutcome, FetchError> {
        let (generation, mut epoch) = {
            let mut inner = self.lock();
            inner.generation += 1;
            (inner.generation, inner.ledger_epoch)
        };
        tracing::debug!(generation, learner = ?ctx.learner(), "bootstrap started");

        let (catalog, mut solved) = tokio::join!(self.catalog.load(), self.recorder.fetch(ctx));

        loop {
            {
                let mut inner = self.lock();
                if inner.generation != generation {
                    tracing::debug!(
                        generation,
                        current = inner.generation,
                        "dropping superseded bootstrap"
                    );
                    return Ok(SyncOutcome::Stale);
                }
                if inner.ledger_epoch == epoch {
                    let catalog = catalog?;
                    let solved = solved?;
                    inner.session += 1;
                    let selection = inner.state.bootstrap(ctx.learner(), catalog, solved);
                    self.publish(&inner);
                    tracing::info!(
                        learner = ?ctx.learner(),
                        selection = ?selection,
                        total = inner.state.catalog().len(),
                        "session bootstrapped"
                    );
                    return Ok(SyncOutcome::Applied(selection));
                }
                epoch = inner.ledger_epoch;
            }
            // A local write landed while the ledger was being read.
            tracing::debug!(generation, "re-reading submissions for bootstrap");
            solved = self.recorder.fetch(ctx).await;
        }
    }

    /// Re-read the catalog and ledger without restarting the session.
    ///
    /// The selection and editor survive when the current question is still in
    /// view.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if either fetch fails; the previous state is kept.
    pub async fn refresh(&self, ctx: &LearnerContext) -> Result<SyncOutcome, FetchError> {
        let ticket = {
            let inner = self.lock();
            if inner.state.learner() != ctx.learner() {
                return Ok(SyncOutcome::Stale);
            }
            inner.ticket()
        };

        let (catalog, solved) = tokio::join!(self.catalog.load(), self.recorder.fetch(ctx));

        let mut inner = self.lock();
        if inner.ticket() != ticket {
            tracing::debug!("dropping superseded refresh");
            return Ok(SyncOutcome::Stale);
        }
        let catalog = catalog?;
        let solved = solved?;
        let changed = inner.state.reconcile(catalog, solved);
        self.publish(&inner);
        tracing::debug!(selection_changed = changed, "session refreshed");
        Ok(SyncOutcome::Applied(inner.state.selection()))
    }

    /// Replace the text and difficulty filter.
    pub fn set_filter(&self, filter: QuestionFilter) -> Selection {
        let mut inner = self.lock();
        inner.state.set_filter(filter);
        self.publish(&inner);
        inner.state.selection()
    }

    /// Pick a question from the filtered view. Returns `false` for ids outside it.
    pub fn select(&self, id: QuestionId) -> bool {
        let mut inner = self.lock();
        let accepted = inner.state.select(id);
        if accepted {
            self.publish(&inner);
        }
        accepted
    }

    pub fn edit_code(&self, code: impl Into<String>) -> bool {
        let mut inner = self.lock();
        let accepted = inner.state.edit_code(code);
        if accepted {
            self.publish(&inner);
        }
        accepted
    }

    /// Record `question_id` as solved, then advance.
    ///
    /// The question is reserved before the remote write, so a second call for
    /// the same id is a no-op until the first one settles. If the same learner
    /// re-bootstraps meanwhile, the acknowledged entry is still folded into the
    /// solved set but the new session's cursor is left alone.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::UnknownQuestion` for ids outside the catalog and
    /// `RecordError::Remote` if the ledger rejects the write. Either way the
    /// solved set and cursor are unchanged.
    pub async fn record_solved(
        &self,
        ctx: &LearnerContext,
        question_id: QuestionId,
    ) -> Result<SolveOutcome, RecordError> {
        if ctx.is_anonymous() {
            return Ok(SolveOutcome::Inert);
        }

        let session = {
            let mut inner = self.lock();
            if inner.state.learner() != ctx.learner() {
                tracing::debug!(question_id = question_id.value(), "solve for another session ignored");
                return Ok(SolveOutcome::Stale);
            }
            match inner.state.begin_solve(question_id) {
                SolveAdmission::Proceed => {}
                SolveAdmission::AlreadySolved => return Ok(SolveOutcome::AlreadySolved),
                SolveAdmission::InFlight => return Ok(SolveOutcome::InFlight),
                SolveAdmission::NotInCatalog => {
                    return Err(RecordError::UnknownQuestion(question_id));
                }
            }
            inner.session
        };

        let result = self.recorder.record_solved(ctx, question_id).await;

        let mut inner = self.lock();
        if inner.state.learner() != ctx.learner() {
            // The switch dropped the reservation; the ledger keeps the write.
            tracing::debug!(
                question_id = question_id.value(),
                "solve acknowledged after a learner switch"
            );
            return result.map(|_| SolveOutcome::Stale);
        }
        let submission = match result {
            Ok(Some(submission)) => submission,
            Ok(None) => {
                inner.state.abort_solve(question_id);
                return Ok(SolveOutcome::Inert);
            }
            Err(err) => {
                inner.state.abort_solve(question_id);
                tracing::warn!(question_id = question_id.value(), error = %err, "solve not recorded");
                return Err(err);
            }
        };

        inner.ledger_epoch += 1;
        if inner.session != session {
            let newly_solved = inner.state.absorb_solve(submission);
            self.publish(&inner);
            tracing::debug!(
                question_id = question_id.value(),
                newly_solved,
                "solve acknowledged after a re-bootstrap; cursor kept"
            );
            return Ok(SolveOutcome::Recorded);
        }
        let outcome = match inner.state.confirm_solve(submission) {
            Ok(Selection::Selected(next)) => SolveOutcome::Advanced(next),
            Ok(Selection::AllSolved) => SolveOutcome::AllSolved,
            Ok(Selection::Empty) => SolveOutcome::SelectionReset,
            Err(err) => {
                tracing::error!(question_id = question_id.value(), error = %err, "advance failed");
                inner.state.reset_selection();
                SolveOutcome::SelectionReset
            }
        };
        self.publish(&inner);
        Ok(outcome)
    }

    /// Delete one ledger entry and recompute progress. The cursor does not move.
    ///
    /// An entry recorded elsewhere after bootstrap is not known locally, so the
    /// learner's submissions are re-read instead. A failed re-read is logged
    /// and leaves the solved set as it was.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Remote` if the ledger rejects the delete.
    pub async fn delete_one(
        &self,
        ctx: &LearnerContext,
        id: SubmissionId,
    ) -> Result<(), RecordError> {
        if ctx.is_anonymous() {
            return Ok(());
        }
        self.recorder.delete_one(ctx, id).await?;

        let mut ticket = {
            let mut inner = self.lock();
            if inner.state.learner() != ctx.learner() {
                return Ok(());
            }
            inner.ledger_epoch += 1;
            if inner.state.remove_submission(id).is_some() {
                self.publish(&inner);
                return Ok(());
            }
            inner.ticket()
        };

        tracing::debug!(submission_id = id.value(), "deleted entry unknown locally; re-reading ledger");
        loop {
            let solved = match self.recorder.fetch(ctx).await {
                Ok(solved) => solved,
                Err(err) => {
                    tracing::warn!(error = %err, "ledger re-read after delete failed");
                    return Ok(());
                }
            };
            {
                let mut inner = self.lock();
                let current = inner.ticket();
                // A newer bootstrap read the ledger after the delete.
                if current.generation != ticket.generation || current.learner != ticket.learner {
                    return Ok(());
                }
                if current.ledger_epoch == ticket.ledger_epoch {
                    inner.ledger_epoch += 1;
                    inner.state.replace_solved(solved);
                    self.publish(&inner);
                    return Ok(());
                }
                ticket = current;
            }
        }
    }

    /// Delete every ledger entry of the learner. The cursor does not move.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Remote` if the ledger rejects the delete.
    pub async fn delete_all(&self, ctx: &LearnerContext) -> Result<(), RecordError> {
        if ctx.is_anonymous() {
            return Ok(());
        }
        self.recorder.delete_all(ctx).await?;

        let mut inner = self.lock();
        if inner.state.learner() == ctx.learner() {
            inner.ledger_epoch += 1;
            inner.state.clear_submissions();
            self.publish(&inner);
        }
        Ok(())
    }

    /// Current editor content as a sandbox run, or `None` while no question is loaded.
    pub fn editor_run(&self, stdin: impl Into<String>) -> Option<CodeRun> {
        let inner = self.lock();
        let editor = inner.state.editor();
        editor
            .question_id()
            .map(|_| CodeRun::python(editor.code(), stdin))
    }

    /// Publish a question, then refresh so it shows up in catalog order.
    ///
    /// A failed refresh is logged; the question was still created.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError` if the directory rejects the draft.
    pub async fn create_question(
        &self,
        ctx: &LearnerContext,
        draft: &QuestionDraft,
    ) -> Result<Question, CatalogServiceError> {
        let question = self.catalog.create(ctx, draft).await?;
        if let Err(err) = self.refresh(ctx).await {
            tracing::warn!(error = %err, "catalog refresh after create failed");
        }
        Ok(question)
    }
}
