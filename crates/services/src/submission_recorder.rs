use std::sync::Arc;

use practice_core::model::{
    LearnerContext, QuestionId, SolvedSet, Submission, SubmissionId,
};
use storage::repository::{NewSubmission, SubmissionLedger};

use crate::error::{FetchError, RecordError};

/// Reads and writes the learner's submission ledger.
///
/// Every operation is inert for an anonymous context: no remote call is made
/// and reads come back empty.
#[derive(Clone)]
pub struct SubmissionRecorder {
    ledger: Arc<dyn SubmissionLedger>,
}

impl SubmissionRecorder {
    #[must_use]
    pub fn new(ledger: Arc<dyn SubmissionLedger>) -> Self {
        Self { ledger }
    }

    /// Fetch the learner's submissions and derive the solved set.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Remote` if the ledger is unreachable or malformed.
    pub async fn fetch(&self, ctx: &LearnerContext) -> Result<SolvedSet, FetchError> {
        let Some(learner) = ctx.learner() else {
            return Ok(SolvedSet::empty());
        };
        let submissions = self.ledger.list_submissions(ctx.token(), learner).await?;
        let solved = SolvedSet::from_submissions(submissions);
        tracing::debug!(
            learner = learner.value(),
            solved = solved.len(),
            "submissions fetched"
        );
        Ok(solved)
    }

    /// Append a `solved` submission. Returns `None` for anonymous contexts.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::Remote` if the ledger rejects the write.
    pub async fn record_solved(
        &self,
        ctx: &LearnerContext,
        question_id: QuestionId,
    ) -> Result<Option<Submission>, RecordError> {
        let Some(learner) = ctx.learner() else {
            return Ok(None);
        };
        let stored = self
            .ledger
            .record_submission(ctx.token(), NewSubmission::solved(learner, question_id))
            .await?;
        tracing::info!(
            learner = learner.value(),
            question_id = question_id.value(),
            submission_id = stored.id().value(),
            "solve recorded"
        );
        Ok(Some(stored))
    }

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
        self.ledger.delete_submission(ctx.token(), id).await?;
        tracing::info!(submission_id = id.value(), "submission deleted");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RecordError::Remote` if the ledger rejects the delete.
    pub async fn delete_all(&self, ctx: &LearnerContext) -> Result<(), RecordError> {
        let Some(learner) = ctx.learner() else {
            return Ok(());
        };
        self.ledger.delete_all_submissions(ctx.token(), learner).await?;
        tracing::info!(learner = learner.value(), "all submissions deleted");
        Ok(())
    }
}
