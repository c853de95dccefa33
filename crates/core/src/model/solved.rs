use std::collections::{BTreeSet, HashMap};

use crate::model::ids::{QuestionId, SubmissionId};
use crate::model::submission::Submission;

/// Question ids the learner has solved, derived from their ledger entries.
///
/// The submissions are kept alongside the derived set so that deleting a single
/// ledger entry can be mirrored locally without a refetch. Membership is always
/// recomputed from the submissions, which keeps it identical to what a full
/// ledger refetch would produce.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolvedSet {
    submissions: Vec<Submission>,
    solved: BTreeSet<QuestionId>,
}

impl SolvedSet {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Derives the set from a learner's full submission list.
    #[must_use]
    pub fn from_submissions(submissions: Vec<Submission>) -> Self {
        let mut set = Self {
            submissions,
            solved: BTreeSet::new(),
        };
        set.recompute();
        set
    }

    #[must_use]
    pub fn contains(&self, id: QuestionId) -> bool {
        self.solved.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.solved.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.solved.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = QuestionId> + '_ {
        self.solved.iter().copied()
    }

    /// Every known ledger entry, in the order they were learned about.
    #[must_use]
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    /// Mirrors a successful ledger append.
    ///
    /// Returns `true` when the question was not solved before.
    pub fn record(&mut self, submission: Submission) -> bool {
        let question_id = submission.question_id();
        let was_solved = self.contains(question_id);
        if self.submissions.iter().any(|s| s.id() == submission.id()) {
            return false;
        }
        self.submissions.push(submission);
        self.recompute();
        !was_solved && self.contains(question_id)
    }

    /// Mirrors the deletion of one ledger entry.
    ///
    /// Returns the removed submission, or `None` if it was not known locally.
    pub fn remove_submission(&mut self, id: SubmissionId) -> Option<Submission> {
        let index = self.submissions.iter().position(|s| s.id() == id)?;
        let removed = self.submissions.remove(index);
        self.recompute();
        Some(removed)
    }

    /// Mirrors the deletion of every ledger entry for the learner.
    pub fn clear(&mut self) {
        self.submissions.clear();
        self.solved.clear();
    }

    fn recompute(&mut self) {
        let mut latest: HashMap<QuestionId, &Submission> = HashMap::new();
        for submission in &self.submissions {
            latest
                .entry(submission.question_id())
                .and_modify(|current| {
                    if submission.recency_key() > current.recency_key() {
                        *current = submission;
                    }
                })
                .or_insert(submission);
        }
        self.solved = latest
            .into_iter()
            .filter(|(_, submission)| submission.is_solved())
            .map(|(id, _)| id)
            .collect();
    }
}
