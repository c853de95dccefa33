use async_trait::async_trait;
use practice_core::Clock;
use practice_core::model::{
    AuthToken, CodeRun, DEFAULT_LANGUAGE, LearnerId, Question, QuestionDraft, QuestionId,
    Recommendation, RunOutput, Submission, SubmissionId, SubmissionStatus,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by remote backends.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RemoteError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("unauthorized")]
    Unauthorized,

    #[error("unexpected status {0}")]
    Status(u16),

    /// The server refused the request and said why.
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A submission to append to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewSubmission {
    pub learner: LearnerId,
    pub question_id: QuestionId,
    pub status: SubmissionStatus,
}

impl NewSubmission {
    #[must_use]
    pub fn solved(learner: LearnerId, question_id: QuestionId) -> Self {
        Self {
            learner,
            question_id,
            status: SubmissionStatus::Solved,
        }
    }
}

/// Contract of the remote question directory.
#[async_trait]
pub trait QuestionDirectory: Send + Sync {
    /// List every question in directory order.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the directory is unreachable or the payload is malformed.
    async fn list_questions(&self) -> Result<Vec<Question>, RemoteError>;

    /// Title search used for suggestions. An empty query yields no results.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the directory is unreachable or the payload is malformed.
    async fn search_questions(&self, query: &str) -> Result<Vec<Question>, RemoteError>;

    /// Publish a new question.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Unauthorized` without valid credentials and
    /// `RemoteError::Conflict` if the title already exists.
    async fn create_question(
        &self,
        token: Option<&AuthToken>,
        draft: &QuestionDraft,
    ) -> Result<Question, RemoteError>;

    /// Up to five questions the recommender suggests for `learner`, favouring
    /// ones they have not solved. Without a learner the pick is unpersonalised.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the recommender is unreachable or the payload is malformed.
    async fn recommend_questions(
        &self,
        learner: Option<LearnerId>,
    ) -> Result<Vec<Recommendation>, RemoteError>;
}

/// Contract of the remote sandbox that runs editor content.
#[async_trait]
pub trait CodeRunner: Send + Sync {
    /// # Errors
    ///
    /// Returns `RemoteError::Rejected` when the sandbox refuses the program
    /// (unsupported language, empty code, timeout).
    async fn execute(
        &self,
        token: Option<&AuthToken>,
        run: &CodeRun,
    ) -> Result<RunOutput, RemoteError>;
}

/// Contract of the remote, append-only submission ledger.
#[async_trait]
pub trait SubmissionLedger: Send + Sync {
    /// Append a submission and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the write is rejected or the ledger is unreachable.
    async fn record_submission(
        &self,
        token: Option<&AuthToken>,
        submission: NewSubmission,
    ) -> Result<Submission, RemoteError>;

    /// Every submission of a learner.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the ledger is unreachable or the payload is malformed.
    async fn list_submissions(
        &self,
        token: Option<&AuthToken>,
        learner: LearnerId,
    ) -> Result<Vec<Submission>, RemoteError>;

    /// # Errors
    ///
    /// Returns `RemoteError::NotFound` if the submission does not exist.
    async fn delete_submission(
        &self,
        token: Option<&AuthToken>,
        id: SubmissionId,
    ) -> Result<(), RemoteError>;

    /// # Errors
    ///
    /// Returns `RemoteError` if the ledger is unreachable.
    async fn delete_all_submissions(
        &self,
        token: Option<&AuthToken>,
        learner: LearnerId,
    ) -> Result<(), RemoteError>;
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

/// Operations of the in-memory backend, used for failure injection and call counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOp {
    ListQuestions,
    SearchQuestions,
    CreateQuestion,
    RecordSubmission,
    ListSubmissions,
    DeleteSubmission,
    DeleteAllSubmissions,
    RecommendQuestions,
    Execute,
}

/// Most recommendations the directory hands out at once.
pub const RECOMMENDATION_LIMIT: usize = 5;

#[derive(Debug, Clone)]
enum Injected {
    /// Fail without touching state.
    Reject(RemoteError),
    /// Apply the write, then report failure (lost acknowledgement).
    LoseAck(RemoteError),
}

#[derive(Default)]
struct BackendState {
    questions: Vec<Question>,
    next_question_id: u64,
    submissions: Vec<(LearnerId, Submission)>,
    next_submission_id: u64,
    runs: VecDeque<RunOutput>,
    injected: HashMap<BackendOp, VecDeque<Injected>>,
    calls: HashMap<BackendOp, usize>,
}

impl BackendState {
    fn enter(&mut self, op: BackendOp) -> Option<Injected> {
        *self.calls.entry(op).or_default() += 1;
        self.injected.get_mut(&op).and_then(VecDeque::pop_front)
    }

    fn insert_question(&mut self, draft: QuestionDraft) -> Question {
        self.next_question_id += 1;
        let question = draft.into_question(QuestionId::new(self.next_question_id));
        self.questions.push(question.clone());
        question
    }

    fn insert_submission(&mut self, submission: NewSubmission, clock: Clock) -> Submission {
        self.next_submission_id += 1;
        let stored = Submission::new(
            SubmissionId::new(self.next_submission_id),
            submission.question_id,
            submission.status,
            clock.now(),
        );
        self.submissions.push((submission.learner, stored.clone()));
        stored
    }
}

/// Simple in-memory backend for testing and prototyping.
///
/// Clones share state. Failures can be queued per operation, either rejecting
/// the call outright or applying a write and then losing the acknowledgement.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<Mutex<BackendState>>,
    clock: Clock,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, BackendState>, RemoteError> {
        self.state
            .lock()
            .map_err(|e| RemoteError::Connection(e.to_string()))
    }

    fn lock_or_recover(&self) -> MutexGuard<'_, BackendState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Add a question directly, bypassing authentication and call accounting.
    pub fn seed_question(&self, draft: QuestionDraft) -> Question {
        self.lock_or_recover().insert_question(draft)
    }

    /// Append a submission directly, as if recorded by another client.
    pub fn seed_submission(
        &self,
        learner: LearnerId,
        question_id: QuestionId,
        status: SubmissionStatus,
    ) -> Submission {
        let clock = self.clock;
        self.lock_or_recover().insert_submission(
            NewSubmission {
                learner,
                question_id,
                status,
            },
            clock,
        )
    }

    /// Make the next call of `op` fail with `error` without side effects.
    pub fn fail_next(&self, op: BackendOp, error: RemoteError) {
        self.lock_or_recover()
            .injected
            .entry(op)
            .or_default()
            .push_back(Injected::Reject(error));
    }

    /// Make the next call of `op` apply its write and then fail with `error`.
    pub fn lose_next_ack(&self, op: BackendOp, error: RemoteError) {
        self.lock_or_recover()
            .injected
            .entry(op)
            .or_default()
            .push_back(Injected::LoseAck(error));
    }

    /// Queue the sandbox's answer to the next `execute` call. Without a queued
    /// answer a run succeeds with no output.
    pub fn script_run(&self, output: RunOutput) {
        self.lock_or_recover().runs.push_back(output);
    }

    /// Number of calls made to `op` through the trait methods.
    #[must_use]
    pub fn calls(&self, op: BackendOp) -> usize {
        self.lock_or_recover().calls.get(&op).copied().unwrap_or(0)
    }

    /// Ledger entries stored for `learner`, in append order.
    #[must_use]
    pub fn stored_submissions(&self, learner: LearnerId) -> Vec<Submission> {
        self.lock_or_recover()
            .submissions
            .iter()
            .filter(|(owner, _)| *owner == learner)
            .map(|(_, submission)| submission.clone())
            .collect()
    }
}

fn rejected(injected: Option<Injected>) -> Result<Option<RemoteError>, RemoteError> {
    match injected {
        Some(Injected::Reject(error)) => Err(error),
        Some(Injected::LoseAck(error)) => Ok(Some(error)),
        None => Ok(None),
    }
}

#[async_trait]
impl QuestionDirectory for InMemoryBackend {
    async fn list_questions(&self) -> Result<Vec<Question>, RemoteError> {
        let mut guard = self.lock()?;
        rejected(guard.enter(BackendOp::ListQuestions))?;
        Ok(guard.questions.clone())
    }

    async fn search_questions(&self, query: &str) -> Result<Vec<Question>, RemoteError> {
        let mut guard = self.lock()?;
        rejected(guard.enter(BackendOp::SearchQuestions))?;
        let prefix = query.trim().to_lowercase();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }
        Ok(guard
            .questions
            .iter()
            .filter(|q| q.title().to_lowercase().starts_with(&prefix))
            .cloned()
            .collect())
    }

    async fn create_question(
        &self,
        token: Option<&AuthToken>,
        draft: &QuestionDraft,
    ) -> Result<Question, RemoteError> {
        let mut guard = self.lock()?;
        let lost = rejected(guard.enter(BackendOp::CreateQuestion))?;
        if token.is_none() {
            return Err(RemoteError::Unauthorized);
        }
        if guard.questions.iter().any(|q| q.title() == draft.title()) {
            return Err(RemoteError::Conflict);
        }
        let question = guard.insert_question(draft.clone());
        match lost {
            Some(error) => Err(error),
            None => Ok(question),
        }
    }

    /// Directory order instead of a random sample, so tests stay deterministic.
    async fn recommend_questions(
        &self,
        learner: Option<LearnerId>,
    ) -> Result<Vec<Recommendation>, RemoteError> {
        let mut guard = self.lock()?;
        rejected(guard.enter(BackendOp::RecommendQuestions))?;
        let solved: HashSet<QuestionId> = guard
            .submissions
            .iter()
            .filter(|(owner, s)| Some(*owner) == learner && s.is_solved())
            .map(|(_, s)| s.question_id())
            .collect();
        let unsolved: Vec<&Question> = guard
            .questions
            .iter()
            .filter(|q| !solved.contains(&q.id()))
            .collect();
        // Everything solved: fall back to the whole directory.
        let pool = if unsolved.is_empty() {
            guard.questions.iter().collect()
        } else {
            unsolved
        };
        Ok(pool
            .into_iter()
            .take(RECOMMENDATION_LIMIT)
            .map(|q| Recommendation {
                id: q.id(),
                title: q.title().to_owned(),
                difficulty: q.difficulty(),
            })
            .collect())
    }
}

#[async_trait]
impl CodeRunner for InMemoryBackend {
    async fn execute(
        &self,
        _token: Option<&AuthToken>,
        run: &CodeRun,
    ) -> Result<RunOutput, RemoteError> {
        let mut guard = self.lock()?;
        rejected(guard.enter(BackendOp::Execute))?;
        if run.language != DEFAULT_LANGUAGE {
            return Err(RemoteError::Rejected(
                "Only Python is supported for now.".into(),
            ));
        }
        if run.is_blank() {
            return Err(RemoteError::Rejected("No code provided.".into()));
        }
        Ok(guard.runs.pop_front().unwrap_or_default())
    }
}

#[async_trait]
impl SubmissionLedger for InMemoryBackend {
    async fn record_submission(
        &self,
        _token: Option<&AuthToken>,
        submission: NewSubmission,
    ) -> Result<Submission, RemoteError> {
        let mut guard = self.lock()?;
        let lost = rejected(guard.enter(BackendOp::RecordSubmission))?;
        let stored = guard.insert_submission(submission, self.clock);
        match lost {
            Some(error) => Err(error),
            None => Ok(stored),
        }
    }

    async fn list_submissions(
        &self,
        _token: Option<&AuthToken>,
        learner: LearnerId,
    ) -> Result<Vec<Submission>, RemoteError> {
        let mut guard = self.lock()?;
        rejected(guard.enter(BackendOp::ListSubmissions))?;
        Ok(guard
            .submissions
            .iter()
            .filter(|(owner, _)| *owner == learner)
            .map(|(_, submission)| submission.clone())
            .collect())
    }

    async fn delete_submission(
        &self,
        _token: Option<&AuthToken>,
        id: SubmissionId,
    ) -> Result<(), RemoteError> {
        let mut guard = self.lock()?;
        let lost = rejected(guard.enter(BackendOp::DeleteSubmission))?;
        let index = guard
            .submissions
            .iter()
            .position(|(_, submission)| submission.id() == id)
            .ok_or(RemoteError::NotFound)?;
        guard.submissions.remove(index);
        lost.map_or(Ok(()), Err)
    }

    async fn delete_all_submissions(
        &self,
        _token: Option<&AuthToken>,
        learner: LearnerId,
    ) -> Result<(), RemoteError> {
        let mut guard = self.lock()?;
        let lost = rejected(guard.enter(BackendOp::DeleteAllSubmissions))?;
        guard.submissions.retain(|(owner, _)| *owner != learner);
        lost.map_or(Ok(()), Err)
    }
}

/// Aggregates the remote collaborators behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Backend {
    pub questions: Arc<dyn QuestionDirectory>,
    pub submissions: Arc<dyn SubmissionLedger>,
    pub runner: Arc<dyn CodeRunner>,
}

impl Backend {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_in_memory(&InMemoryBackend::new())
    }

    #[must_use]
    pub fn from_in_memory(backend: &InMemoryBackend) -> Self {
        let questions: Arc<dyn QuestionDirectory> = Arc::new(backend.clone());
        let submissions: Arc<dyn SubmissionLedger> = Arc::new(backend.clone());
        let runner: Arc<dyn CodeRunner> = Arc::new(backend.clone());
        Self {
            questions,
            submissions,
            runner,
        }
    }
}
