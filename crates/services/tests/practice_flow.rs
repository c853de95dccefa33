use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use practice_core::model::{
    AuthToken, Difficulty, LearnerContext, LearnerId, QuestionDraft, QuestionId, Submission,
    SubmissionId, SubmissionStatus, parse_tags,
};
use practice_core::time::fixed_clock;
use practice_core::{DifficultyFilter, QuestionFilter, Selection};
use services::{
    CatalogService, FetchError, PracticeEngine, RecordError, SolveOutcome, SubmissionRecorder,
    SyncOutcome,
};
use storage::repository::{
    Backend, BackendOp, InMemoryBackend, NewSubmission, RemoteError, SubmissionLedger,
};
use tokio::sync::{Notify, oneshot};

//
// ─── HARNESS ───────────────────────────────────────────────────────────────────
//

/// Parks the first call after `arm` until the returned sender fires.
///
/// Ledger writes park before reaching the ledger; ledger reads park after it,
/// so a parked read carries whatever the ledger held at that moment.
#[derive(Clone, Default)]
struct Gate {
    pending: Arc<Mutex<Option<oneshot::Receiver<()>>>>,
    entered: Arc<Notify>,
}

impl Gate {
    fn arm(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.pending.lock().unwrap() = Some(rx);
        tx
    }

    async fn pass(&self) {
        let parked = self.pending.lock().unwrap().take();
        if let Some(rx) = parked {
            self.entered.notify_one();
            let _ = rx.await;
        }
    }
}

#[derive(Clone)]
struct GatedLedger {
    inner: InMemoryBackend,
    list_gate: Gate,
    record_gate: Gate,
}

#[async_trait]
impl SubmissionLedger for GatedLedger {
    async fn record_submission(
        &self,
        token: Option<&AuthToken>,
        submission: NewSubmission,
    ) -> Result<Submission, RemoteError> {
        self.record_gate.pass().await;
        self.inner.record_submission(token, submission).await
    }

    async fn list_submissions(
        &self,
        token: Option<&AuthToken>,
        learner: LearnerId,
    ) -> Result<Vec<Submission>, RemoteError> {
        let listed = self.inner.list_submissions(token, learner).await;
        self.list_gate.pass().await;
        listed
    }

    async fn delete_submission(
        &self,
        token: Option<&AuthToken>,
        id: SubmissionId,
    ) -> Result<(), RemoteError> {
        self.inner.delete_submission(token, id).await
    }

    async fn delete_all_submissions(
        &self,
        token: Option<&AuthToken>,
        learner: LearnerId,
    ) -> Result<(), RemoteError> {
        self.inner.delete_all_submissions(token, learner).await
    }
}

struct Harness {
    memory: InMemoryBackend,
    ledger: GatedLedger,
    engine: PracticeEngine,
}

impl Harness {
    fn new(questions: &[(&str, Difficulty)]) -> Self {
        let memory = InMemoryBackend::new().with_clock(fixed_clock());
        for (title, difficulty) in questions {
            memory.seed_question(
                QuestionDraft::new(*title, "Solve it.", *difficulty, parse_tags("practice"))
                    .unwrap(),
            );
        }
        let ledger = GatedLedger {
            inner: memory.clone(),
            list_gate: Gate::default(),
            record_gate: Gate::default(),
        };
        let backend = Backend {
            questions: Arc::new(memory.clone()),
            submissions: Arc::new(ledger.clone()),
            runner: Arc::new(memory.clone()),
        };
        let engine = PracticeEngine::new(
            CatalogService::new(Arc::clone(&backend.questions)),
            SubmissionRecorder::new(Arc::clone(&backend.submissions)),
        );
        Self {
            memory,
            ledger,
            engine,
        }
    }

    fn solved_by(&self, learner: LearnerId, id: u64) {
        self.memory
            .seed_submission(learner, QuestionId::new(id), SubmissionStatus::Solved);
    }
}

fn alice() -> LearnerContext {
    LearnerContext::for_learner(LearnerId::new(1))
}

fn bob() -> LearnerContext {
    LearnerContext::for_learner(LearnerId::new(2))
}

fn selected(id: u64) -> Selection {
    Selection::Selected(QuestionId::new(id))
}

const BANK: [(&str, Difficulty); 5] = [
    ("Two Sum", Difficulty::Easy),
    ("Merge Intervals", Difficulty::Medium),
    ("Reverse Linked List", Difficulty::Easy),
    ("Word Ladder", Difficulty::Hard),
    ("LRU Cache", Difficulty::Medium),
];

//
// ─── BOOTSTRAP ─────────────────────────────────────────────────────────────────
//

#[tokio::test]
async fn bootstrap_picks_first_unsolved_easy() {
    let h = Harness::new(&[("Two Sum", Difficulty::Easy), ("Valid Anagram", Difficulty::Easy)]);
    h.solved_by(LearnerId::new(1), 2);

    let outcome = h.engine.bootstrap(&alice()).await.unwrap();
    assert_eq!(outcome, SyncOutcome::Applied(selected(1)));

    let snapshot = h.engine.snapshot();
    assert_eq!(snapshot.progress.solved_count, 1);
    assert_eq!(snapshot.progress.percent, 50);
    assert_eq!(snapshot.editor.question_id(), Some(QuestionId::new(1)));
    assert!(snapshot.editor.code().contains("Two Sum"));
}

#[tokio::test]
async fn bootstrap_falls_back_to_first_question() {
    let h = Harness::new(&[("Two Sum", Difficulty::Easy), ("Merge Intervals", Difficulty::Medium)]);
    h.solved_by(LearnerId::new(1), 1);

    let outcome = h.engine.bootstrap(&alice()).await.unwrap();
    assert_eq!(outcome, SyncOutcome::Applied(selected(1)));
}

#[tokio::test]
async fn stale_bootstrap_is_discarded_after_learner_switch() {
    let h = Harness::new(&BANK);
    h.solved_by(LearnerId::new(1), 1);
    let release = h.ledger.list_gate.arm();
    let entered = Arc::clone(&h.ledger.list_gate.entered);

    let alice = alice();
    let first = h.engine.bootstrap(&alice);
    let second = async {
        entered.notified().await;
        let fresh = h.engine.bootstrap(&bob()).await.unwrap();
        release.send(()).unwrap();
        fresh
    };
    let (stale, fresh) = tokio::join!(first, second);

    assert_eq!(stale.unwrap(), SyncOutcome::Stale);
    assert_eq!(fresh, SyncOutcome::Applied(selected(1)));
    let snapshot = h.engine.snapshot();
    assert_eq!(snapshot.learner, Some(LearnerId::new(2)));
    assert_eq!(snapshot.progress.solved_count, 0);
}

#[tokio::test]
async fn failed_catalog_load_keeps_prior_catalog() {
    let h = Harness::new(&BANK);
    h.engine.bootstrap(&alice()).await.unwrap();
    let before = h.engine.snapshot();

    h.memory
        .fail_next(BackendOp::ListQuestions, RemoteError::Connection("refused".into()));
    let err = h.engine.refresh(&alice()).await.unwrap_err();
    assert!(matches!(err, FetchError::Remote(RemoteError::Connection(_))));
    assert_eq!(h.engine.snapshot(), before);

    h.memory
        .fail_next(BackendOp::ListQuestions, RemoteError::Status(503));
    assert!(h.engine.bootstrap(&alice()).await.is_err());
    assert_eq!(h.engine.with_state(|s| s.catalog().len()), BANK.len());
}

#[tokio::test]
async fn empty_catalog_bootstraps_to_empty() {
    let h = Harness::new(&[]);
    let outcome = h.engine.bootstrap(&alice()).await.unwrap();
    assert_eq!(outcome, SyncOutcome::Applied(Selection::Empty));
    assert_eq!(h.engine.snapshot().progress.percent, 0);
}

//
// ─── SOLVING ───────────────────────────────────────────────────────────────────
//

#[tokio::test]
async fn advance_prefers_same_tier_over_catalog_order() {
    let h = Harness::new(&BANK);
    h.engine.bootstrap(&alice()).await.unwrap();

    let outcome = h.engine.record_solved(&alice(), QuestionId::new(1)).await.unwrap();
    assert_eq!(outcome, SolveOutcome::Advanced(QuestionId::new(3)));

    let outcome = h.engine.record_solved(&alice(), QuestionId::new(3)).await.unwrap();
    assert_eq!(outcome, SolveOutcome::Advanced(QuestionId::new(2)));
    assert!(h.engine.snapshot().editor.code().contains("Merge Intervals"));
}

#[tokio::test]
async fn solving_everything_ends_in_all_solved() {
    let h = Harness::new(&[("Two Sum", Difficulty::Easy), ("Word Ladder", Difficulty::Hard)]);
    h.engine.bootstrap(&alice()).await.unwrap();

    assert_eq!(
        h.engine.record_solved(&alice(), QuestionId::new(1)).await.unwrap(),
        SolveOutcome::Advanced(QuestionId::new(2))
    );
    assert_eq!(
        h.engine.record_solved(&alice(), QuestionId::new(2)).await.unwrap(),
        SolveOutcome::AllSolved
    );
    let snapshot = h.engine.snapshot();
    assert!(snapshot.selection.is_all_solved());
    assert_eq!(snapshot.progress.percent, 100);
    assert!(snapshot.current.is_none());
}

#[tokio::test]
async fn rejected_write_leaves_state_unchanged() {
    let h = Harness::new(&BANK);
    h.engine.bootstrap(&alice()).await.unwrap();
    let before = h.engine.snapshot();

    h.memory
        .fail_next(BackendOp::RecordSubmission, RemoteError::Status(500));
    let err = h
        .engine
        .record_solved(&alice(), QuestionId::new(1))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordError::Remote(RemoteError::Status(500))));
    assert_eq!(h.engine.snapshot(), before);
    assert!(!h.engine.with_state(|s| s.is_in_flight(QuestionId::new(1))));

    // The reservation was released, so a retry goes through.
    let outcome = h.engine.record_solved(&alice(), QuestionId::new(1)).await.unwrap();
    assert_eq!(outcome, SolveOutcome::Advanced(QuestionId::new(3)));
}

#[tokio::test]
async fn lost_acknowledgement_is_recovered_by_refresh() {
    let h = Harness::new(&BANK);
    h.engine.bootstrap(&alice()).await.unwrap();

    h.memory
        .lose_next_ack(BackendOp::RecordSubmission, RemoteError::Connection("reset".into()));
    assert!(h.engine.record_solved(&alice(), QuestionId::new(1)).await.is_err());
    assert_eq!(h.engine.snapshot().progress.solved_count, 0);

    h.engine.refresh(&alice()).await.unwrap();
    assert_eq!(h.engine.snapshot().progress.solved_count, 1);
}

#[tokio::test]
async fn double_solve_records_once_and_advances_once() {
    let h = Harness::new(&BANK);
    h.engine.bootstrap(&alice()).await.unwrap();

    let first = h.engine.record_solved(&alice(), QuestionId::new(1)).await.unwrap();
    let second = h.engine.record_solved(&alice(), QuestionId::new(1)).await.unwrap();

    assert_eq!(first, SolveOutcome::Advanced(QuestionId::new(3)));
    assert_eq!(second, SolveOutcome::AlreadySolved);
    assert_eq!(h.engine.snapshot().selection, selected(3));
    assert_eq!(h.memory.stored_submissions(LearnerId::new(1)).len(), 1);
}

#[tokio::test]
async fn overlapping_solve_is_a_no_op_while_in_flight() {
    let h = Harness::new(&BANK);
    h.engine.bootstrap(&alice()).await.unwrap();
    let release = h.ledger.record_gate.arm();
    let entered = Arc::clone(&h.ledger.record_gate.entered);

    let ctx = alice();
    let first = h.engine.record_solved(&ctx, QuestionId::new(1));
    let second = async {
        entered.notified().await;
        let overlap = h.engine.record_solved(&ctx, QuestionId::new(1)).await.unwrap();
        release.send(()).unwrap();
        overlap
    };
    let (first, overlap) = tokio::join!(first, second);

    assert_eq!(first.unwrap(), SolveOutcome::Advanced(QuestionId::new(3)));
    assert_eq!(overlap, SolveOutcome::InFlight);
    assert_eq!(h.memory.calls(BackendOp::RecordSubmission), 1);
}

#[tokio::test]
async fn unknown_question_is_rejected_without_a_write() {
    let h = Harness::new(&BANK);
    h.engine.bootstrap(&alice()).await.unwrap();

    let err = h
        .engine
        .record_solved(&alice(), QuestionId::new(99))
        .await
        .unwrap_err();
    assert!(matches!(err, RecordError::UnknownQuestion(id) if id == QuestionId::new(99)));
    assert_eq!(h.memory.calls(BackendOp::RecordSubmission), 0);
}

#[tokio::test]
async fn refetch_reproduces_local_solved_set() {
    let h = Harness::new(&BANK);
    h.engine.bootstrap(&alice()).await.unwrap();
    h.engine.record_solved(&alice(), QuestionId::new(1)).await.unwrap();
    h.engine.record_solved(&alice(), QuestionId::new(3)).await.unwrap();
    let local: Vec<_> = h.engine.with_state(|s| s.solved().ids().collect());

    let fresh = SubmissionRecorder::new(Arc::new(h.memory.clone()))
        .fetch(&alice())
        .await
        .unwrap();
    assert_eq!(fresh.ids().collect::<Vec<_>>(), local);
}

//
// ─── OVERLAPPING REQUESTS ──────────────────────────────────────────────────────
//

#[tokio::test]
async fn failed_rebootstrap_during_solve_still_advances() {
    let h = Harness::new(&BANK);
    h.engine.bootstrap(&alice()).await.unwrap();
    let release = h.ledger.record_gate.arm();
    let entered = Arc::clone(&h.ledger.record_gate.entered);

    let ctx = alice();
    let solve = h.engine.record_solved(&ctx, QuestionId::new(1));
    let rebootstrap = async {
        entered.notified().await;
        h.memory
            .fail_next(BackendOp::ListQuestions, RemoteError::Status(503));
        let result = h.engine.bootstrap(&ctx).await;
        release.send(()).unwrap();
        result
    };
    let (solved, rebooted) = tokio::join!(solve, rebootstrap);

    assert!(rebooted.is_err());
    assert_eq!(solved.unwrap(), SolveOutcome::Advanced(QuestionId::new(3)));
    assert!(!h.engine.with_state(|s| s.is_in_flight(QuestionId::new(1))));
    assert_eq!(h.engine.snapshot().progress.solved_count, 1);

    let retry = h.engine.record_solved(&ctx, QuestionId::new(1)).await.unwrap();
    assert_eq!(retry, SolveOutcome::AlreadySolved);
    assert_eq!(h.memory.stored_submissions(LearnerId::new(1)).len(), 1);
}

#[tokio::test]
async fn solve_acknowledged_after_rebootstrap_is_kept_without_moving_cursor() {
    let h = Harness::new(&BANK);
    h.engine.bootstrap(&alice()).await.unwrap();
    let release = h.ledger.record_gate.arm();
    let entered = Arc::clone(&h.ledger.record_gate.entered);

    let ctx = alice();
    let solve = h.engine.record_solved(&ctx, QuestionId::new(1));
    let rebootstrap = async {
        entered.notified().await;
        // Reads the ledger before the write lands.
        let outcome = h.engine.bootstrap(&ctx).await.unwrap();
        release.send(()).unwrap();
        outcome
    };
    let (solved, rebooted) = tokio::join!(solve, rebootstrap);

    assert_eq!(rebooted, SyncOutcome::Applied(selected(1)));
    assert_eq!(solved.unwrap(), SolveOutcome::Recorded);
    let snapshot = h.engine.snapshot();
    assert_eq!(snapshot.progress.solved_count, 1);
    assert_eq!(snapshot.selection, selected(1));

    let retry = h.engine.record_solved(&ctx, QuestionId::new(1)).await.unwrap();
    assert_eq!(retry, SolveOutcome::AlreadySolved);
    assert_eq!(h.memory.stored_submissions(LearnerId::new(1)).len(), 1);
}

#[tokio::test]
async fn solve_acknowledged_after_learner_switch_leaves_new_session_alone() {
    let h = Harness::new(&BANK);
    h.engine.bootstrap(&alice()).await.unwrap();
    let release = h.ledger.record_gate.arm();
    let entered = Arc::clone(&h.ledger.record_gate.entered);

    let alice = alice();
    let solve = h.engine.record_solved(&alice, QuestionId::new(1));
    let switch = async {
        entered.notified().await;
        h.engine.bootstrap(&bob()).await.unwrap();
        release.send(()).unwrap();
    };
    let (solved, ()) = tokio::join!(solve, switch);

    assert_eq!(solved.unwrap(), SolveOutcome::Stale);
    let snapshot = h.engine.snapshot();
    assert_eq!(snapshot.learner, Some(LearnerId::new(2)));
    assert_eq!(snapshot.progress.solved_count, 0);
    assert_eq!(h.memory.stored_submissions(LearnerId::new(1)).len(), 1);
}

#[tokio::test]
async fn refresh_read_before_a_solve_is_dropped() {
    let h = Harness::new(&BANK);
    h.engine.bootstrap(&alice()).await.unwrap();
    let release = h.ledger.list_gate.arm();
    let entered = Arc::clone(&h.ledger.list_gate.entered);

    let ctx = alice();
    let refresh = h.engine.refresh(&ctx);
    let solve = async {
        entered.notified().await;
        let outcome = h.engine.record_solved(&ctx, QuestionId::new(1)).await.unwrap();
        release.send(()).unwrap();
        outcome
    };
    let (refreshed, solved) = tokio::join!(refresh, solve);

    assert_eq!(refreshed.unwrap(), SyncOutcome::Stale);
    assert_eq!(solved, SolveOutcome::Advanced(QuestionId::new(3)));
    let snapshot = h.engine.snapshot();
    assert_eq!(snapshot.progress.solved_count, 1);
    assert_eq!(snapshot.selection, selected(3));
}

#[tokio::test]
async fn refresh_read_before_delete_all_is_dropped() {
    let h = Harness::new(&BANK);
    h.solved_by(LearnerId::new(1), 1);
    h.engine.bootstrap(&alice()).await.unwrap();
    let release = h.ledger.list_gate.arm();
    let entered = Arc::clone(&h.ledger.list_gate.entered);

    let ctx = alice();
    let refresh = h.engine.refresh(&ctx);
    let clear = async {
        entered.notified().await;
        h.engine.delete_all(&ctx).await.unwrap();
        release.send(()).unwrap();
    };
    let (refreshed, ()) = tokio::join!(refresh, clear);

    assert_eq!(refreshed.unwrap(), SyncOutcome::Stale);
    assert_eq!(h.engine.snapshot().progress.solved_count, 0);
}

#[tokio::test]
async fn bootstrap_rereads_ledger_after_a_concurrent_delete() {
    let h = Harness::new(&BANK);
    h.solved_by(LearnerId::new(1), 1);
    h.engine.bootstrap(&alice()).await.unwrap();
    let release = h.ledger.list_gate.arm();
    let entered = Arc::clone(&h.ledger.list_gate.entered);

    let ctx = alice();
    let rebootstrap = h.engine.bootstrap(&ctx);
    let clear = async {
        entered.notified().await;
        h.engine.delete_all(&ctx).await.unwrap();
        release.send(()).unwrap();
    };
    let (rebooted, ()) = tokio::join!(rebootstrap, clear);

    assert_eq!(rebooted.unwrap(), SyncOutcome::Applied(selected(1)));
    assert_eq!(h.engine.snapshot().progress.solved_count, 0);
    assert_eq!(h.memory.calls(BackendOp::ListSubmissions), 3);
}

//
// ─── DELETION ──────────────────────────────────────────────────────────────────
//

#[tokio::test]
async fn delete_all_resets_progress_but_not_cursor() {
    let h = Harness::new(&BANK);
    h.engine.bootstrap(&alice()).await.unwrap();
    h.engine.record_solved(&alice(), QuestionId::new(1)).await.unwrap();
    h.engine.edit_code("def solution():\n    return 42\n");
    let before = h.engine.snapshot();
    assert_eq!(before.progress.solved_count, 1);

    h.engine.delete_all(&alice()).await.unwrap();

    let after = h.engine.snapshot();
    assert_eq!(after.progress.percent, 0);
    assert_eq!(after.selection, before.selection);
    assert_eq!(after.editor, before.editor);
    assert!(h.memory.stored_submissions(LearnerId::new(1)).is_empty());
}

#[tokio::test]
async fn delete_one_unsolves_its_question() {
    let h = Harness::new(&BANK);
    h.engine.bootstrap(&alice()).await.unwrap();
    h.engine.record_solved(&alice(), QuestionId::new(1)).await.unwrap();
    let submission = h.memory.stored_submissions(LearnerId::new(1))[0].clone();

    h.engine.delete_one(&alice(), submission.id()).await.unwrap();

    assert_eq!(h.engine.snapshot().progress.solved_count, 0);
    assert_eq!(h.engine.snapshot().selection, selected(3));

    let err = h
        .engine
        .delete_one(&alice(), submission.id())
        .await
        .unwrap_err();
    assert!(matches!(err, RecordError::Remote(RemoteError::NotFound)));
}

#[tokio::test]
async fn deleting_an_entry_recorded_elsewhere_rereads_the_ledger() {
    let h = Harness::new(&BANK);
    h.engine.bootstrap(&alice()).await.unwrap();
    h.engine.record_solved(&alice(), QuestionId::new(1)).await.unwrap();
    assert_eq!(h.engine.snapshot().progress.solved_count, 1);

    // Another client replaces the entry this session knows about.
    let known = h.memory.stored_submissions(LearnerId::new(1))[0].clone();
    h.memory.delete_submission(None, known.id()).await.unwrap();
    let elsewhere = h.memory.seed_submission(
        LearnerId::new(1),
        QuestionId::new(1),
        SubmissionStatus::Solved,
    );
    let reads_before = h.memory.calls(BackendOp::ListSubmissions);

    h.engine.delete_one(&alice(), elsewhere.id()).await.unwrap();

    let snapshot = h.engine.snapshot();
    assert_eq!(snapshot.progress.solved_count, 0);
    assert_eq!(snapshot.selection, selected(3));
    assert_eq!(h.memory.calls(BackendOp::ListSubmissions), reads_before + 1);
}

//
// ─── FILTERS, ANONYMOUS, CATALOG ───────────────────────────────────────────────
//

#[tokio::test]
async fn filter_change_reselects_only_when_needed() {
    let h = Harness::new(&BANK);
    h.engine.bootstrap(&alice()).await.unwrap();

    let kept = h.engine.set_filter(QuestionFilter::new("two", DifficultyFilter::Any));
    assert_eq!(kept, selected(1));

    let moved = h
        .engine
        .set_filter(QuestionFilter::new("", DifficultyFilter::Only(Difficulty::Medium)));
    assert_eq!(moved, selected(2));
    assert_eq!(
        h.engine.snapshot().filtered,
        vec![QuestionId::new(2), QuestionId::new(5)]
    );

    assert!(!h.engine.select(QuestionId::new(1)));
    assert!(h.engine.select(QuestionId::new(5)));
    assert_eq!(h.engine.snapshot().selection, selected(5));
}

#[tokio::test]
async fn anonymous_session_never_touches_the_ledger() {
    let h = Harness::new(&BANK);
    let anon = LearnerContext::anonymous();

    h.engine.bootstrap(&anon).await.unwrap();
    let outcome = h.engine.record_solved(&anon, QuestionId::new(1)).await.unwrap();
    h.engine.delete_all(&anon).await.unwrap();

    assert_eq!(outcome, SolveOutcome::Inert);
    assert_eq!(h.engine.snapshot().selection, selected(1));
    for op in [
        BackendOp::ListSubmissions,
        BackendOp::RecordSubmission,
        BackendOp::DeleteAllSubmissions,
    ] {
        assert_eq!(h.memory.calls(op), 0, "{op:?}");
    }
}

#[tokio::test]
async fn created_question_appears_after_refresh() {
    let h = Harness::new(&BANK);
    let ctx = LearnerContext::new(Some(LearnerId::new(1)), AuthToken::new("token"));
    h.engine.bootstrap(&ctx).await.unwrap();

    let draft = QuestionDraft::new(
        "Course Schedule",
        "Detect a cycle in a prerequisite graph.",
        Difficulty::Medium,
        parse_tags("graph"),
    )
    .unwrap();
    let created = h.engine.create_question(&ctx, &draft).await.unwrap();

    let snapshot = h.engine.snapshot();
    assert_eq!(snapshot.filtered.last(), Some(&created.id()));
    assert_eq!(snapshot.progress.total_count, BANK.len() + 1);
    assert_eq!(snapshot.selection, selected(1));
}

#[tokio::test]
async fn subscribers_observe_every_change() {
    let h = Harness::new(&BANK);
    let mut rx = h.engine.subscribe();

    h.engine.bootstrap(&alice()).await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().selection, selected(1));

    h.engine.record_solved(&alice(), QuestionId::new(1)).await.unwrap();
    assert!(rx.has_changed().unwrap());
    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot.selection, selected(3));
    assert_eq!(snapshot.progress.solved_count, 1);
}

#[tokio::test]
async fn editor_run_carries_current_code_and_input() {
    let h = Harness::new(&BANK);
    assert!(h.engine.editor_run("").is_none());

    h.engine.bootstrap(&alice()).await.unwrap();
    h.engine.edit_code("print(input()[::-1])");

    let run = h.engine.editor_run("Ada").unwrap();
    assert_eq!(run.code, "print(input()[::-1])");
    assert_eq!(run.stdin, "Ada");
    assert_eq!(run.language, "python");
}
