use practice_core::model::{
    AuthToken, Difficulty, LearnerContext, QuestionDraft, parse_tags,
};
use practice_core::{ProgressView, QuestionFilter, Selection};
use services::{AppServices, CatalogServiceError, PracticeConfig, PracticeSnapshot, SolveOutcome};
use storage::repository::RemoteError;

mod args;

use args::{Args, Command, NewQuestionArgs, print_usage};

const SAMPLE_BANK: [(&str, &str, Difficulty, &str); 5] = [
    (
        "Two Sum",
        "Return the indices of the two numbers that add up to the target.",
        Difficulty::Easy,
        "array,hash-map",
    ),
    (
        "Reverse Linked List",
        "Reverse a singly linked list and return the new head.",
        Difficulty::Easy,
        "linked-list",
    ),
    (
        "Merge Intervals",
        "Merge all overlapping intervals and return the result sorted by start.",
        Difficulty::Medium,
        "array,sorting",
    ),
    (
        "Word Ladder",
        "Find the length of the shortest transformation sequence between two words.",
        Difficulty::Hard,
        "graph,bfs",
    ),
    (
        "LRU Cache",
        "Design a cache that evicts the least recently used entry when full.",
        Difficulty::Medium,
        "design,hash-map",
    ),
];

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "app=info,services=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_progress(progress: ProgressView) {
    println!(
        "progress: {}/{} solved ({}%)",
        progress.solved_count, progress.total_count, progress.percent
    );
}

fn print_current(snapshot: &PracticeSnapshot) {
    match (snapshot.selection, &snapshot.current) {
        (Selection::AllSolved, _) => println!("every question is solved"),
        (Selection::Selected(_), Some(question)) => {
            println!(
                "current: #{} {} [{}]",
                question.id(),
                question.title(),
                question.difficulty()
            );
            println!("{}", question.description());
            println!();
            print!("{}", snapshot.editor.code());
        }
        _ => println!("no question matches the current filter"),
    }
}

fn require_learner(ctx: &LearnerContext) -> bool {
    if ctx.is_anonymous() {
        eprintln!("no learner signed in; set PRACTICE_API_TOKEN or pass --token");
        return false;
    }
    true
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let Some(Args {
        command,
        api_url,
        token,
    }) = args::parse(argv).inspect_err(|_| print_usage())?
    else {
        print_usage();
        return Ok(());
    };

    let mut config = PracticeConfig::from_env()?;
    if let Some(url) = api_url {
        config = config.with_api_url(&url)?;
    }
    if let Some(raw) = token {
        config = config.with_token(AuthToken::new(raw));
    }

    let services = AppServices::from_config(config)?;
    let ctx = services.context().clone();
    let engine = services.engine();

    match command {
        Command::Status => {
            engine.bootstrap(&ctx).await?;
            let snapshot = engine.snapshot();
            match snapshot.learner {
                Some(learner) => println!("learner: {learner}"),
                None => println!("learner: anonymous"),
            }
            print_progress(snapshot.progress);
            print_current(&snapshot);
        }
        Command::List { search, difficulty } => {
            engine.bootstrap(&ctx).await?;
            engine.set_filter(
                QuestionFilter::any()
                    .with_text(search)
                    .with_difficulty(difficulty),
            );
            engine.with_state(|state| {
                let current = state.selection().question_id();
                for question in state.filtered() {
                    let solved = if state.solved().contains(question.id()) { 'x' } else { ' ' };
                    let marker = if current == Some(question.id()) { '>' } else { ' ' };
                    println!(
                        "{marker} [{solved}] #{:<4} {:<7} {}",
                        question.id().value(),
                        question.difficulty().as_str(),
                        question.title()
                    );
                }
                print_progress(state.progress());
            });
        }
        Command::Suggest(text) => {
            for question in services.catalog().search(&text).await? {
                println!("#{} {}", question.id(), question.title());
            }
        }
        Command::Recommend => {
            for pick in services.catalog().recommend(&ctx).await? {
                println!("#{:<4} {:<7} {}", pick.id.value(), pick.difficulty.as_str(), pick.title);
            }
        }
        Command::Run { file, input } => {
            engine.bootstrap(&ctx).await?;
            if let Some(path) = file {
                engine.edit_code(std::fs::read_to_string(&path)?);
            }
            let Some(run) = engine.editor_run(input) else {
                println!("no question loaded; nothing to run");
                return Ok(());
            };
            let output = services.runner().run(&ctx, &run).await?;
            print!("{}", output.stdout);
            eprint!("{}", output.stderr);
            if !output.succeeded() {
                println!("exit code {}", output.exit_code);
            }
        }
        Command::Solve(question_id) => {
            if !require_learner(&ctx) {
                return Ok(());
            }
            engine.bootstrap(&ctx).await?;
            match engine.record_solved(&ctx, question_id).await? {
                SolveOutcome::AlreadySolved => println!("#{question_id} is already solved"),
                SolveOutcome::InFlight => println!("#{question_id} is already being recorded"),
                SolveOutcome::Stale | SolveOutcome::Inert => {
                    println!("session changed; nothing recorded");
                }
                SolveOutcome::Advanced(_)
                | SolveOutcome::AllSolved
                | SolveOutcome::Recorded
                | SolveOutcome::SelectionReset => {
                    println!("recorded #{question_id} as solved");
                    let snapshot = engine.snapshot();
                    print_progress(snapshot.progress);
                    print_current(&snapshot);
                }
            }
        }
        Command::Submissions => {
            if !require_learner(&ctx) {
                return Ok(());
            }
            engine.bootstrap(&ctx).await?;
            engine.with_state(|state| {
                for submission in state.solved().submissions() {
                    let title = state
                        .catalog()
                        .get(submission.question_id())
                        .map_or("(removed question)", |q| q.title());
                    println!(
                        "{:<6} {:<10} {} #{} {}",
                        submission.id().value(),
                        submission.status().as_str(),
                        submission.submitted_at().format("%Y-%m-%d %H:%M"),
                        submission.question_id(),
                        title
                    );
                }
            });
        }
        Command::Delete(submission_id) => {
            if !require_learner(&ctx) {
                return Ok(());
            }
            engine.bootstrap(&ctx).await?;
            engine.delete_one(&ctx, submission_id).await?;
            println!("deleted submission {submission_id}");
            print_progress(engine.snapshot().progress);
        }
        Command::Clear => {
            if !require_learner(&ctx) {
                return Ok(());
            }
            engine.bootstrap(&ctx).await?;
            engine.delete_all(&ctx).await?;
            println!("cleared all submissions");
            print_progress(engine.snapshot().progress);
        }
        Command::Add(NewQuestionArgs {
            title,
            description,
            difficulty,
            tags,
        }) => {
            let draft = QuestionDraft::new(title, description, difficulty, parse_tags(&tags))?;
            engine.bootstrap(&ctx).await?;
            let question = engine.create_question(&ctx, &draft).await?;
            println!("created #{} {}", question.id(), question.title());
        }
        Command::Seed => {
            let catalog = services.catalog();
            for (title, description, difficulty, tags) in SAMPLE_BANK {
                let draft = QuestionDraft::new(title, description, difficulty, parse_tags(tags))?;
                match catalog.create(&ctx, &draft).await {
                    Ok(question) => println!("created #{} {}", question.id(), question.title()),
                    Err(CatalogServiceError::Remote(RemoteError::Conflict)) => {
                        tracing::info!(title, "sample question already present");
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
