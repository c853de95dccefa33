use std::fmt;

use practice_core::DifficultyFilter;
use practice_core::model::{Difficulty, QuestionId, SubmissionId};

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { name: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidValue { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { name } => write!(f, "missing <{name}>"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidValue { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app status");
    eprintln!("  app list [--search <text>] [--difficulty <easy|medium|hard|any>]");
    eprintln!("  app suggest <text>");
    eprintln!("  app recommend");
    eprintln!("  app run [--file <path>] [--input <text>]");
    eprintln!("  app solve <question-id>");
    eprintln!("  app submissions");
    eprintln!("  app delete <submission-id>");
    eprintln!("  app clear");
    eprintln!("  app add --title <text> --description <text> --difficulty <tier> [--tags <a,b>]");
    eprintln!("  app seed");
    eprintln!();
    eprintln!("Global options (any position):");
    eprintln!("  --api-url <url>   overrides PRACTICE_API_URL");
    eprintln!("  --token <jwt>     overrides PRACTICE_API_TOKEN");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PRACTICE_API_URL, PRACTICE_API_TOKEN, PRACTICE_REQUEST_TIMEOUT_SECS, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestionArgs {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub tags: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    List {
        search: String,
        difficulty: DifficultyFilter,
    },
    Suggest(String),
    Recommend,
    /// Run the current question's editor content, optionally replaced by a file.
    Run {
        file: Option<String>,
        input: String,
    },
    Solve(QuestionId),
    Submissions,
    Delete(SubmissionId),
    Clear,
    Add(NewQuestionArgs),
    Seed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    pub api_url: Option<String>,
    pub token: Option<String>,
}

/// `None` means help was requested.
pub fn parse(argv: Vec<String>) -> Result<Option<Args>, ArgsError> {
    let mut api_url = None;
    let mut token = None;
    let mut rest = Vec::new();

    let mut iter = argv.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(None),
            "--api-url" => api_url = Some(require_value(&mut iter, "--api-url")?),
            "--token" => token = Some(require_value(&mut iter, "--token")?),
            _ => rest.push(arg),
        }
    }

    let mut rest = rest.into_iter();
    let command = match rest.next().as_deref() {
        None | Some("status") => Command::Status,
        Some("list") => parse_list(&mut rest)?,
        Some("suggest") => Command::Suggest(positional(&mut rest, "text")?),
        Some("recommend") => Command::Recommend,
        Some("run") => parse_run(&mut rest)?,
        Some("solve") => Command::Solve(parse_id(&mut rest, "question-id")?),
        Some("submissions") => Command::Submissions,
        Some("delete") => Command::Delete(parse_id(&mut rest, "submission-id")?),
        Some("clear") => Command::Clear,
        Some("add") => Command::Add(parse_add(&mut rest)?),
        Some("seed") => Command::Seed,
        Some(other) => return Err(ArgsError::UnknownCommand(other.to_owned())),
    };
    if let Some(extra) = rest.next() {
        return Err(ArgsError::UnknownArg(extra));
    }

    Ok(Some(Args {
        command,
        api_url,
        token,
    }))
}

fn positional(
    args: &mut impl Iterator<Item = String>,
    name: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingArgument { name })
}

fn parse_id<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    name: &'static str,
) -> Result<T, ArgsError> {
    let raw = positional(args, name)?;
    raw.parse()
        .map_err(|_| ArgsError::InvalidValue { flag: name, raw })
}

fn parse_difficulty<T: std::str::FromStr>(raw: String) -> Result<T, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidValue {
        flag: "--difficulty",
        raw,
    })
}

fn parse_list(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut search = String::new();
    let mut difficulty = DifficultyFilter::Any;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--search" => search = require_value(args, "--search")?,
            "--difficulty" => difficulty = parse_difficulty(require_value(args, "--difficulty")?)?,
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::List { search, difficulty })
}

fn parse_run(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut file = None;
    let mut input = String::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--file" => file = Some(require_value(args, "--file")?),
            "--input" => input = require_value(args, "--input")?,
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::Run { file, input })
}

fn parse_add(args: &mut impl Iterator<Item = String>) -> Result<NewQuestionArgs, ArgsError> {
    let mut title = None;
    let mut description = None;
    let mut difficulty = None;
    let mut tags = String::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--title" => title = Some(require_value(args, "--title")?),
            "--description" => description = Some(require_value(args, "--description")?),
            "--difficulty" => {
                difficulty = Some(parse_difficulty(require_value(args, "--difficulty")?)?);
            }
            "--tags" => tags = require_value(args, "--tags")?,
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(NewQuestionArgs {
        title: title.ok_or(ArgsError::MissingValue { flag: "--title" })?,
        description: description.ok_or(ArgsError::MissingValue {
            flag: "--description",
        })?,
        difficulty: difficulty.ok_or(ArgsError::MissingValue {
            flag: "--difficulty",
        })?,
        tags,
    })
}
