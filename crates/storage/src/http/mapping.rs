use chrono::{DateTime, NaiveDateTime, Utc};
use practice_core::model::{
    CodeRun, Difficulty, Question, QuestionDraft, QuestionId, Recommendation, Submission,
    SubmissionId, SubmissionStatus, join_tags, parse_tags,
};
use serde::{Deserialize, Serialize};

use crate::repository::{NewSubmission, RemoteError};

fn ser<E: core::fmt::Display>(e: E) -> RemoteError {
    RemoteError::Serialization(e.to_string())
}

fn missing(field: &'static str) -> RemoteError {
    RemoteError::Serialization(format!("missing {field}"))
}

//
// ─── WIRE SHAPES ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionRow {
    id: Option<u64>,
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    difficulty: Option<String>,
    #[serde(default)]
    tags: Option<String>,
}

/// `user_id` is also sent by the ledger but is implied by the request path.
#[derive(Debug, Deserialize)]
pub(crate) struct SubmissionRow {
    id: Option<u64>,
    question_id: Option<u64>,
    status: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

/// The recommender sends a trimmed-down question.
#[derive(Debug, Deserialize)]
pub(crate) struct RecommendationRow {
    id: Option<u64>,
    title: Option<String>,
    difficulty: Option<String>,
}

/// Error payload of a refused request.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionBody<'a> {
    title: &'a str,
    description: &'a str,
    difficulty: &'static str,
    tags: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionBody {
    user_id: u64,
    question_id: u64,
    status: &'static str,
}

/// The sandbox calls standard input `input`.
#[derive(Debug, Serialize)]
pub(crate) struct RunBody<'a> {
    code: &'a str,
    language: &'a str,
    input: &'a str,
}

//
// ─── MAPPING ───────────────────────────────────────────────────────────────────
//

pub(crate) fn map_question_row(row: QuestionRow) -> Result<Question, RemoteError> {
    let id = row.id.ok_or_else(|| missing("question id"))?;
    let title = row.title.ok_or_else(|| missing("question title"))?;
    let difficulty: Difficulty = row
        .difficulty
        .ok_or_else(|| missing("question difficulty"))?
        .parse()
        .map_err(ser)?;
    Ok(Question::new(
        QuestionId::new(id),
        title,
        row.description.unwrap_or_default(),
        difficulty,
        parse_tags(row.tags.as_deref().unwrap_or_default()),
    ))
}

pub(crate) fn map_question_rows(rows: Vec<QuestionRow>) -> Result<Vec<Question>, RemoteError> {
    rows.into_iter().map(map_question_row).collect()
}

pub(crate) fn map_recommendation_rows(
    rows: Vec<RecommendationRow>,
) -> Result<Vec<Recommendation>, RemoteError> {
    rows.into_iter()
        .map(|row| {
            Ok(Recommendation {
                id: QuestionId::new(row.id.ok_or_else(|| missing("recommendation id"))?),
                title: row.title.ok_or_else(|| missing("recommendation title"))?,
                difficulty: row
                    .difficulty
                    .ok_or_else(|| missing("recommendation difficulty"))?
                    .parse()
                    .map_err(ser)?,
            })
        })
        .collect()
}

pub(crate) fn map_submission_row(row: SubmissionRow) -> Result<Submission, RemoteError> {
    let id = row.id.ok_or_else(|| missing("submission id"))?;
    let question_id = row.question_id.ok_or_else(|| missing("submission question_id"))?;
    let status: SubmissionStatus = row
        .status
        .ok_or_else(|| missing("submission status"))?
        .parse()
        .map_err(ser)?;
    let submitted_at = parse_timestamp(
        row.timestamp
            .as_deref()
            .ok_or_else(|| missing("submission timestamp"))?,
    )?;
    Ok(Submission::new(
        SubmissionId::new(id),
        QuestionId::new(question_id),
        status,
        submitted_at,
    ))
}

pub(crate) fn map_submission_rows(
    rows: Vec<SubmissionRow>,
) -> Result<Vec<Submission>, RemoteError> {
    rows.into_iter().map(map_submission_row).collect()
}

/// RFC 3339, or a naive timestamp taken as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RemoteError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| RemoteError::Serialization(format!("invalid timestamp: {raw}")))
}

pub(crate) fn question_body(draft: &QuestionDraft) -> QuestionBody<'_> {
    QuestionBody {
        title: draft.title(),
        description: draft.description(),
        difficulty: draft.difficulty().as_str(),
        tags: join_tags(draft.tags()),
    }
}

pub(crate) fn run_body(run: &CodeRun) -> RunBody<'_> {
    RunBody {
        code: &run.code,
        language: &run.language,
        input: &run.stdin,
    }
}

pub(crate) fn submission_body(submission: NewSubmission) -> SubmissionBody {
    SubmissionBody {
        user_id: submission.learner.value(),
        question_id: submission.question_id.value(),
        status: submission.status.as_str(),
    }
}
