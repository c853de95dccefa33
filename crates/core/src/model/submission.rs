use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{QuestionId, SubmissionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubmissionError {
    #[error("unknown submission status: {0}")]
    UnknownStatus(String),
}

/// Status recorded in the ledger for one attempt at a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Attempted,
    Solved,
}

impl SubmissionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Attempted => "attempted",
            SubmissionStatus::Solved => "solved",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = SubmissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attempted" => Ok(SubmissionStatus::Attempted),
            "solved" => Ok(SubmissionStatus::Solved),
            _ => Err(SubmissionError::UnknownStatus(s.to_owned())),
        }
    }
}

/// One entry of the append-only submission ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    id: SubmissionId,
    question_id: QuestionId,
    status: SubmissionStatus,
    submitted_at: DateTime<Utc>,
}

impl Submission {
    #[must_use]
    pub fn new(
        id: SubmissionId,
        question_id: QuestionId,
        status: SubmissionStatus,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            question_id,
            status,
            submitted_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> SubmissionId {
        self.id
    }

    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    #[must_use]
    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.status == SubmissionStatus::Solved
    }

    /// Ordering key used to decide which submission is the latest for a question.
    #[must_use]
    pub fn recency_key(&self) -> (DateTime<Utc>, SubmissionId) {
        (self.submitted_at, self.id)
    }
}
