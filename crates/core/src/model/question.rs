use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Minimum title length accepted by the question directory.
pub const MIN_TITLE_LEN: usize = 5;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question title must be at least {MIN_TITLE_LEN} characters")]
    TitleTooShort,

    #[error("question description cannot be empty")]
    EmptyDescription,

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Difficulty tier of a question.
///
/// Tiers are ordered `Easy < Medium < Hard`; advancement walks them in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// All tiers in advancement order.
    pub const TIERS: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Position of this tier within [`Difficulty::TIERS`].
    #[must_use]
    pub fn tier_index(self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(QuestionError::UnknownDifficulty(s.to_owned())),
        }
    }
}

//
// ─── TAGS ──────────────────────────────────────────────────────────────────────
//

/// Splits a comma-separated tag list into a trimmed, de-duplicated set.
#[must_use]
pub fn parse_tags(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Joins tags back into the comma-separated wire form.
#[must_use]
pub fn join_tags(tags: &BTreeSet<String>) -> String {
    tags.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// A question that has not been assigned an id by the directory yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    title: String,
    description: String,
    difficulty: Difficulty,
    tags: BTreeSet<String>,
}

impl QuestionDraft {
    /// Creates a validated draft.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::TitleTooShort` if the trimmed title is shorter than
    /// [`MIN_TITLE_LEN`], or `QuestionError::EmptyDescription` for a blank description.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        difficulty: Difficulty,
        tags: BTreeSet<String>,
    ) -> Result<Self, QuestionError> {
        let title = title.into().trim().to_owned();
        if title.chars().count() < MIN_TITLE_LEN {
            return Err(QuestionError::TitleTooShort);
        }
        let description = description.into().trim().to_owned();
        if description.is_empty() {
            return Err(QuestionError::EmptyDescription);
        }
        Ok(Self {
            title,
            description,
            difficulty,
            tags,
        })
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Attach the id assigned by the directory.
    #[must_use]
    pub fn into_question(self, id: QuestionId) -> Question {
        Question {
            id,
            title: self.title,
            description: self.description,
            difficulty: self.difficulty,
            tags: self.tags,
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A coding question as published by the question directory.
///
/// Immutable from the engine's point of view; `id` is the join key to submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    title: String,
    description: String,
    difficulty: Difficulty,
    tags: BTreeSet<String>,
}

impl Question {
    /// Builds a question from directory data.
    ///
    /// The directory owns validation of titles and descriptions, so only the
    /// structural fields are required here.
    #[must_use]
    pub fn new(
        id: QuestionId,
        title: impl Into<String>,
        description: impl Into<String>,
        difficulty: Difficulty,
        tags: BTreeSet<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            difficulty,
            tags,
        }
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }
}

/// A question suggested by the directory's recommender.
///
/// Carries only what the recommender sends; look the id up in the catalog for
/// the full question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub id: QuestionId,
    pub title: String,
    pub difficulty: Difficulty,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
