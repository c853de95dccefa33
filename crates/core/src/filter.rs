//! Text and difficulty filtering over a question catalog.

use std::fmt;
use std::str::FromStr;

use crate::model::{Difficulty, Question, QuestionCatalog, QuestionError};

/// Difficulty constraint of a filter; `Any` places no constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DifficultyFilter {
    #[default]
    Any,
    Only(Difficulty),
}

impl DifficultyFilter {
    #[must_use]
    pub fn matches(self, difficulty: Difficulty) -> bool {
        match self {
            DifficultyFilter::Any => true,
            DifficultyFilter::Only(wanted) => wanted == difficulty,
        }
    }
}

impl From<Option<Difficulty>> for DifficultyFilter {
    fn from(value: Option<Difficulty>) -> Self {
        value.map_or(DifficultyFilter::Any, DifficultyFilter::Only)
    }
}

impl fmt::Display for DifficultyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyFilter::Any => f.write_str("any"),
            DifficultyFilter::Only(difficulty) => write!(f, "{difficulty}"),
        }
    }
}

impl FromStr for DifficultyFilter {
    type Err = QuestionError;

    /// Empty input and `any` mean no constraint.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("any") {
            return Ok(DifficultyFilter::Any);
        }
        trimmed.parse().map(DifficultyFilter::Only)
    }
}

/// Search text plus difficulty constraint applied to the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionFilter {
    text: String,
    difficulty: DifficultyFilter,
}

impl QuestionFilter {
    #[must_use]
    pub fn new(text: impl Into<String>, difficulty: DifficultyFilter) -> Self {
        Self {
            text: text.into(),
            difficulty,
        }
    }

    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn difficulty(&self) -> DifficultyFilter {
        self.difficulty
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: DifficultyFilter) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// True when the question's title contains the search text (ignoring case)
    /// and its difficulty satisfies the constraint.
    #[must_use]
    pub fn matches(&self, question: &Question) -> bool {
        self.predicate()(question)
    }

    /// Matching questions in catalog order.
    #[must_use]
    pub fn apply<'a>(&self, catalog: &'a QuestionCatalog) -> Vec<&'a Question> {
        let matches = self.predicate();
        catalog.iter().filter(|&q| matches(q)).collect()
    }

    /// Lowercases the search text once for every question it is tested against.
    fn predicate(&self) -> impl Fn(&Question) -> bool + '_ {
        let needle = self.text.to_lowercase();
        move |question: &Question| {
            self.difficulty.matches(question.difficulty())
                && question.title().to_lowercase().contains(&needle)
        }
    }
}

/// Free-function form used by derived views.
#[must_use]
pub fn derive_filtered<'a>(
    catalog: &'a QuestionCatalog,
    filter: &QuestionFilter,
) -> Vec<&'a Question> {
    filter.apply(catalog)
}
