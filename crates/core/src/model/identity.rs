use std::fmt;

use crate::model::ids::LearnerId;

/// Bearer credential issued by the auth service.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wraps a raw token, returning `None` for blank input.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens never show up in logs.
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

/// Identity the engine acts on behalf of.
///
/// Passed explicitly into every engine operation. An anonymous context has no
/// learner; solved-state tracking and submission recording are inert for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LearnerContext {
    learner: Option<LearnerId>,
    token: Option<AuthToken>,
}

impl LearnerContext {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new(learner: Option<LearnerId>, token: Option<AuthToken>) -> Self {
        Self { learner, token }
    }

    /// Context for a known learner without a bearer token (tests, local tools).
    #[must_use]
    pub fn for_learner(learner: LearnerId) -> Self {
        Self {
            learner: Some(learner),
            token: None,
        }
    }

    #[must_use]
    pub fn learner(&self) -> Option<LearnerId> {
        self.learner
    }

    #[must_use]
    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.learner.is_none()
    }
}
