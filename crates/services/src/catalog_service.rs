use std::sync::Arc;

use practice_core::model::{
    LearnerContext, Question, QuestionCatalog, QuestionDraft, Recommendation,
};
use storage::repository::QuestionDirectory;

use crate::error::{CatalogServiceError, FetchError};

/// Reads and extends the question directory.
#[derive(Clone)]
pub struct CatalogService {
    questions: Arc<dyn QuestionDirectory>,
}

impl CatalogService {
    #[must_use]
    pub fn new(questions: Arc<dyn QuestionDirectory>) -> Self {
        Self { questions }
    }

    /// Fetch the full catalog in directory order.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Remote` if the directory is unreachable or sends
    /// malformed rows, and `FetchError::Catalog` if ids repeat.
    pub async fn load(&self) -> Result<QuestionCatalog, FetchError> {
        let questions = self.questions.list_questions().await?;
        let catalog = QuestionCatalog::new(questions)?;
        tracing::debug!(count = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Title suggestions for `query`. Blank queries return nothing without a
    /// remote call.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Remote` if the directory is unreachable.
    pub async fn search(&self, query: &str) -> Result<Vec<Question>, FetchError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.questions.search_questions(query).await?)
    }

    /// Questions the recommender suggests next; personalised when `ctx` has a learner.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Remote` if the recommender is unreachable.
    pub async fn recommend(&self, ctx: &LearnerContext) -> Result<Vec<Recommendation>, FetchError> {
        let picks = self.questions.recommend_questions(ctx.learner()).await?;
        tracing::debug!(learner = ?ctx.learner(), count = picks.len(), "recommendations loaded");
        Ok(picks)
    }

    /// Publish a new question on behalf of `ctx`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Anonymous` without credentials and
    /// `CatalogServiceError::Remote` if the directory rejects the draft.
    pub async fn create(
        &self,
        ctx: &LearnerContext,
        draft: &QuestionDraft,
    ) -> Result<Question, CatalogServiceError> {
        let token = ctx.token().ok_or(CatalogServiceError::Anonymous)?;
        let question = self.questions.create_question(Some(token), draft).await?;
        tracing::info!(
            question_id = question.id().value(),
            difficulty = %question.difficulty(),
            "question created"
        );
        Ok(question)
    }
}
