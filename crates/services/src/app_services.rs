use std::sync::Arc;

use practice_core::model::LearnerContext;
use storage::repository::Backend;

use crate::catalog_service::CatalogService;
use crate::code_runner::CodeRunService;
use crate::config::PracticeConfig;
use crate::error::AppServicesError;
use crate::identity::resolve_context;
use crate::practice::PracticeEngine;
use crate::submission_recorder::SubmissionRecorder;

/// Assembles app-facing services and resolves the session identity.
#[derive(Clone)]
pub struct AppServices {
    context: LearnerContext,
    catalog: Arc<CatalogService>,
    recorder: Arc<SubmissionRecorder>,
    runner: Arc<CodeRunService>,
    engine: Arc<PracticeEngine>,
}

impl AppServices {
    /// Build services backed by the remote HTTP API.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the HTTP client cannot be built.
    pub fn from_config(config: PracticeConfig) -> Result<Self, AppServicesError> {
        let context = resolve_context(config.token);
        let backend = Backend::http(config.http)?;
        tracing::debug!(learner = ?context.learner(), "services configured");
        Ok(Self::new(&backend, context))
    }

    #[must_use]
    pub fn new(backend: &Backend, context: LearnerContext) -> Self {
        let catalog = CatalogService::new(Arc::clone(&backend.questions));
        let recorder = SubmissionRecorder::new(Arc::clone(&backend.submissions));
        let engine = Arc::new(PracticeEngine::new(catalog.clone(), recorder.clone()));
        Self {
            context,
            catalog: Arc::new(catalog),
            recorder: Arc::new(recorder),
            runner: Arc::new(CodeRunService::new(Arc::clone(&backend.runner))),
            engine,
        }
    }

    #[must_use]
    pub fn context(&self) -> &LearnerContext {
        &self.context
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn recorder(&self) -> Arc<SubmissionRecorder> {
        Arc::clone(&self.recorder)
    }

    #[must_use]
    pub fn runner(&self) -> Arc<CodeRunService> {
        Arc::clone(&self.runner)
    }

    #[must_use]
    pub fn engine(&self) -> Arc<PracticeEngine> {
        Arc::clone(&self.engine)
    }
}
