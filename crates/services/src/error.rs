//! Shared error types for the services crate.

use thiserror::Error;

use practice_core::model::{CatalogError, QuestionError, QuestionId};
use storage::http::HttpInitError;
use storage::repository::RemoteError;

/// Errors emitted while loading the catalog or the learner's submissions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("malformed catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Errors emitted by `SubmissionRecorder` writes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecordError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("question {0} is not in the catalog")]
    UnknownQuestion(QuestionId),
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogServiceError {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error("creating questions requires a signed-in learner")]
    Anonymous,
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Errors emitted by `CodeRunService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError {
    #[error("nothing to run: the editor is empty")]
    EmptyCode,
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Errors emitted while reading configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid {var} value: {raw}")]
    InvalidValue { var: &'static str, raw: String },
    #[error(transparent)]
    Http(#[from] HttpInitError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Http(#[from] HttpInitError),
}
