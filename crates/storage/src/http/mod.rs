use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use practice_core::model::{
    AuthToken, CodeRun, LearnerId, Question, QuestionDraft, Recommendation, RunOutput, Submission,
    SubmissionId,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::repository::{
    Backend, CodeRunner, NewSubmission, QuestionDirectory, RemoteError, SubmissionLedger,
};

mod mapping;

use mapping::{ErrorBody, QuestionRow, RecommendationRow, SubmissionRow};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HttpInitError {
    #[error("invalid base url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("base url must be http or https: {0}")]
    UnsupportedScheme(String),
    #[error(transparent)]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl HttpConfig {
    /// # Errors
    ///
    /// Returns `HttpInitError` if `base_url` does not parse or is not http(s).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, HttpInitError> {
        let mut base_url = Url::parse(base_url.trim())?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(HttpInitError::UnsupportedScheme(base_url.scheme().to_owned()));
        }
        // `Url::join` replaces the last segment unless the path ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url, timeout })
    }
}

/// Directory and ledger client speaking JSON over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns `HttpInitError` if the HTTP client cannot be built.
    pub fn connect(config: HttpConfig) -> Result<Self, HttpInitError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        self.base_url
            .join(path)
            .map_err(|e| RemoteError::Connection(e.to_string()))
    }

    fn authorized(request: RequestBuilder, token: Option<&AuthToken>) -> RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        tracing::warn!(url = %response.url(), %status, "remote call rejected");
        if status == StatusCode::BAD_REQUEST {
            if let Ok(ErrorBody { error }) = response.json::<ErrorBody>().await {
                return Err(RemoteError::Rejected(error));
            }
        }
        Err(status_error(status))
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        let response = self.send(request).await?;
        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                RemoteError::Serialization(e.to_string())
            } else {
                transport(e)
            }
        })
    }
}

fn transport(e: reqwest::Error) -> RemoteError {
    RemoteError::Connection(e.to_string())
}

fn status_error(status: StatusCode) -> RemoteError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Unauthorized,
        StatusCode::NOT_FOUND => RemoteError::NotFound,
        StatusCode::CONFLICT => RemoteError::Conflict,
        other => RemoteError::Status(other.as_u16()),
    }
}

#[async_trait]
impl QuestionDirectory for HttpBackend {
    async fn list_questions(&self) -> Result<Vec<Question>, RemoteError> {
        let url = self.endpoint("questions/")?;
        tracing::debug!(%url, "listing questions");
        let rows: Vec<QuestionRow> = self.fetch(self.client.get(url)).await?;
        mapping::map_question_rows(rows)
    }

    async fn search_questions(&self, query: &str) -> Result<Vec<Question>, RemoteError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.endpoint("questions/search")?;
        let rows: Vec<QuestionRow> = self
            .fetch(self.client.get(url).query(&[("q", query)]))
            .await?;
        mapping::map_question_rows(rows)
    }

    async fn create_question(
        &self,
        token: Option<&AuthToken>,
        draft: &QuestionDraft,
    ) -> Result<Question, RemoteError> {
        let url = self.endpoint("questions/")?;
        let request = self.client.post(url).json(&mapping::question_body(draft));
        let row: QuestionRow = self.fetch(Self::authorized(request, token)).await?;
        mapping::map_question_row(row)
    }

    async fn recommend_questions(
        &self,
        learner: Option<LearnerId>,
    ) -> Result<Vec<Recommendation>, RemoteError> {
        let url = self.endpoint("recommendations/")?;
        let mut request = self.client.get(url);
        if let Some(learner) = learner {
            request = request.query(&[("user_id", learner.value())]);
        }
        let rows: Vec<RecommendationRow> = self.fetch(request).await?;
        mapping::map_recommendation_rows(rows)
    }
}

#[async_trait]
impl CodeRunner for HttpBackend {
    async fn execute(
        &self,
        token: Option<&AuthToken>,
        run: &CodeRun,
    ) -> Result<RunOutput, RemoteError> {
        let url = self.endpoint("submissions/execute")?;
        tracing::debug!(%url, language = %run.language, bytes = run.code.len(), "executing code");
        let request = self.client.post(url).json(&mapping::run_body(run));
        self.fetch(Self::authorized(request, token)).await
    }
}

#[async_trait]
impl SubmissionLedger for HttpBackend {
    async fn record_submission(
        &self,
        token: Option<&AuthToken>,
        submission: NewSubmission,
    ) -> Result<Submission, RemoteError> {
        let url = self.endpoint("submissions/record")?;
        tracing::debug!(
            %url,
            question_id = submission.question_id.value(),
            status = submission.status.as_str(),
            "recording submission"
        );
        let request = self
            .client
            .post(url)
            .json(&mapping::submission_body(submission));
        let row: SubmissionRow = self.fetch(Self::authorized(request, token)).await?;
        mapping::map_submission_row(row)
    }

    async fn list_submissions(
        &self,
        token: Option<&AuthToken>,
        learner: LearnerId,
    ) -> Result<Vec<Submission>, RemoteError> {
        let url = self.endpoint(&format!("submissions/user/{learner}"))?;
        let request = Self::authorized(self.client.get(url), token);
        let rows: Vec<SubmissionRow> = self.fetch(request).await?;
        mapping::map_submission_rows(rows)
    }

    async fn delete_submission(
        &self,
        token: Option<&AuthToken>,
        id: SubmissionId,
    ) -> Result<(), RemoteError> {
        let url = self.endpoint(&format!("submissions/{id}"))?;
        self.send(Self::authorized(self.client.delete(url), token))
            .await
            .map(drop)
    }

    async fn delete_all_submissions(
        &self,
        token: Option<&AuthToken>,
        learner: LearnerId,
    ) -> Result<(), RemoteError> {
        let url = self.endpoint(&format!("submissions/user/{learner}"))?;
        self.send(Self::authorized(self.client.delete(url), token))
            .await
            .map(drop)
    }
}

impl Backend {
    /// Build a `Backend` talking to the remote directory, ledger and sandbox.
    ///
    /// # Errors
    ///
    /// Returns `HttpInitError` if the HTTP client cannot be built.
    pub fn http(config: HttpConfig) -> Result<Self, HttpInitError> {
        let remote = HttpBackend::connect(config)?;
        let questions: Arc<dyn QuestionDirectory> = Arc::new(remote.clone());
        let submissions: Arc<dyn SubmissionLedger> = Arc::new(remote.clone());
        let runner: Arc<dyn CodeRunner> = Arc::new(remote);
        Ok(Self {
            questions,
            submissions,
            runner,
        })
    }
}
