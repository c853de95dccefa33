use std::sync::Arc;

use practice_core::model::{CodeRun, LearnerContext, RunOutput};
use storage::repository::CodeRunner;

use crate::error::RunError;

/// Sends editor content to the remote sandbox.
#[derive(Clone)]
pub struct CodeRunService {
    runner: Arc<dyn CodeRunner>,
}

impl CodeRunService {
    #[must_use]
    pub fn new(runner: Arc<dyn CodeRunner>) -> Self {
        Self { runner }
    }

    /// Run `run` and return what the program printed.
    ///
    /// A non-zero exit is a successful call; inspect `RunOutput::succeeded`.
    ///
    /// # Errors
    ///
    /// Returns `RunError::EmptyCode` for blank code without a remote call, and
    /// `RunError::Remote` when the sandbox refuses or cannot be reached.
    pub async fn run(&self, ctx: &LearnerContext, run: &CodeRun) -> Result<RunOutput, RunError> {
        if run.is_blank() {
            return Err(RunError::EmptyCode);
        }
        let output = self.runner.execute(ctx.token(), run).await.inspect_err(|err| {
            tracing::warn!(error = %err, "code run failed");
        })?;
        tracing::debug!(exit_code = output.exit_code, "code run finished");
        Ok(output)
    }
}
