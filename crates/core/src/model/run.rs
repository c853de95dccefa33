use serde::{Deserialize, Serialize};

/// Only language the execution sandbox accepts.
pub const DEFAULT_LANGUAGE: &str = "python";

/// Editor content sent to the remote sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeRun {
    pub code: String,
    pub language: String,
    /// Fed to the program's standard input.
    pub stdin: String,
}

impl CodeRun {
    #[must_use]
    pub fn python(code: impl Into<String>, stdin: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: DEFAULT_LANGUAGE.to_owned(),
            stdin: stdin.into(),
        }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.code.trim().is_empty()
    }
}

/// What the sandbox reported back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl RunOutput {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_run_defaults_language() {
        let run = CodeRun::python("print(1)", "");
        assert_eq!(run.language, "python");
        assert!(!run.is_blank());
        assert!(CodeRun::python("  \n", "").is_blank());
    }

    #[test]
    fn nonzero_exit_is_failure() {
        let output = RunOutput {
            stderr: "Traceback".into(),
            exit_code: 1,
            ..RunOutput::default()
        };
        assert!(!output.succeeded());
        assert!(RunOutput::default().succeeded());
    }
}
