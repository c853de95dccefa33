use crate::model::ids::QuestionId;
use crate::model::question::Question;

/// Canonical starter content for a question.
#[must_use]
pub fn starter_code(question: &Question) -> String {
    format!(
        "# {title}\n# Difficulty: {difficulty}\n\ndef solution():\n    # Write your solution here\n    pass\n",
        title = question.title(),
        difficulty = question.difficulty(),
    )
}

/// In-progress editor content for the selected question.
///
/// Every selection resets the buffer to the question's starter content so code
/// written for one problem never leaks into another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorBuffer {
    question_id: Option<QuestionId>,
    code: String,
}

impl EditorBuffer {
    #[must_use]
    pub fn blank() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn starter_for(question: &Question) -> Self {
        Self {
            question_id: Some(question.id()),
            code: starter_code(question),
        }
    }

    #[must_use]
    pub fn question_id(&self) -> Option<QuestionId> {
        self.question_id
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Replace the buffer content; ignored while no question is loaded.
    pub fn edit(&mut self, code: impl Into<String>) -> bool {
        if self.question_id.is_none() {
            return false;
        }
        self.code = code.into();
        true
    }
}
