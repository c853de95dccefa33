mod catalog;
mod editor;
mod identity;
mod ids;
mod question;
mod run;
mod solved;
mod submission;

pub use catalog::{CatalogError, QuestionCatalog};
pub use editor::{EditorBuffer, starter_code};
pub use identity::{AuthToken, LearnerContext};
pub use ids::{LearnerId, ParseIdError, QuestionId, SubmissionId};
pub use question::{
    Difficulty, MIN_TITLE_LEN, Question, QuestionDraft, QuestionError, Recommendation, join_tags,
    parse_tags,
};
pub use run::{CodeRun, DEFAULT_LANGUAGE, RunOutput};
pub use solved::SolvedSet;
pub use submission::{Submission, SubmissionError, SubmissionStatus};
