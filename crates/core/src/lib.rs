#![forbid(unsafe_code)]

pub mod filter;
pub mod model;
pub mod practice;
pub mod progress;
pub mod selection;
pub mod time;

pub use filter::{DifficultyFilter, QuestionFilter, derive_filtered};
pub use practice::{PracticeState, SolveAdmission};
pub use progress::{ProgressView, derive_progress};
pub use selection::{Selection, SelectionCursor, SelectionError, bootstrap_selection, next_question};
pub use time::Clock;
