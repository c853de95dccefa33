mod engine;
mod snapshot;

pub use engine::PracticeEngine;
pub use snapshot::{PracticeSnapshot, SolveOutcome, SyncOutcome};
