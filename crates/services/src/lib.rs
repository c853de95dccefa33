#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod code_runner;
pub mod config;
pub mod error;
pub mod identity;
pub mod practice;
pub mod submission_recorder;

pub use app_services::AppServices;
pub use catalog_service::CatalogService;
pub use code_runner::CodeRunService;
pub use config::PracticeConfig;
pub use error::{
    AppServicesError, CatalogServiceError, ConfigError, FetchError, RecordError, RunError,
};
pub use practice::{PracticeEngine, PracticeSnapshot, SolveOutcome, SyncOutcome};
pub use submission_recorder::SubmissionRecorder;
