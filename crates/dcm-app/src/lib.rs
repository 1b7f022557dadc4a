//! Shared application service layer for the DC motor simulator.
//!
//! This crate provides a unified interface for frontends, centralizing
//! scenario management, compilation to simulation inputs, run execution with
//! caching, and result querying.

pub mod error;
pub mod progress;
pub mod project_service;
pub mod query;
pub mod run_service;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use progress::{RunProgressEvent, RunStage, TransientProgress};
pub use project_service::{
    compile_scenario, load_scenario, save_scenario, validate_scenario, CompiledScenario,
};
pub use query::{
    extract_series, get_run_summary, records_to_csv, series_to_csv, RunSummary, Variable,
};
pub use run_service::{
    ensure_run, ensure_run_with_progress, list_runs, load_run, records_from_result, run_direct,
    RunOptions, RunRequest, RunResponse, RunTimingSummary, SOLVER_VERSION,
};
