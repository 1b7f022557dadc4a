//! Content-based hashing for run IDs.

use dcm_project::schema::Scenario;
use sha2::{Digest, Sha256};

/// Run ID derived from everything that influences the trace.
///
/// The scenario name and description are excluded so renaming a scenario
/// keeps its cached runs.
pub fn compute_run_id(scenario: &Scenario, solver_version: &str) -> String {
    let mut hasher = Sha256::new();

    for part in [
        serde_json::to_string(&scenario.motor),
        serde_json::to_string(&scenario.signal),
        serde_json::to_string(&scenario.window),
    ] {
        hasher.update(part.unwrap_or_default().as_bytes());
    }

    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}
