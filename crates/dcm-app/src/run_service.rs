//! Run execution and caching service.

use std::path::Path;
use std::time::Instant;

use dcm_results::{RunManifest, RunStore, TimeseriesRecord};
use dcm_sim::{SimProgress, SimulationResult};
use tracing::{info, warn};

use crate::error::AppResult;
use crate::progress::{RunProgressEvent, RunStage, TransientProgress};
use crate::project_service::{self, CompiledScenario};

/// Version tag folded into every run ID.
pub const SOLVER_VERSION: &str = "euler-0.1.0";

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub solver_version: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            solver_version: SOLVER_VERSION.to_string(),
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub scenario_path: &'a Path,
    pub options: RunOptions,
}

/// Concise timing and execution summary for a run.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub compile_time_s: f64,
    pub solve_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
    pub steps: usize,
    pub record_count: usize,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub timing: RunTimingSummary,
    /// Time of the first non-finite sample, if the run diverged.
    pub diverged_at: Option<f64>,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
    transient: Option<TransientProgress>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent {
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
            transient,
        });
    }
}

/// Execute or load a run based on request.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    ensure_run_with_progress(request, None)
}

/// Execute or load a run and stream progress events.
pub fn ensure_run_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    emit_progress(
        &mut progress_cb,
        RunStage::LoadingScenario,
        started,
        Some("Loading scenario".to_string()),
        None,
    );
    let scenario = project_service::load_scenario(request.scenario_path)?;

    emit_progress(
        &mut progress_cb,
        RunStage::CheckingCache,
        started,
        Some("Checking run cache".to_string()),
        None,
    );
    let run_id = dcm_results::compute_run_id(&scenario, &request.options.solver_version);
    let store = RunStore::for_scenario(request.scenario_path)?;

    if request.options.use_cache && store.has_run(&run_id) {
        emit_progress(
            &mut progress_cb,
            RunStage::LoadingCachedResult,
            started,
            Some("Loading cached run".to_string()),
            None,
        );

        let load_started = Instant::now();
        let manifest = store.load_manifest(&run_id)?;
        timing.load_cache_time_s = load_started.elapsed().as_secs_f64();
        timing.steps = manifest.steps;
        timing.record_count = manifest.record_count;
        timing.total_time_s = started.elapsed().as_secs_f64();

        emit_progress(
            &mut progress_cb,
            RunStage::Completed,
            started,
            Some("Loaded cached run".to_string()),
            None,
        );
        info!(run_id = %run_id, "loaded cached run");

        let diverged_at = manifest.diverged_at;
        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
            timing,
            diverged_at,
        });
    }

    emit_progress(
        &mut progress_cb,
        RunStage::Compiling,
        started,
        Some("Compiling scenario".to_string()),
        None,
    );
    let compile_started = Instant::now();
    let compiled = project_service::compile_scenario(&scenario)?;
    timing.compile_time_s = compile_started.elapsed().as_secs_f64();

    let t_end_s = compiled.window.t_end;
    emit_progress(
        &mut progress_cb,
        RunStage::RunningTransient,
        started,
        Some("Running transient simulation".to_string()),
        Some(TransientProgress {
            t_end_s,
            ..TransientProgress::default()
        }),
    );

    let solve_started = Instant::now();
    let result = run_direct(
        &compiled,
        Some(&mut |p: SimProgress| {
            emit_progress(
                &mut progress_cb,
                RunStage::RunningTransient,
                started,
                Some(format!(
                    "Step {}/{} | t={:.4}/{:.4} s",
                    p.step, p.total_steps, p.t, t_end_s
                )),
                Some(TransientProgress {
                    sim_time_s: p.t,
                    t_end_s,
                    fraction_complete: p.fraction_complete(),
                    step: p.step,
                    total_steps: p.total_steps,
                }),
            )
        }),
    )?;
    timing.solve_time_s = solve_started.elapsed().as_secs_f64();

    let diverged_at = result.first_non_finite().map(|idx| result.t[idx]);
    if let Some(t) = diverged_at {
        warn!(run_id = %run_id, t, "run diverged; trace holds non-finite values");
    }

    emit_progress(
        &mut progress_cb,
        RunStage::SavingResults,
        started,
        Some("Saving results".to_string()),
        None,
    );
    let save_started = Instant::now();
    let records = records_from_result(&result);
    let manifest = RunManifest {
        run_id: run_id.clone(),
        scenario_name: scenario.name.clone(),
        timestamp: RunManifest::now_timestamp(),
        signal_kind: compiled.signal.kind.to_string(),
        dt_s: compiled.window.dt,
        t_end_s,
        steps: compiled.window.step_count(),
        record_count: records.len(),
        diverged_at,
        solver_version: request.options.solver_version.clone(),
    };
    store.save_run(&manifest, &records)?;
    timing.save_time_s = save_started.elapsed().as_secs_f64();
    timing.steps = manifest.steps;
    timing.record_count = manifest.record_count;
    timing.total_time_s = started.elapsed().as_secs_f64();

    emit_progress(
        &mut progress_cb,
        RunStage::Completed,
        started,
        Some("Run complete".to_string()),
        None,
    );
    info!(
        run_id = %run_id,
        steps = manifest.steps,
        records = manifest.record_count,
        solve_s = timing.solve_time_s,
        "run complete"
    );

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        timing,
        diverged_at,
    })
}

/// Run a compiled scenario in memory, without touching the run store.
pub fn run_direct(
    compiled: &CompiledScenario,
    progress: Option<&mut dyn FnMut(SimProgress)>,
) -> AppResult<SimulationResult> {
    let result = dcm_sim::run_with_progress(
        &compiled.params,
        &compiled.signal,
        &compiled.window,
        &compiled.options,
        progress,
    )?;
    Ok(result)
}

/// Flatten a simulation trace into storable records.
pub fn records_from_result(result: &SimulationResult) -> Vec<TimeseriesRecord> {
    result
        .samples()
        .map(|(t, u, x)| TimeseriesRecord {
            time_s: t,
            u_v: u,
            i_a: x.current,
            theta_rad: x.theta,
            omega_rad_s: x.omega,
        })
        .collect()
}

/// List cached runs stored next to a scenario, newest first.
pub fn list_runs(scenario_path: &Path) -> AppResult<Vec<RunManifest>> {
    let store = RunStore::for_scenario(scenario_path)?;
    Ok(store.list_runs()?)
}

/// Load a cached run's manifest and timeseries.
pub fn load_run(
    scenario_path: &Path,
    run_id: &str,
) -> AppResult<(RunManifest, Vec<TimeseriesRecord>)> {
    let store = RunStore::for_scenario(scenario_path)?;
    let manifest = store.load_manifest(run_id)?;
    let records = store.load_timeseries(run_id)?;
    Ok((manifest, records))
}
