use clap::{Parser, Subcommand};
use dcm_app::{
    AppError, AppResult, CompiledScenario, RunOptions, RunProgressEvent, RunRequest, RunStage,
    TransientProgress, Variable, project_service, query, run_service,
};
use dcm_project::schema::Scenario;
use dcm_sim::{
    PhysicalParameters, SignalKind, SignalParameters, SimOptions, SimProgress, SimulationWindow,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dcm-cli")]
#[command(about = "DC motor transient simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and values
    Validate {
        /// Path to the scenario file (YAML or JSON)
        scenario_path: PathBuf,
    },
    /// Write a default scenario file
    Init {
        /// Destination path (.yaml or .json)
        scenario_path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Run a scenario and cache the result next to it
    Run {
        /// Path to the scenario file (YAML or JSON)
        scenario_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// Run a one-off simulation from command-line parameters
    Simulate(SimulateArgs),
    /// List cached runs for a scenario
    Runs {
        /// Path to the scenario file
        scenario_path: PathBuf,
    },
    /// Show details of a cached run
    ShowRun {
        /// Path to the scenario file
        scenario_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
    /// Export time series data from a run
    ExportSeries {
        /// Path to the scenario file
        scenario_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Variable name (u, i, theta, omega)
        variable: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct SimulateArgs {
    /// Armature resistance R (ohm)
    #[arg(long, default_value_t = 1.0)]
    resistance: f64,
    /// Armature inductance L (H)
    #[arg(long, default_value_t = 1.0)]
    inductance: f64,
    /// Torque constant Kt (N m/A)
    #[arg(long, default_value_t = 1.0)]
    kt: f64,
    /// Back-EMF constant Ke (V s/rad)
    #[arg(long, default_value_t = 1.0)]
    ke: f64,
    /// Rotor inertia J (kg m^2)
    #[arg(long, default_value_t = 1.0)]
    inertia: f64,
    /// Shaft stiffness k (N m/rad)
    #[arg(long, default_value_t = 100.0)]
    stiffness: f64,
    /// Input waveform: rectangular, triangular or sinusoidal
    #[arg(long, default_value = "rectangular")]
    signal: String,
    /// Input amplitude (V)
    #[arg(long, default_value_t = 1.0)]
    amplitude: f64,
    /// Input period (s)
    #[arg(long, default_value_t = 1.0)]
    period: f64,
    /// End time (s)
    #[arg(long, default_value_t = 10.0)]
    t_end: f64,
    /// Time step (s)
    #[arg(long, default_value_t = 1e-3)]
    dt: f64,
    /// Upper bound on grid points
    #[arg(long, default_value_t = 1_000_000)]
    max_steps: usize,
    /// Keep every N-th grid point
    #[arg(long, default_value_t = 1)]
    record_every: usize,
    /// Write the trace as CSV to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl SimulateArgs {
    fn compile(&self) -> AppResult<CompiledScenario> {
        let kind: SignalKind = self.signal.parse()?;
        let params = PhysicalParameters {
            resistance: self.resistance,
            inductance: self.inductance,
            torque_constant: self.kt,
            back_emf_constant: self.ke,
            inertia: self.inertia,
            stiffness: self.stiffness,
        };
        Ok(CompiledScenario {
            params,
            signal: SignalParameters::new(kind, self.amplitude, self.period),
            window: SimulationWindow::new(self.t_end, self.dt),
            options: SimOptions {
                max_steps: self.max_steps,
                record_every: self.record_every,
            },
        })
    }
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Init {
            scenario_path,
            force,
        } => cmd_init(&scenario_path, force),
        Commands::Run {
            scenario_path,
            no_cache,
        } => cmd_run(&scenario_path, !no_cache),
        Commands::Simulate(args) => cmd_simulate(&args),
        Commands::Runs { scenario_path } => cmd_runs(&scenario_path),
        Commands::ShowRun {
            scenario_path,
            run_id,
        } => cmd_show_run(&scenario_path, &run_id),
        Commands::ExportSeries {
            scenario_path,
            run_id,
            variable,
            output,
        } => cmd_export_series(&scenario_path, &run_id, &variable, output.as_deref()),
    }
}

fn cmd_validate(scenario_path: &Path) -> AppResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = project_service::load_scenario(scenario_path)?;
    project_service::compile_scenario(&scenario)?;
    println!("✓ Scenario is valid");
    Ok(())
}

fn cmd_init(scenario_path: &Path, force: bool) -> AppResult<()> {
    if scenario_path.exists() && !force {
        return Err(AppError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            scenario_path.display()
        )));
    }
    project_service::save_scenario(scenario_path, &Scenario::default())?;
    println!("✓ Wrote default scenario to {}", scenario_path.display());
    Ok(())
}

fn cmd_run(scenario_path: &Path, use_cache: bool) -> AppResult<()> {
    println!("Running scenario: {}", scenario_path.display());

    let request = RunRequest {
        scenario_path,
        options: RunOptions {
            use_cache,
            ..RunOptions::default()
        },
    };

    let mut last_emit = Instant::now();
    let mut last_fraction = -1.0f64;
    let response = run_service::ensure_run_with_progress(
        &request,
        Some(&mut |event| {
            let fraction = event
                .transient
                .as_ref()
                .map(|t| t.fraction_complete)
                .unwrap_or(-1.0);
            let emit_now = (fraction >= 0.0 && (fraction - last_fraction).abs() >= 0.005)
                || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                if fraction >= 0.0 {
                    last_fraction = fraction;
                }
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Simulation completed: {}", response.run_id);
    }
    if let Some(t) = response.diverged_at {
        warn!(run_id = %response.run_id, t, "stored trace holds non-finite values");
        println!("! Trace diverged at t = {:.4} s; try a smaller dt", t);
    }
    info!(
        run_id = %response.run_id,
        cached = response.loaded_from_cache,
        total_s = response.timing.total_time_s,
        "run finished"
    );

    print_timing_summary(&response.timing);

    let (_manifest, records) = run_service::load_run(scenario_path, &response.run_id)?;
    print_summary(&query::get_run_summary(&records)?);

    Ok(())
}

fn cmd_simulate(args: &SimulateArgs) -> AppResult<()> {
    let compiled = args.compile()?;

    // Without --output the CSV goes to stdout, so nothing else is printed
    let Some(path) = &args.output else {
        let result = run_service::run_direct(&compiled, None)?;
        let records = run_service::records_from_result(&result);
        print!("{}", query::records_to_csv(&records));
        return Ok(());
    };

    println!(
        "Simulating {} input: A = {} V, period = {} s, dt = {} s, t_end = {} s",
        compiled.signal.kind,
        compiled.signal.amplitude,
        compiled.signal.period,
        compiled.window.dt,
        compiled.window.t_end
    );

    let started = Instant::now();
    let mut last_emit = Instant::now();
    let result = run_service::run_direct(
        &compiled,
        Some(&mut |p: SimProgress| {
            if last_emit.elapsed().as_millis() >= 100 || p.step == p.total_steps {
                render_cli_progress(&RunProgressEvent {
                    stage: RunStage::RunningTransient,
                    elapsed_wall_s: started.elapsed().as_secs_f64(),
                    message: None,
                    transient: Some(TransientProgress {
                        sim_time_s: p.t,
                        t_end_s: compiled.window.t_end,
                        fraction_complete: p.fraction_complete(),
                        step: p.step,
                        total_steps: p.total_steps,
                    }),
                });
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    let records = run_service::records_from_result(&result);
    println!(
        "✓ Simulation completed in {:.3}s",
        started.elapsed().as_secs_f64()
    );
    print_summary(&query::get_run_summary(&records)?);

    std::fs::write(path, query::records_to_csv(&records))?;
    info!(records = records.len(), path = %path.display(), "trace exported");
    println!("✓ Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (event.stage, &event.transient) {
        (RunStage::RunningTransient, Some(t)) => {
            let width = 28usize;
            let filled = ((t.fraction_complete * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] {:>6.2}%  t={:.3}/{:.3}s  step={}/{}  elapsed={:.1}s",
                bar,
                t.fraction_complete * 100.0,
                t.sim_time_s,
                t.t_end_s,
                t.step,
                t.total_steps,
                event.elapsed_wall_s
            );
            let _ = io::stdout().flush();
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
            let _ = io::stdout().flush();
        }
    }
}

fn print_timing_summary(timing: &dcm_app::RunTimingSummary) {
    let total = timing.total_time_s.max(1.0e-12);
    let compile_pct = 100.0 * timing.compile_time_s / total;
    let solve_pct = 100.0 * timing.solve_time_s / total;
    let save_pct = 100.0 * timing.save_time_s / total;

    println!("\nTiming summary:");
    println!(
        "  Compile: {:.3}s ({:.1}%)",
        timing.compile_time_s, compile_pct
    );
    println!("  Solve:   {:.3}s ({:.1}%)", timing.solve_time_s, solve_pct);
    println!("  Save:    {:.3}s ({:.1}%)", timing.save_time_s, save_pct);
    if timing.load_cache_time_s > 0.0 {
        println!("  Cache load: {:.3}s", timing.load_cache_time_s);
    }
    println!("  Total:   {:.3}s", timing.total_time_s);
    println!("  Steps:   {}", timing.steps);
    println!("  Records: {}", timing.record_count);
}

fn print_summary(summary: &query::RunSummary) {
    println!("\nRun Summary:");
    println!("  Time points: {}", summary.record_count);
    println!(
        "  Time range: {:.3} - {:.3} s",
        summary.time_range.0, summary.time_range.1
    );
    println!("  Peak |i|: {:.4} A", summary.peak_current_a);
    println!("  Peak |omega|: {:.4} rad/s", summary.peak_omega_rad_s);
    let last = &summary.final_record;
    println!(
        "  Final: i = {:.4} A, theta = {:.4} rad, omega = {:.4} rad/s",
        last.i_a, last.theta_rad, last.omega_rad_s
    );
    if !summary.all_finite {
        println!("  ! Trace contains non-finite values");
    }
}

fn cmd_runs(scenario_path: &Path) -> AppResult<()> {
    let runs = run_service::list_runs(scenario_path)?;

    if runs.is_empty() {
        println!("No cached runs found for: {}", scenario_path.display());
    } else {
        println!("Cached runs for '{}':", scenario_path.display());
        for manifest in runs {
            println!(
                "  {} ({}, {} input, dt={} s, t_end={} s)",
                manifest.run_id,
                manifest.timestamp,
                manifest.signal_kind,
                manifest.dt_s,
                manifest.t_end_s
            );
        }
    }
    Ok(())
}

fn cmd_show_run(scenario_path: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, records) = run_service::load_run(scenario_path, run_id)?;
    println!("  Scenario: {}", manifest.scenario_name);
    println!("  Created: {}", manifest.timestamp);
    println!("  Signal: {}", manifest.signal_kind);
    println!("  Steps: {}", manifest.steps);
    println!("  Solver: {}", manifest.solver_version);

    print_summary(&query::get_run_summary(&records)?);
    Ok(())
}

fn cmd_export_series(
    scenario_path: &Path,
    run_id: &str,
    variable: &str,
    output: Option<&Path>,
) -> AppResult<()> {
    let variable: Variable = variable.parse()?;
    let (_manifest, records) = run_service::load_run(scenario_path, run_id)?;

    let series = query::extract_series(&records, variable);
    let csv = query::series_to_csv(&series, variable);

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        info!(
            run_id,
            variable = variable.column(),
            points = series.len(),
            path = %path.display(),
            "series exported"
        );
        println!(
            "✓ Exported {} data points to {}",
            series.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }

    Ok(())
}
