//! Simulation runner and result recording.

use tracing::{debug, warn};

use dcm_core::ensure_positive;
use dcm_core::units::Time;
use uom::si::time::second;

use crate::error::{SimError, SimResult};
use crate::integrator::{ForwardEuler, Integrator};
use crate::model::TransientModel;
use crate::motor::{DcMotorModel, MotorState, PhysicalParameters};
use crate::signal::SignalParameters;

/// Slack (in units of steps) absorbing round-off in `t_end / dt`.
const STEP_GUARD: f64 = 1e-9;

/// Time horizon and fixed step of a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationWindow {
    /// Final simulation time (seconds)
    pub t_end: f64,
    /// Fixed time step (seconds)
    pub dt: f64,
}

impl Default for SimulationWindow {
    fn default() -> Self {
        Self {
            t_end: 10.0,
            dt: 1e-3,
        }
    }
}

impl SimulationWindow {
    /// Start of every run (seconds).
    pub const T_START: f64 = 0.0;

    pub fn new(t_end: f64, dt: f64) -> Self {
        Self { t_end, dt }
    }

    /// Build from typed times, validating them.
    pub fn from_quantities(t_end: Time, dt: Time) -> SimResult<Self> {
        let window = Self::new(t_end.get::<second>(), dt.get::<second>());
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(self.dt, "time step dt")?;
        // t_start is pinned at 0, so a positive t_end is after it
        ensure_positive(self.t_end, "end time t_end")?;
        Ok(())
    }

    /// Number of grid points `floor((t_end - t_start) / dt) + 1`.
    ///
    /// Only meaningful for a validated window.
    pub fn step_count(&self) -> usize {
        self.step_count_f64() as usize
    }

    fn step_count_f64(&self) -> f64 {
        ((self.t_end - Self::T_START) / self.dt + STEP_GUARD).floor() + 1.0
    }

    /// Time of grid point `n`.
    pub fn time_at(&self, n: usize) -> f64 {
        Self::T_START + n as f64 * self.dt
    }
}

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Maximum number of grid points (safety limit)
    pub max_steps: usize,
    /// Record every N-th grid point (decimation)
    pub record_every: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            max_steps: 1_000_000,
            record_every: 1,
        }
    }
}

impl SimOptions {
    pub fn validate(&self) -> SimResult<()> {
        if self.max_steps == 0 {
            return Err(SimError::invalid("max_steps must be positive"));
        }
        if self.record_every == 0 {
            return Err(SimError::invalid("record_every must be positive"));
        }
        Ok(())
    }
}

/// Progress snapshot streamed while integrating.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimProgress {
    /// Grid points completed so far
    pub step: usize,
    pub total_steps: usize,
    /// Simulation time of the last completed point (seconds)
    pub t: f64,
}

impl SimProgress {
    pub fn fraction_complete(&self) -> f64 {
        if self.total_steps == 0 {
            1.0
        } else {
            self.step as f64 / self.total_steps as f64
        }
    }
}

/// Raw record of an integration: grid times, inputs and state snapshots.
#[derive(Clone, Debug)]
pub struct SimRecord<S> {
    /// Time points (seconds)
    pub t: Vec<f64>,
    /// Input applied at each time point
    pub u: Vec<f64>,
    /// State at the start of each step
    pub x: Vec<S>,
}

impl<S> SimRecord<S> {
    fn with_capacity(n: usize) -> Self {
        Self {
            t: Vec::with_capacity(n),
            u: Vec::with_capacity(n),
            x: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, t: f64, u: f64, x: S) {
        self.t.push(t);
        self.u.push(u);
        self.x.push(x);
    }
}

/// Integrate `model` over the window grid from `initial`.
///
/// At each grid time the input is sampled, the state recorded, and then
/// advanced by one integrator step, so entry `n` of the record holds the
/// state that produced step `n`.
pub fn integrate<M: TransientModel, I: Integrator>(
    model: &M,
    integrator: &I,
    initial: M::State,
    window: &SimulationWindow,
    opts: &SimOptions,
    mut progress: Option<&mut dyn FnMut(SimProgress)>,
) -> SimResult<SimRecord<M::State>> {
    window.validate()?;
    opts.validate()?;
    let total = checked_step_count(window, opts)?;

    let recorded = total.div_ceil(opts.record_every) + 1;
    let mut record = SimRecord::with_capacity(recorded.min(total));
    let report_every = (total / 100).max(1);

    let mut x = initial;
    for n in 0..total {
        let t = window.time_at(n);
        let u = model.input(t);
        let next = integrator.step(model, &x, u, window.dt);

        // Always record final point
        if n % opts.record_every == 0 || n + 1 == total {
            record.push(t, u, x);
        }
        x = next;

        if let Some(cb) = progress.as_deref_mut() {
            if (n + 1) % report_every == 0 || n + 1 == total {
                cb(SimProgress {
                    step: n + 1,
                    total_steps: total,
                    t,
                });
            }
        }
    }

    Ok(record)
}

fn checked_step_count(window: &SimulationWindow, opts: &SimOptions) -> SimResult<usize> {
    let count = window.step_count_f64();
    if !count.is_finite() || count > opts.max_steps as f64 {
        return Err(SimError::invalid(format!(
            "step count {count} exceeds the limit of {} (t_end = {}, dt = {})",
            opts.max_steps, window.t_end, window.dt
        )));
    }
    Ok(count as usize)
}

/// Index-aligned time series of a motor run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationResult {
    /// Time points (s)
    pub t: Vec<f64>,
    /// Input voltage (V)
    pub u: Vec<f64>,
    /// Armature current (A)
    pub current: Vec<f64>,
    /// Angular displacement (rad)
    pub theta: Vec<f64>,
    /// Angular velocity (rad/s)
    pub omega: Vec<f64>,
}

impl SimulationResult {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// State recorded at index `n`.
    pub fn state(&self, n: usize) -> Option<MotorState> {
        Some(MotorState {
            current: *self.current.get(n)?,
            theta: *self.theta.get(n)?,
            omega: *self.omega.get(n)?,
        })
    }

    /// Iterate `(t, u, state)` samples in time order.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64, MotorState)> + '_ {
        (0..self.len()).map(move |n| {
            (
                self.t[n],
                self.u[n],
                MotorState {
                    current: self.current[n],
                    theta: self.theta[n],
                    omega: self.omega[n],
                },
            )
        })
    }

    /// Index of the first sample carrying NaN or infinity, if any.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.samples()
            .position(|(_, u, x)| !u.is_finite() || !x.is_finite())
    }
}

impl From<SimRecord<MotorState>> for SimulationResult {
    fn from(record: SimRecord<MotorState>) -> Self {
        let n = record.x.len();
        let mut current = Vec::with_capacity(n);
        let mut theta = Vec::with_capacity(n);
        let mut omega = Vec::with_capacity(n);
        for x in &record.x {
            current.push(x.current);
            theta.push(x.theta);
            omega.push(x.omega);
        }
        Self {
            t: record.t,
            u: record.u,
            current,
            theta,
            omega,
        }
    }
}

/// Run the motor from rest under the given input with default options.
pub fn run(
    params: &PhysicalParameters,
    signal: &SignalParameters,
    window: &SimulationWindow,
) -> SimResult<SimulationResult> {
    run_with_progress(params, signal, window, &SimOptions::default(), None)
}

/// Run the motor from rest with explicit options.
pub fn run_with_options(
    params: &PhysicalParameters,
    signal: &SignalParameters,
    window: &SimulationWindow,
    opts: &SimOptions,
) -> SimResult<SimulationResult> {
    run_with_progress(params, signal, window, opts, None)
}

/// Run the motor from rest, streaming progress to `progress`.
///
/// Every parameter is validated before the first step; an invalid input
/// never yields a partial trace.
pub fn run_with_progress(
    params: &PhysicalParameters,
    signal: &SignalParameters,
    window: &SimulationWindow,
    opts: &SimOptions,
    progress: Option<&mut dyn FnMut(SimProgress)>,
) -> SimResult<SimulationResult> {
    params.validate()?;
    window.validate()?;
    opts.validate()?;
    let steps = checked_step_count(window, opts)?;
    let model = DcMotorModel::new(*params, signal.build()?)?;

    debug!(
        kind = %model.signal().kind(),
        steps,
        dt = window.dt,
        t_end = window.t_end,
        tau_e = model.params().electrical_time_constant(),
        "starting motor simulation"
    );

    let record = integrate(
        &model,
        &ForwardEuler,
        model.initial_state(),
        window,
        opts,
        progress,
    )?;
    let result = SimulationResult::from(record);

    if let Some(idx) = result.first_non_finite() {
        warn!(
            index = idx,
            t = result.t[idx],
            "trace diverged to non-finite values; consider a smaller dt"
        );
    }

    Ok(result)
}
