//! Scenario loading, saving, validation, and compilation.

use std::path::Path;

use dcm_core::units::{henry, kgm2, ohm, s, volt};
use dcm_project::schema::{Scenario, SignalKindDef};
use dcm_project::ProjectError;
use dcm_sim::{PhysicalParameters, SignalKind, SignalParameters, SimOptions, SimulationWindow};

use crate::error::{AppError, AppResult};

/// Scenario resolved into validated simulation inputs.
#[derive(Debug, Clone)]
pub struct CompiledScenario {
    pub params: PhysicalParameters,
    pub signal: SignalParameters,
    pub window: SimulationWindow,
    pub options: SimOptions,
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Load a scenario from YAML or JSON (chosen by extension).
pub fn load_scenario(path: &Path) -> AppResult<Scenario> {
    dcm_project::load_any(path).map_err(|e| match e {
        ProjectError::Io(source) => AppError::ScenarioFileRead {
            path: path.to_path_buf(),
            source,
        },
        other => other.into(),
    })
}

/// Save a scenario, writing JSON for `.json` paths and YAML otherwise.
pub fn save_scenario(path: &Path, scenario: &Scenario) -> AppResult<()> {
    let saved = if is_json(path) {
        dcm_project::save_json(path, scenario)
    } else {
        dcm_project::save_yaml(path, scenario)
    };

    saved.map_err(|e| match e {
        ProjectError::Io(source) => AppError::ScenarioFileWrite {
            path: path.to_path_buf(),
            source,
        },
        other => other.into(),
    })
}

/// Validate scenario structure and values.
pub fn validate_scenario(scenario: &Scenario) -> AppResult<()> {
    dcm_project::validate_scenario(scenario)?;
    Ok(())
}

pub fn signal_kind(def: SignalKindDef) -> SignalKind {
    match def {
        SignalKindDef::Rectangular => SignalKind::Rectangular,
        SignalKindDef::Triangular => SignalKind::Triangular,
        SignalKindDef::Sinusoidal => SignalKind::Sinusoidal,
    }
}

/// Turn a scenario into simulation inputs, validating each piece.
pub fn compile_scenario(scenario: &Scenario) -> AppResult<CompiledScenario> {
    validate_scenario(scenario)?;

    let motor = &scenario.motor;
    let params = PhysicalParameters::from_quantities(
        ohm(motor.resistance_ohm),
        henry(motor.inductance_h),
        motor.torque_constant_nm_per_a,
        motor.back_emf_constant_v_s_per_rad,
        kgm2(motor.inertia_kg_m2),
        motor.stiffness_nm_per_rad,
    )?;

    let signal = SignalParameters::from_quantities(
        signal_kind(scenario.signal.kind),
        volt(scenario.signal.amplitude_v),
        s(scenario.signal.period_s),
    )?;

    let window =
        SimulationWindow::from_quantities(s(scenario.window.t_end_s), s(scenario.window.dt_s))?;

    let mut options = SimOptions {
        record_every: scenario.window.record_every,
        ..SimOptions::default()
    };
    if let Some(max_steps) = scenario.window.max_steps {
        options.max_steps = max_steps;
    }
    options.validate()?;

    Ok(CompiledScenario {
        params,
        signal,
        window,
        options,
    })
}
