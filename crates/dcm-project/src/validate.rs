//! Scenario validation logic.

use crate::schema::{MotorDef, Scenario, SignalDef, WindowDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }

    if scenario.name.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "name".to_string(),
            value: format!("{:?}", scenario.name),
            reason: "must not be empty".to_string(),
        });
    }

    validate_motor(&scenario.motor)?;
    validate_signal(&scenario.signal)?;
    validate_window(&scenario.window)?;
    Ok(())
}

fn validate_motor(motor: &MotorDef) -> Result<(), ValidationError> {
    positive("motor.resistance_ohm", motor.resistance_ohm)?;
    positive("motor.inductance_h", motor.inductance_h)?;
    positive("motor.inertia_kg_m2", motor.inertia_kg_m2)?;
    finite("motor.torque_constant_nm_per_a", motor.torque_constant_nm_per_a)?;
    finite(
        "motor.back_emf_constant_v_s_per_rad",
        motor.back_emf_constant_v_s_per_rad,
    )?;
    finite("motor.stiffness_nm_per_rad", motor.stiffness_nm_per_rad)?;
    Ok(())
}

fn validate_signal(signal: &SignalDef) -> Result<(), ValidationError> {
    finite("signal.amplitude_v", signal.amplitude_v)?;
    positive("signal.period_s", signal.period_s)?;
    Ok(())
}

fn validate_window(window: &WindowDef) -> Result<(), ValidationError> {
    positive("window.t_end_s", window.t_end_s)?;
    positive("window.dt_s", window.dt_s)?;
    if window.record_every == 0 {
        return Err(ValidationError::InvalidValue {
            field: "window.record_every".to_string(),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if window.max_steps == Some(0) {
        return Err(ValidationError::InvalidValue {
            field: "window.max_steps".to_string(),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn finite(field: &str, value: f64) -> Result<(), ValidationError> {
    dcm_core::ensure_finite(value, "scenario value")
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be finite".to_string(),
        })
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    dcm_core::ensure_positive(value, "scenario value")
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be positive and finite".to_string(),
        })
}
