//! Scenario schema definitions.
//!
//! Field names carry their SI unit so files stay readable on their own.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub motor: MotorDef,
    pub signal: SignalDef,
    pub window: WindowDef,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            version: crate::LATEST_VERSION,
            name: "Default motor".to_string(),
            description: None,
            motor: MotorDef::default(),
            signal: SignalDef::default(),
            window: WindowDef::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MotorDef {
    pub resistance_ohm: f64,
    pub inductance_h: f64,
    pub torque_constant_nm_per_a: f64,
    pub back_emf_constant_v_s_per_rad: f64,
    pub inertia_kg_m2: f64,
    pub stiffness_nm_per_rad: f64,
}

impl Default for MotorDef {
    fn default() -> Self {
        Self {
            resistance_ohm: 1.0,
            inductance_h: 1.0,
            torque_constant_nm_per_a: 1.0,
            back_emf_constant_v_s_per_rad: 1.0,
            inertia_kg_m2: 1.0,
            stiffness_nm_per_rad: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SignalKindDef {
    #[default]
    Rectangular,
    Triangular,
    Sinusoidal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalDef {
    pub kind: SignalKindDef,
    pub amplitude_v: f64,
    pub period_s: f64,
}

impl Default for SignalDef {
    fn default() -> Self {
        Self {
            kind: SignalKindDef::Rectangular,
            amplitude_v: 1.0,
            period_s: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowDef {
    pub t_end_s: f64,
    #[serde(default = "default_dt_s")]
    pub dt_s: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<usize>,
    #[serde(default = "default_record_every")]
    pub record_every: usize,
}

impl Default for WindowDef {
    fn default() -> Self {
        Self {
            t_end_s: 10.0,
            dt_s: default_dt_s(),
            max_steps: None,
            record_every: default_record_every(),
        }
    }
}

fn default_dt_s() -> f64 {
    1e-3
}

fn default_record_every() -> usize {
    1
}
