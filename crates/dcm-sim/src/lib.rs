//! Time-response simulation of an armature-driven DC motor with an elastic shaft.
//!
//! Provides:
//! - Periodic input voltage generators (rectangular, triangular, sinusoidal)
//! - Three-state electromechanical dynamics (current, shaft angle, angular velocity)
//! - Fixed-step forward Euler integrator
//! - Validated simulation runs producing index-aligned traces

pub mod error;
pub mod integrator;
pub mod model;
pub mod motor;
pub mod signal;
pub mod sim;

// Re-exports for public API
pub use error::{SimError, SimResult};
pub use integrator::{ForwardEuler, Integrator};
pub use model::TransientModel;
pub use motor::{DcMotorModel, MotorState, PhysicalParameters, derivative};
pub use signal::{Signal, SignalKind, SignalParameters, signal};
pub use sim::{
    SimOptions, SimProgress, SimRecord, SimulationResult, SimulationWindow, integrate, run,
    run_with_options, run_with_progress,
};
