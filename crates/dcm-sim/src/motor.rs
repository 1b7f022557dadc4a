//! Armature circuit coupled to a rotor through an elastic shaft.

use dcm_core::units::{Inductance, Inertia, Resistance};
use dcm_core::{ensure_finite, ensure_positive};
use uom::si::electrical_resistance::ohm;
use uom::si::inductance::henry;
use uom::si::moment_of_inertia::kilogram_square_meter;

use crate::error::SimResult;
use crate::model::TransientModel;
use crate::signal::Signal;

/// Lumped electromechanical parameters of the motor.
///
/// Models the coupled electrical and mechanical dynamics:
///
/// ```text
/// L * di/dt = u - R*i - Ke*ω
///     dθ/dt = ω
/// J * dω/dt = Kt*i - k*θ
/// ```
///
/// `R`, `L` and `J` must be strictly positive. `Kt`, `Ke` and `k` may be
/// zero (decoupled) or negative (inverted coupling).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicalParameters {
    /// Armature resistance R (Ω)
    pub resistance: f64,
    /// Armature inductance L (H)
    pub inductance: f64,
    /// Torque constant Kt (N·m/A)
    pub torque_constant: f64,
    /// Back-EMF constant Ke (V·s/rad)
    pub back_emf_constant: f64,
    /// Rotor moment of inertia J (kg·m²)
    pub inertia: f64,
    /// Shaft stiffness k (N·m/rad)
    pub stiffness: f64,
}

impl Default for PhysicalParameters {
    fn default() -> Self {
        Self {
            resistance: 1.0,
            inductance: 1.0,
            torque_constant: 1.0,
            back_emf_constant: 1.0,
            inertia: 1.0,
            stiffness: 100.0,
        }
    }
}

impl PhysicalParameters {
    /// Build from typed SI quantities.
    ///
    /// # Errors
    /// Returns error if parameters are non-physical.
    pub fn from_quantities(
        resistance: Resistance,
        inductance: Inductance,
        torque_constant: f64,
        back_emf_constant: f64,
        inertia: Inertia,
        stiffness: f64,
    ) -> SimResult<Self> {
        let params = Self {
            resistance: resistance.get::<ohm>(),
            inductance: inductance.get::<henry>(),
            torque_constant,
            back_emf_constant,
            inertia: inertia.get::<kilogram_square_meter>(),
            stiffness,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(self.resistance, "resistance R")?;
        ensure_positive(self.inductance, "inductance L")?;
        ensure_positive(self.inertia, "rotor inertia J")?;
        ensure_finite(self.torque_constant, "torque constant Kt")?;
        ensure_finite(self.back_emf_constant, "back-EMF constant Ke")?;
        ensure_finite(self.stiffness, "shaft stiffness k")?;
        Ok(())
    }

    /// Electrical time constant L/R (s).
    pub fn electrical_time_constant(&self) -> f64 {
        self.inductance / self.resistance
    }

    /// Compute derivative of the motor state under input voltage `u`.
    pub fn derivative(&self, state: &MotorState, u: f64) -> MotorState {
        let di_dt = (u - self.resistance * state.current - self.back_emf_constant * state.omega)
            / self.inductance;
        let dtheta_dt = state.omega;
        let domega_dt =
            (self.torque_constant * state.current - self.stiffness * state.theta) / self.inertia;

        MotorState {
            current: di_dt,
            theta: dtheta_dt,
            omega: domega_dt,
        }
    }
}

/// State of the motor: (i, θ, ω).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotorState {
    /// Armature current (A)
    pub current: f64,
    /// Shaft angular displacement (rad)
    pub theta: f64,
    /// Shaft angular velocity (rad/s)
    pub omega: f64,
}

impl MotorState {
    pub fn is_finite(&self) -> bool {
        self.current.is_finite() && self.theta.is_finite() && self.omega.is_finite()
    }
}

/// State derivative `(di/dt, dθ/dt, dω/dt)` for the given state and input.
pub fn derivative(state: &MotorState, u: f64, params: &PhysicalParameters) -> MotorState {
    params.derivative(state, u)
}

/// Motor driven by a bound input waveform, starting at rest.
#[derive(Clone, Debug)]
pub struct DcMotorModel {
    params: PhysicalParameters,
    signal: Signal,
}

impl DcMotorModel {
    pub fn new(params: PhysicalParameters, signal: Signal) -> SimResult<Self> {
        params.validate()?;
        Ok(Self { params, signal })
    }

    pub fn params(&self) -> &PhysicalParameters {
        &self.params
    }

    pub fn signal(&self) -> &Signal {
        &self.signal
    }
}

impl TransientModel for DcMotorModel {
    type State = MotorState;

    fn initial_state(&self) -> MotorState {
        MotorState::default()
    }

    fn input(&self, t: f64) -> f64 {
        self.signal.evaluate(t)
    }

    fn rhs(&self, x: &MotorState, u: f64) -> MotorState {
        self.params.derivative(x, u)
    }

    fn add(&self, a: &MotorState, b: &MotorState) -> MotorState {
        MotorState {
            current: a.current + b.current,
            theta: a.theta + b.theta,
            omega: a.omega + b.omega,
        }
    }

    fn scale(&self, a: &MotorState, scale: f64) -> MotorState {
        MotorState {
            current: a.current * scale,
            theta: a.theta * scale,
            omega: a.omega * scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use dcm_core::units::{henry, kgm2, ohm};

    fn bench_motor() -> PhysicalParameters {
        PhysicalParameters {
            resistance: 2.0,
            inductance: 0.5,
            torque_constant: 0.1,
            back_emf_constant: 0.1,
            inertia: 0.02,
            stiffness: 0.1,
        }
    }

    #[test]
    fn default_parameters_are_valid() {
        assert!(PhysicalParameters::default().validate().is_ok());
    }

    #[test]
    fn derivative_at_rest_is_input_over_inductance() {
        let p = bench_motor();
        let d = derivative(&MotorState::default(), 10.0, &p);
        assert!((d.current - 20.0).abs() < 1e-12);
        assert_eq!(d.theta, 0.0);
        assert_eq!(d.omega, 0.0);
    }

    #[test]
    fn derivative_hand_computed() {
        let p = bench_motor();
        let x = MotorState {
            current: 1.0,
            theta: 0.5,
            omega: 2.0,
        };
        let d = p.derivative(&x, 4.0);

        // (4 - 2*1 - 0.1*2) / 0.5 = 3.6
        assert!((d.current - 3.6).abs() < 1e-12);
        assert_eq!(d.theta, 2.0);
        // (0.1*1 - 0.1*0.5) / 0.02 = 2.5
        assert!((d.omega - 2.5).abs() < 1e-12);
    }

    #[test]
    fn zero_input_at_rest_is_fixed_point() {
        let d = bench_motor().derivative(&MotorState::default(), 0.0);
        assert_eq!(d, MotorState::default());
    }

    #[test]
    fn zero_couplings_are_accepted() {
        let p = PhysicalParameters {
            torque_constant: 0.0,
            back_emf_constant: 0.0,
            stiffness: -1.0,
            ..bench_motor()
        };
        assert!(p.validate().is_ok());
    }

    #[test]
    fn non_positive_r_l_j_rejected() {
        let base = bench_motor();
        let cases = [
            PhysicalParameters {
                resistance: 0.0,
                ..base
            },
            PhysicalParameters {
                inductance: 0.0,
                ..base
            },
            PhysicalParameters {
                inductance: -0.5,
                ..base
            },
            PhysicalParameters {
                inertia: 0.0,
                ..base
            },
            PhysicalParameters {
                stiffness: f64::NAN,
                ..base
            },
        ];
        for p in cases {
            assert!(matches!(
                p.validate(),
                Err(SimError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn from_quantities_uses_si_values() {
        let p = PhysicalParameters::from_quantities(
            ohm(2.0),
            henry(0.5),
            0.1,
            0.1,
            kgm2(0.02),
            0.1,
        )
        .unwrap();
        assert_eq!(p, bench_motor());
        assert!((p.electrical_time_constant() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn from_quantities_converts_scaled_units() {
        use dcm_core::units::Inductance;
        use uom::si::inductance::millihenry;
        let p = PhysicalParameters::from_quantities(
            ohm(2.0),
            Inductance::new::<millihenry>(500.0),
            0.1,
            0.1,
            kgm2(0.02),
            0.1,
        )
        .unwrap();
        assert!((p.inductance - 0.5).abs() < 1e-12);
    }

    #[test]
    fn model_exposes_bound_inputs() {
        let signal = crate::signal::SignalParameters::default().build().unwrap();
        let model = DcMotorModel::new(bench_motor(), signal).unwrap();
        assert_eq!(model.params(), &bench_motor());
        assert_eq!(model.signal(), &signal);
        assert_eq!(model.initial_state(), MotorState::default());
        assert!((model.params().electrical_time_constant() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn from_quantities_rejects_zero_inertia() {
        let err = PhysicalParameters::from_quantities(
            ohm(2.0),
            henry(0.5),
            0.1,
            0.1,
            kgm2(0.0),
            0.1,
        )
        .unwrap_err();
        assert!(err.to_string().contains("inertia"));
    }
}
