//! Periodic input voltage generators.
//!
//! All waveforms are pure functions of time. The period must be strictly
//! positive and finite for every kind, including the sinusoid.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use dcm_core::units::{Time, Voltage};
use dcm_core::{ensure_finite, ensure_positive};
use uom::si::electric_potential::volt;
use uom::si::time::second;

use crate::error::{SimError, SimResult};

/// Waveform selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// Square pulse train, on for the first half of each period.
    #[default]
    Rectangular,
    /// Symmetric triangle rising from 0 to the amplitude at mid-period.
    Triangular,
    /// Zero-offset sine wave.
    Sinusoidal,
}

impl SignalKind {
    pub const ALL: [SignalKind; 3] = [
        SignalKind::Rectangular,
        SignalKind::Triangular,
        SignalKind::Sinusoidal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Rectangular => "rectangular",
            SignalKind::Triangular => "triangular",
            SignalKind::Sinusoidal => "sinusoidal",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rectangular" | "pulse" | "square" => Ok(SignalKind::Rectangular),
            "triangular" | "triangle" => Ok(SignalKind::Triangular),
            "sinusoidal" | "sine" | "sin" => Ok(SignalKind::Sinusoidal),
            other => Err(SimError::invalid(format!(
                "unrecognized signal kind '{other}' (expected rectangular, triangular or sinusoidal)"
            ))),
        }
    }
}

/// Input waveform description as supplied by a caller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SignalParameters {
    pub kind: SignalKind,
    /// Peak value (V)
    pub amplitude: f64,
    /// Period (s)
    pub period: f64,
}

impl Default for SignalParameters {
    fn default() -> Self {
        Self {
            kind: SignalKind::Rectangular,
            amplitude: 1.0,
            period: 1.0,
        }
    }
}

impl SignalParameters {
    pub fn new(kind: SignalKind, amplitude: f64, period: f64) -> Self {
        Self {
            kind,
            amplitude,
            period,
        }
    }

    /// Build from typed SI quantities, validating them.
    pub fn from_quantities(kind: SignalKind, amplitude: Voltage, period: Time) -> SimResult<Self> {
        let params = Self::new(kind, amplitude.get::<volt>(), period.get::<second>());
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> SimResult<()> {
        ensure_finite(self.amplitude, "signal amplitude")?;
        ensure_positive(self.period, "signal period")?;
        Ok(())
    }

    /// Validate and bind the parameters into an evaluable waveform.
    pub fn build(&self) -> SimResult<Signal> {
        self.validate()?;
        let (amplitude, period) = (self.amplitude, self.period);
        Ok(match self.kind {
            SignalKind::Rectangular => Signal::Rectangular { amplitude, period },
            SignalKind::Triangular => Signal::Triangular { amplitude, period },
            SignalKind::Sinusoidal => Signal::Sinusoidal { amplitude, period },
        })
    }
}

/// A validated waveform bound to its amplitude and period.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Signal {
    Rectangular { amplitude: f64, period: f64 },
    Triangular { amplitude: f64, period: f64 },
    Sinusoidal { amplitude: f64, period: f64 },
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::Rectangular { .. } => SignalKind::Rectangular,
            Signal::Triangular { .. } => SignalKind::Triangular,
            Signal::Sinusoidal { .. } => SignalKind::Sinusoidal,
        }
    }

    /// Instantaneous value at time `t` (s).
    pub fn evaluate(&self, t: f64) -> f64 {
        match *self {
            Signal::Rectangular { amplitude, period } => {
                // half-open "on" interval [0, period/2)
                if t.rem_euclid(period) < period / 2.0 {
                    amplitude
                } else {
                    0.0
                }
            }
            Signal::Triangular { amplitude, period } => {
                let half = period / 2.0;
                amplitude * (1.0 - (t.rem_euclid(period) - half).abs() / half)
            }
            Signal::Sinusoidal { amplitude, period } => amplitude * (2.0 * PI * t / period).sin(),
        }
    }
}

/// Evaluate a waveform of the given kind at time `t`.
///
/// # Errors
/// Returns [`SimError::InvalidParameter`] when `period` is not strictly
/// positive or either parameter is non-finite.
pub fn signal(t: f64, amplitude: f64, period: f64, kind: SignalKind) -> SimResult<f64> {
    let sig = SignalParameters::new(kind, amplitude, period).build()?;
    Ok(sig.evaluate(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < TOL
    }

    #[test]
    fn rectangular_half_open_interval() {
        let k = SignalKind::Rectangular;
        assert_eq!(signal(0.0, 10.0, 2.0, k).unwrap(), 10.0);
        assert_eq!(signal(0.5, 10.0, 2.0, k).unwrap(), 10.0);
        assert_eq!(signal(1.0, 10.0, 2.0, k).unwrap(), 0.0);
        assert_eq!(signal(1.5, 10.0, 2.0, k).unwrap(), 0.0);
        assert_eq!(signal(2.0, 10.0, 2.0, k).unwrap(), 10.0);
    }

    #[test]
    fn triangular_reference_points() {
        let k = SignalKind::Triangular;
        assert!(close(signal(0.0, 10.0, 2.0, k).unwrap(), 0.0));
        assert!(close(signal(0.5, 10.0, 2.0, k).unwrap(), 5.0));
        assert!(close(signal(1.0, 10.0, 2.0, k).unwrap(), 10.0));
        assert!(close(signal(1.5, 10.0, 2.0, k).unwrap(), 5.0));
        assert!(close(signal(2.0, 10.0, 2.0, k).unwrap(), 0.0));
    }

    #[test]
    fn sinusoidal_reference_points() {
        let k = SignalKind::Sinusoidal;
        assert!(close(signal(0.0, 10.0, 1.0, k).unwrap(), 0.0));
        assert!(close(signal(0.25, 10.0, 1.0, k).unwrap(), 10.0));
        assert!(signal(0.5, 10.0, 1.0, k).unwrap().abs() < 1e-9);
        assert!(close(signal(0.75, 10.0, 1.0, k).unwrap(), -10.0));
    }

    #[test]
    fn zero_or_negative_period_rejected() {
        for kind in SignalKind::ALL {
            assert!(matches!(
                signal(0.1, 1.0, 0.0, kind),
                Err(SimError::InvalidParameter { .. })
            ));
            assert!(signal(0.1, 1.0, -1.0, kind).is_err());
            assert!(signal(0.1, 1.0, f64::NAN, kind).is_err());
        }
    }

    #[test]
    fn non_finite_amplitude_rejected() {
        assert!(signal(0.0, f64::INFINITY, 1.0, SignalKind::Triangular).is_err());
    }

    #[test]
    fn kind_parsing() {
        assert_eq!("Rectangular".parse::<SignalKind>(), Ok(SignalKind::Rectangular));
        assert_eq!(" triangle ".parse::<SignalKind>(), Ok(SignalKind::Triangular));
        assert_eq!("sine".parse::<SignalKind>(), Ok(SignalKind::Sinusoidal));
        let err = "sawtooth".parse::<SignalKind>().unwrap_err();
        assert!(err.to_string().contains("sawtooth"));
    }

    #[test]
    fn kind_display_round_trips() {
        for kind in SignalKind::ALL {
            assert_eq!(kind.to_string().parse::<SignalKind>(), Ok(kind));
        }
    }

    #[test]
    fn from_quantities_validates_period() {
        use dcm_core::units::{s, volt};
        let p = SignalParameters::from_quantities(SignalKind::Triangular, volt(12.0), s(0.5))
            .unwrap();
        assert_eq!(p, SignalParameters::new(SignalKind::Triangular, 12.0, 0.5));
        assert!(
            SignalParameters::from_quantities(SignalKind::Sinusoidal, volt(1.0), s(0.0)).is_err()
        );
    }

    #[test]
    fn from_quantities_converts_to_volts_and_seconds() {
        use dcm_core::units::{Time, Voltage};
        use uom::si::electric_potential::millivolt;
        use uom::si::time::millisecond;
        let p = SignalParameters::from_quantities(
            SignalKind::Rectangular,
            Voltage::new::<millivolt>(500.0),
            Time::new::<millisecond>(250.0),
        )
        .unwrap();
        assert!((p.amplitude - 0.5).abs() < 1e-12);
        assert!((p.period - 0.25).abs() < 1e-12);
    }

    #[test]
    fn built_signal_reports_kind() {
        let sig = SignalParameters::new(SignalKind::Sinusoidal, 2.0, 0.5)
            .build()
            .unwrap();
        assert_eq!(sig.kind(), SignalKind::Sinusoidal);
    }
}
