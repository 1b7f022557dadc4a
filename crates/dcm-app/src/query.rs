//! Query helpers for extracting data from loaded runs.

use std::fmt::Write as _;
use std::str::FromStr;

use dcm_results::TimeseriesRecord;

use crate::error::{AppError, AppResult};

/// Summary of a run's time range and data.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub record_count: usize,
    /// Largest |i| over finite samples (A)
    pub peak_current_a: f64,
    /// Largest |ω| over finite samples (rad/s)
    pub peak_omega_rad_s: f64,
    pub final_record: TimeseriesRecord,
    pub all_finite: bool,
}

/// Get run summary from timeseries records.
pub fn get_run_summary(records: &[TimeseriesRecord]) -> AppResult<RunSummary> {
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return Err(AppError::InvalidInput("No records in run".to_string()));
    };

    let peak = |f: fn(&TimeseriesRecord) -> f64| {
        records
            .iter()
            .map(f)
            .filter(|v| v.is_finite())
            .fold(0.0_f64, |acc, v| acc.max(v.abs()))
    };

    let all_finite = records.iter().all(|r| {
        [r.u_v, r.i_a, r.theta_rad, r.omega_rad_s]
            .iter()
            .all(|v| v.is_finite())
    });

    Ok(RunSummary {
        time_range: (first.time_s, last.time_s),
        record_count: records.len(),
        peak_current_a: peak(|r| r.i_a),
        peak_omega_rad_s: peak(|r| r.omega_rad_s),
        final_record: *last,
        all_finite,
    })
}

/// Recorded quantity of a motor run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
    Voltage,
    Current,
    Angle,
    Velocity,
}

impl Variable {
    pub fn column(&self) -> &'static str {
        match self {
            Variable::Voltage => "u_v",
            Variable::Current => "i_a",
            Variable::Angle => "theta_rad",
            Variable::Velocity => "omega_rad_s",
        }
    }

    fn value(&self, record: &TimeseriesRecord) -> f64 {
        match self {
            Variable::Voltage => record.u_v,
            Variable::Current => record.i_a,
            Variable::Angle => record.theta_rad,
            Variable::Velocity => record.omega_rad_s,
        }
    }
}

impl FromStr for Variable {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "u" | "u_v" | "voltage" => Ok(Variable::Voltage),
            "i" | "i_a" | "current" => Ok(Variable::Current),
            "theta" | "theta_rad" | "angle" => Ok(Variable::Angle),
            "omega" | "omega_rad_s" | "velocity" => Ok(Variable::Velocity),
            _ => Err(AppError::InvalidInput(format!("Unknown variable: {}", s))),
        }
    }
}

/// Extract `(time, value)` pairs for one variable.
pub fn extract_series(records: &[TimeseriesRecord], variable: Variable) -> Vec<(f64, f64)> {
    records
        .iter()
        .map(|r| (r.time_s, variable.value(r)))
        .collect()
}

/// Render a two-column series as CSV.
pub fn series_to_csv(series: &[(f64, f64)], variable: Variable) -> String {
    let mut csv = format!("time_s,{}\n", variable.column());
    for (t, v) in series {
        let _ = writeln!(csv, "{},{}", t, v);
    }
    csv
}

/// Render every recorded column as CSV.
pub fn records_to_csv(records: &[TimeseriesRecord]) -> String {
    let mut csv = String::from("time_s,u_v,i_a,theta_rad,omega_rad_s\n");
    for r in records {
        let _ = writeln!(
            csv,
            "{},{},{},{},{}",
            r.time_s, r.u_v, r.i_a, r.theta_rad, r.omega_rad_s
        );
    }
    csv
}
