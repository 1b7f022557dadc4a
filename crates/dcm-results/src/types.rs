//! Result data types.

use serde::{Deserialize, Deserializer, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    pub scenario_name: String,
    /// RFC 3339 creation time
    pub timestamp: String,
    pub signal_kind: String,
    pub dt_s: f64,
    pub t_end_s: f64,
    /// Grid points integrated (before decimation)
    pub steps: usize,
    /// Records written to the timeseries file
    pub record_count: usize,
    /// Time of the first non-finite sample, if the run diverged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diverged_at: Option<f64>,
    pub solver_version: String,
}

impl RunManifest {
    pub fn now_timestamp() -> String {
        chrono::Utc::now().to_rfc3339()
    }
}

/// One recorded sample of a run.
///
/// JSON has no NaN or infinity; non-finite values of a diverged run are
/// written as `null` and read back as NaN.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimeseriesRecord {
    pub time_s: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub u_v: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub i_a: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub theta_rad: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub omega_rad_s: f64,
}

fn nullable_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}
