mod curve;

pub use curve::{CurveConstants, CurveKind, CurveSamples, CurveStandard, SAMPLE_RATIOS};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{InputError, Result};

/// Settings of a time-overcurrent element plus the fault to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OvercurrentSettings {
    /// Pickup current `I0` in amperes.
    pub pickup: Option<f64>,
    pub curve: CurveKind,
    /// Time multiplier (dial) `M`.
    pub time_dial: f64,
    /// Minimum operating time in milliseconds.
    #[serde(default)]
    pub min_time_ms: f64,
    /// Fault current `I` in amperes. Takes precedence over `factor`.
    #[serde(default)]
    pub fault_current: Option<f64>,
    /// Fault current as a multiple of pickup.
    #[serde(default)]
    pub factor: Option<f64>,
}

/// Result of a time-overcurrent evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OvercurrentResult {
    /// `I / I0` actually used.
    pub factor: f64,
    /// Operating time in seconds; infinite if the element does not trip.
    pub trip_time: f64,
    pub curve: CurveSamples,
    pub equation: String,
}

impl OvercurrentResult {
    #[must_use]
    pub fn trips(&self) -> bool {
        self.trip_time.is_finite()
    }
}

/// Evaluates a time-overcurrent element.
pub struct OvercurrentCalc {
    settings: OvercurrentSettings,
}

impl OvercurrentCalc {
    /// Creates a new `OvercurrentCalc`.
    #[must_use]
    pub fn new(settings: OvercurrentSettings) -> Self {
        Self { settings }
    }

    /// Computes the operating time and samples the curve.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Missing`] if the pickup is absent or zero, or if
    /// neither a fault current nor a factor is given, and
    /// [`InputError::Invalid`] for a negative pickup.
    pub fn execute(&self) -> Result<OvercurrentResult> {
        let s = &self.settings;
        let pickup = nonzero(s.pickup).ok_or(InputError::Missing("pickup current"))?;
        if pickup < 0.0 {
            return Err(InputError::Invalid(format!("pickup current must be positive, got {pickup}")).into());
        }

        let current = nonzero(s.fault_current)
            .or_else(|| nonzero(s.factor).map(|factor| factor * pickup))
            .ok_or(InputError::Missing("fault current or factor"))?;

        let trip_time = s.curve.operate_time(s.time_dial, current, pickup, s.min_time_ms);
        debug!(curve = %s.curve, current, pickup, trip_time, "overcurrent evaluated");

        Ok(OvercurrentResult {
            factor: current / pickup,
            trip_time,
            curve: s.curve.sample(s.time_dial, pickup, s.min_time_ms),
            equation: s.curve.equation(s.time_dial),
        })
    }
}

fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.abs() > 0.0 && v.is_finite())
}
