use serde::{Deserialize, Serialize};

use crate::error::{InputError, Result};
use crate::math::Phasor;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Winding connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connection {
    /// Star.
    #[default]
    #[serde(rename = "Y")]
    Wye,
    #[serde(rename = "D")]
    Delta,
    #[serde(rename = "Z")]
    Zigzag,
}

impl Connection {
    #[must_use]
    pub fn is_wye(self) -> bool {
        self == Self::Wye
    }
}

/// Current-transformer polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Polarity {
    #[default]
    #[serde(alias = "normal")]
    Normal,
    /// Reversed CT ("saliente"); adds 180° to every current.
    #[serde(alias = "Saliente", alias = "inverted")]
    Inverted,
}

impl Polarity {
    #[must_use]
    pub fn offset_deg(self) -> f64 {
        match self {
            Self::Normal => 0.0,
            Self::Inverted => 180.0,
        }
    }
}

/// Clock code of `winding` relative to `reference`, in `0..12`.
///
/// # Errors
///
/// Returns [`InputError::OutOfRange`] if either code exceeds 11.
pub fn relative_clock_code(winding: u8, reference: u8) -> Result<u8> {
    for code in [winding, reference] {
        if code > 11 {
            return Err(InputError::OutOfRange {
                parameter: "clock code",
                value: f64::from(code),
                min: 0.0,
                max: 11.0,
            }
            .into());
        }
    }
    Ok((winding + 12 - reference) % 12)
}

/// Vector-group compensation of a phase triple `(a, b, c)` for clock code
/// `code` (taken mod 12).
///
/// Even codes permute and negate; odd codes take phase differences scaled
/// by `1/√3`. On an ABC set this advances the phasors by `code·30°`; on an
/// ACB set it advances them by `(12 − code)·30°`.
#[must_use]
pub fn clock_shift(code: u8, [a, b, c]: [Phasor; 3]) -> [Phasor; 3] {
    let k = 1.0 / SQRT_3;
    match code % 12 {
        0 => [a, b, c],
        1 => [(a - b) * k, (b - c) * k, (c - a) * k],
        2 => [-b, -c, -a],
        3 => [(c - b) * k, (a - c) * k, (b - a) * k],
        4 => [c, a, b],
        5 => [(c - a) * k, (a - b) * k, (b - c) * k],
        6 => [-a, -b, -c],
        7 => [(b - a) * k, (c - b) * k, (a - c) * k],
        8 => [b, c, a],
        9 => [(b - c) * k, (c - a) * k, (a - b) * k],
        10 => [-c, -a, -b],
        _ => [(a - c) * k, (b - a) * k, (c - b) * k],
    }
}

/// Connection correction constant of a winding against the reference
/// connection: `1/√3` when one side is star and the other is not, else 1.
#[must_use]
pub fn connection_constant(winding: Connection, reference: Connection) -> f64 {
    if winding.is_wye() == reference.is_wye() {
        1.0
    } else {
        1.0 / SQRT_3
    }
}

/// Removes the zero-sequence component (mean of the three phases).
#[must_use]
pub fn remove_zero_sequence(phases: [Phasor; 3]) -> [Phasor; 3] {
    let zero = phases.iter().copied().sum::<Phasor>() * (1.0 / 3.0);
    phases.map(|p| p - zero)
}

/// Winding tap: the given value when `power_mva` is zero, otherwise
/// `power·1000 / (ct_ratio · kV · √3)`.
///
/// # Errors
///
/// Returns [`InputError::Invalid`] if the resulting tap is not a positive
/// finite number (zero CT ratio, zero voltage, or a missing tap).
pub fn winding_tap(power_mva: f64, ct_ratio: f64, kv: f64, tap: f64) -> Result<f64> {
    let value = if power_mva.abs() > 0.0 {
        power_mva * 1000.0 / (ct_ratio * kv * SQRT_3)
    } else {
        tap
    };
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(InputError::Invalid(format!(
            "winding tap must be positive, got {value} (power {power_mva}, ratio {ct_ratio}, {kv} kV)"
        ))
        .into())
    }
}
