mod slope;
mod transform;

pub use slope::DualSlope;
pub use transform::{
    clock_shift, connection_constant, relative_clock_code, remove_zero_sequence, winding_tap,
    Connection, Polarity,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Phase;
use crate::error::{InputError, Result};
use crate::math::phasor::{Phasor, PhasorInput};
use crate::math::Point2;

/// How per-winding currents are brought to a common base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RelayModel {
    /// Each winding divided by its own tap.
    #[default]
    #[serde(rename = "TD")]
    TapScaled,
    /// Each winding scaled by its CT ratio relative to the reference, and
    /// the sum divided by the reference tap.
    #[serde(rename = "LD")]
    RatioScaled,
}

/// One transformer winding with its measured currents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindingSettings {
    pub ct_ratio: f64,
    pub kv: f64,
    #[serde(default)]
    pub connection: Connection,
    /// Tap in amperes; used when the transformer power is zero.
    #[serde(default)]
    pub tap: f64,
    #[serde(default)]
    pub polarity: Polarity,
    #[serde(default)]
    pub homopolar_filter: bool,
    /// Vector-group clock code, 0 to 11.
    #[serde(default)]
    pub clock_code: u8,
    /// `Ia`, `Ib`, `Ic`.
    pub currents: [PhasorInput; 3],
}

/// Differential element settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferentialSettings {
    #[serde(default)]
    pub model: RelayModel,
    /// Transformer power in MVA; zero means taps are given per winding.
    #[serde(default)]
    pub power_mva: f64,
    /// Reference winding, 1-based.
    #[serde(default = "default_reference")]
    pub reference: u8,
    /// Number of windings in use (2 or 3). Extra entries are ignored.
    pub winding_count: u8,
    pub windings: Vec<WindingSettings>,
    #[serde(default)]
    pub slope: DualSlope,
}

fn default_reference() -> u8 {
    1
}

/// Per-winding quantities derived from the settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindingTerms {
    /// Tap in amperes. `None` for a non-reference winding of the
    /// ratio-scaled model whose tap is blank, since that model divides by
    /// the reference tap only.
    pub tap: Option<f64>,
    /// Connection correction constant `C`.
    pub constant: f64,
    /// Clock code relative to the reference winding.
    pub relative_code: u8,
    /// Scale applied to the winding's compensated currents.
    pub factor: f64,
}

/// Differential and restraint currents of one phase, in multiples of tap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseDifferential {
    pub phase: Phase,
    pub differential: f64,
    pub restraint: f64,
    /// Whether the point lies above the dual-slope curve.
    pub operates: bool,
}

/// Result of a differential evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferentialResult {
    pub windings: Vec<WindingTerms>,
    pub phases: [PhaseDifferential; 3],
    /// Dual-slope curve corners up to 1.2× the larger of the highest
    /// restraint and 10.
    pub curve: Vec<Point2>,
}

/// Runs the differential transform pipeline.
pub struct DifferentialCalc {
    settings: DifferentialSettings,
}

impl DifferentialCalc {
    /// Creates a new `DifferentialCalc`.
    #[must_use]
    pub fn new(settings: DifferentialSettings) -> Self {
        Self { settings }
    }

    /// Computes taps, connection constants, and per-phase differential and
    /// restraint currents.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::OutOfRange`] for a winding count other than 2
    /// or 3, a reference outside the windings in use, or a clock code above
    /// 11, and [`InputError::Invalid`] if fewer windings are given than in
    /// use, a CT ratio is not a positive number, or a tap the model needs
    /// cannot be computed.
    pub fn execute(&self) -> Result<DifferentialResult> {
        let windings = self.active_windings()?;
        let reference = &windings[usize::from(self.settings.reference - 1)];

        let terms = self.winding_terms(windings, reference)?;

        let mut diff_sum = [Phasor::ZERO; 3];
        let mut restraint_sum = [0.0; 3];
        for (winding, term) in windings.iter().zip(&terms) {
            let raw = winding
                .currents
                .map(|i| Phasor::from_polar(i.magnitude, i.angle + winding.polarity.offset_deg()));
            let filtered = if winding.homopolar_filter {
                remove_zero_sequence(raw)
            } else {
                raw
            };

            let compensated = clock_shift(term.relative_code, filtered);
            let unfiltered = clock_shift(term.relative_code, raw);
            for phase in Phase::ALL {
                let p = phase.index();
                diff_sum[p] = diff_sum[p] + compensated[p] * term.factor;
                restraint_sum[p] += (unfiltered[p] * term.factor).magnitude();
            }
        }

        let slope = &self.settings.slope;
        let phases = Phase::ALL.map(|phase| {
            let differential = diff_sum[phase.index()].magnitude();
            let restraint = restraint_sum[phase.index()] / 2.0;
            let operates = slope.operates(restraint, differential);
            debug!(?phase, differential, restraint, operates, "phase differential");
            PhaseDifferential {
                phase,
                differential,
                restraint,
                operates,
            }
        });

        let max_restraint = phases.iter().map(|p| p.restraint).fold(10.0, f64::max);
        Ok(DifferentialResult {
            windings: terms,
            phases,
            curve: slope.curve_points(max_restraint * 1.2),
        })
    }

    fn active_windings(&self) -> Result<&[WindingSettings]> {
        let s = &self.settings;
        if !(2..=3).contains(&s.winding_count) {
            return Err(InputError::OutOfRange {
                parameter: "winding count",
                value: f64::from(s.winding_count),
                min: 2.0,
                max: 3.0,
            }
            .into());
        }
        let count = usize::from(s.winding_count);
        if s.windings.len() < count {
            return Err(InputError::Invalid(format!(
                "{} windings in use but only {} given",
                count,
                s.windings.len()
            ))
            .into());
        }
        if !(1..=s.winding_count).contains(&s.reference) {
            return Err(InputError::OutOfRange {
                parameter: "reference winding",
                value: f64::from(s.reference),
                min: 1.0,
                max: f64::from(s.winding_count),
            }
            .into());
        }
        let windings = &s.windings[..count];
        for (index, winding) in windings.iter().enumerate() {
            if !(winding.ct_ratio.is_finite() && winding.ct_ratio > 0.0) {
                return Err(InputError::Invalid(format!(
                    "winding {} CT ratio must be positive, got {}",
                    index + 1,
                    winding.ct_ratio
                ))
                .into());
            }
        }
        Ok(windings)
    }

    fn winding_terms(
        &self,
        windings: &[WindingSettings],
        reference: &WindingSettings,
    ) -> Result<Vec<WindingTerms>> {
        let s = &self.settings;
        let reference_tap = winding_tap(s.power_mva, reference.ct_ratio, reference.kv, reference.tap)?;

        windings
            .iter()
            .enumerate()
            .map(|(index, winding)| {
                let is_reference = index + 1 == usize::from(s.reference);
                let constant = if is_reference {
                    1.0
                } else {
                    connection_constant(winding.connection, reference.connection)
                };
                let relative_code = relative_clock_code(winding.clock_code, reference.clock_code)?;
                let own_tap = winding_tap(s.power_mva, winding.ct_ratio, winding.kv, winding.tap);
                let (tap, factor) = match s.model {
                    RelayModel::TapScaled => {
                        let tap = own_tap?;
                        (Some(tap), constant / tap)
                    }
                    RelayModel::RatioScaled => {
                        let tap = if is_reference { Some(reference_tap) } else { own_tap.ok() };
                        (tap, constant * (winding.ct_ratio / reference.ct_ratio) / reference_tap)
                    }
                };
                debug!(winding = index + 1, ?tap, constant, relative_code, factor, "winding terms");
                Ok(WindingTerms {
                    tap,
                    constant,
                    relative_code,
                    factor,
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::error::RelayError;

    fn balanced(magnitude: f64, offset: f64) -> [PhasorInput; 3] {
        [
            PhasorInput::new(magnitude, offset),
            PhasorInput::new(magnitude, offset - 120.0),
            PhasorInput::new(magnitude, offset + 120.0),
        ]
    }

    fn winding(connection: Connection, clock_code: u8, currents: [PhasorInput; 3]) -> WindingSettings {
        WindingSettings {
            ct_ratio: 80.0,
            kv: 138.0,
            connection,
            tap: 5.0,
            polarity: Polarity::Normal,
            homopolar_filter: false,
            clock_code,
            currents,
        }
    }

    fn settings(windings: Vec<WindingSettings>) -> DifferentialSettings {
        DifferentialSettings {
            model: RelayModel::TapScaled,
            power_mva: 0.0,
            reference: 1,
            winding_count: 2,
            windings,
            slope: DualSlope::default(),
        }
    }

    #[test]
    fn through_current_is_restrained() {
        let s = settings(vec![
            winding(Connection::Wye, 0, balanced(5.0, 0.0)),
            winding(Connection::Wye, 0, balanced(5.0, 180.0)),
        ]);
        let result = DifferentialCalc::new(s).execute().unwrap();
        for phase in &result.phases {
            assert_abs_diff_eq!(phase.differential, 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(phase.restraint, 1.0, epsilon = 1e-12);
            assert!(!phase.operates);
        }
    }

    #[test]
    fn internal_fault_operates() {
        let s = settings(vec![
            winding(Connection::Wye, 0, balanced(5.0, 0.0)),
            winding(Connection::Wye, 0, balanced(5.0, 0.0)),
        ]);
        let result = DifferentialCalc::new(s).execute().unwrap();
        assert_abs_diff_eq!(result.phases[0].differential, 2.0, epsilon = 1e-12);
        assert!(result.phases[0].operates);
    }

    #[test]
    fn inverted_polarity_cancels_in_phase_currents() {
        let mut w2 = winding(Connection::Wye, 0, balanced(5.0, 0.0));
        w2.polarity = Polarity::Inverted;
        let s = settings(vec![winding(Connection::Wye, 0, balanced(5.0, 0.0)), w2]);
        let result = DifferentialCalc::new(s).execute().unwrap();
        assert_abs_diff_eq!(result.phases[1].differential, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn delta_winding_compensated_by_clock_code() {
        // Code 11 advances the delta-side currents by 330°.
        let w2 = winding(Connection::Delta, 11, balanced(5.0 * 3f64.sqrt(), 210.0));
        let s = settings(vec![winding(Connection::Wye, 0, balanced(5.0, 0.0)), w2]);
        let result = DifferentialCalc::new(s).execute().unwrap();
        assert_abs_diff_eq!(result.windings[1].constant, 1.0 / 3f64.sqrt(), epsilon = 1e-12);
        assert_eq!(result.windings[1].relative_code, 11);
        for phase in &result.phases {
            assert_abs_diff_eq!(phase.differential, 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(phase.restraint, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn filter_applies_to_differential_only() {
        let zero_seq = PhasorInput::new(2.0, 0.0);
        let mut w1 = winding(Connection::Wye, 0, [zero_seq; 3]);
        w1.homopolar_filter = true;
        let w2 = winding(Connection::Wye, 0, [PhasorInput::default(); 3]);
        let result = DifferentialCalc::new(settings(vec![w1, w2])).execute().unwrap();
        assert_abs_diff_eq!(result.phases[0].differential, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.phases[0].restraint, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn ratio_scaled_model() {
        let mut w2 = winding(Connection::Wye, 0, balanced(2.5, 180.0));
        w2.ct_ratio = 160.0;
        let mut s = settings(vec![winding(Connection::Wye, 0, balanced(5.0, 0.0)), w2]);
        s.model = RelayModel::RatioScaled;
        let result = DifferentialCalc::new(s).execute().unwrap();
        assert_abs_diff_eq!(result.windings[1].factor, 2.0 / 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.phases[0].differential, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.phases[0].restraint, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn ratio_scaled_ignores_blank_non_reference_tap() {
        let mut w2 = winding(Connection::Wye, 0, balanced(2.5, 180.0));
        w2.ct_ratio = 160.0;
        w2.tap = 0.0;
        let mut s = settings(vec![winding(Connection::Wye, 0, balanced(5.0, 0.0)), w2]);
        s.model = RelayModel::RatioScaled;
        let result = DifferentialCalc::new(s).execute().unwrap();
        assert_eq!(result.windings[0].tap, Some(5.0));
        assert_eq!(result.windings[1].tap, None);
        assert_abs_diff_eq!(result.windings[1].factor, 2.0 / 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.phases[0].differential, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn tap_scaled_rejects_blank_tap() {
        let mut w2 = winding(Connection::Wye, 0, balanced(5.0, 180.0));
        w2.tap = 0.0;
        let s = settings(vec![winding(Connection::Wye, 0, balanced(5.0, 0.0)), w2]);
        assert!(matches!(
            DifferentialCalc::new(s).execute().unwrap_err(),
            RelayError::Input(InputError::Invalid(_))
        ));
    }

    #[test]
    fn non_positive_ct_ratio_is_rejected() {
        for bad in [0.0, -40.0, f64::NAN, f64::INFINITY] {
            for model in [RelayModel::TapScaled, RelayModel::RatioScaled] {
                let mut w1 = winding(Connection::Wye, 0, balanced(5.0, 0.0));
                w1.ct_ratio = bad;
                let mut s =
                    settings(vec![w1, winding(Connection::Wye, 0, balanced(5.0, 180.0))]);
                s.model = model;
                let err = DifferentialCalc::new(s).execute().unwrap_err();
                assert!(matches!(err, RelayError::Input(InputError::Invalid(_))), "{bad}: {err}");
            }
        }
    }

    #[test]
    fn third_winding_ignored_for_two_winding_transformer() {
        let s = settings(vec![
            winding(Connection::Wye, 0, balanced(5.0, 0.0)),
            winding(Connection::Wye, 0, balanced(5.0, 180.0)),
            winding(Connection::Wye, 0, balanced(50.0, 0.0)),
        ]);
        let result = DifferentialCalc::new(s).execute().unwrap();
        assert_eq!(result.windings.len(), 2);
        assert_abs_diff_eq!(result.phases[2].differential, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn taps_from_power() {
        let mut s = settings(vec![
            winding(Connection::Wye, 0, balanced(1.0, 0.0)),
            winding(Connection::Wye, 0, balanced(1.0, 180.0)),
        ]);
        s.power_mva = 30.0;
        let result = DifferentialCalc::new(s).execute().unwrap();
        let expected = 30_000.0 / (80.0 * 138.0 * 3f64.sqrt());
        assert_abs_diff_eq!(result.windings[0].tap.unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn validation_errors() {
        let mut s = settings(vec![winding(Connection::Wye, 0, balanced(1.0, 0.0))]);
        assert!(matches!(
            DifferentialCalc::new(s.clone()).execute().unwrap_err(),
            RelayError::Input(InputError::Invalid(_))
        ));

        s.winding_count = 4;
        assert!(matches!(
            DifferentialCalc::new(s.clone()).execute().unwrap_err(),
            RelayError::Input(InputError::OutOfRange { parameter: "winding count", .. })
        ));

        let mut s = settings(vec![
            winding(Connection::Wye, 0, balanced(1.0, 0.0)),
            winding(Connection::Wye, 12, balanced(1.0, 0.0)),
        ]);
        assert!(matches!(
            DifferentialCalc::new(s.clone()).execute().unwrap_err(),
            RelayError::Input(InputError::OutOfRange { parameter: "clock code", .. })
        ));

        s.windings[1].clock_code = 0;
        s.reference = 3;
        assert!(matches!(
            DifferentialCalc::new(s).execute().unwrap_err(),
            RelayError::Input(InputError::OutOfRange { parameter: "reference winding", .. })
        ));
    }
}
