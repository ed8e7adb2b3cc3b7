mod polar_lines;
mod region;
mod settings;

pub use polar_lines::{homopolar_alpha, FaultKind, LoopGeometry};
pub use region::{auto_sides, compute_anchor, zone_bounds, LineSegment, Region, RegionBuilder};
pub use settings::{
    Direction, DirectionalSupervision, GroundLoopSettings, LoopSettings, ZoneSettings,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{InputError, Result};

/// Highest zone number a relay may carry.
pub const MAX_ZONES: u8 = 5;

/// Regions computed for one zone.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneResult {
    pub number: u8,
    pub direction: Direction,
    /// `None` when the phase loop is disabled.
    pub phase: Option<Region>,
    /// `None` when the ground loop is disabled.
    pub ground: Option<Region>,
    /// Homopolar compensation angle of the ground loop, degrees.
    pub alpha: f64,
}

/// A distance relay: shared directional supervision plus up to five zones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistanceRelay {
    #[serde(default)]
    pub supervision: DirectionalSupervision,
    #[serde(default)]
    pub zones: Vec<ZoneSettings>,
}

impl DistanceRelay {
    /// Creates a new `DistanceRelay`.
    #[must_use]
    pub fn new(supervision: DirectionalSupervision, zones: Vec<ZoneSettings>) -> Self {
        Self { supervision, zones }
    }

    /// Computes every enabled loop of every zone.
    ///
    /// Zones are independent: a degenerate region only sets that region's
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::OutOfRange`] if there are more than five zones
    /// or a zone number is outside `1..=5`, and [`InputError::Invalid`] if a
    /// zone number repeats.
    pub fn execute(&self) -> Result<Vec<ZoneResult>> {
        self.validate()?;
        Ok(self.zones.iter().map(|zone| self.zone(zone)).collect())
    }

    #[allow(clippy::cast_precision_loss)]
    fn validate(&self) -> Result<()> {
        if self.zones.len() > usize::from(MAX_ZONES) {
            return Err(InputError::OutOfRange {
                parameter: "zone count",
                value: self.zones.len() as f64,
                min: 0.0,
                max: f64::from(MAX_ZONES),
            }
            .into());
        }
        let mut seen = [false; MAX_ZONES as usize];
        for zone in &self.zones {
            if !(1..=MAX_ZONES).contains(&zone.number) {
                return Err(InputError::OutOfRange {
                    parameter: "zone number",
                    value: f64::from(zone.number),
                    min: 1.0,
                    max: f64::from(MAX_ZONES),
                }
                .into());
            }
            let slot = &mut seen[usize::from(zone.number - 1)];
            if *slot {
                return Err(InputError::Invalid(format!("zone {} defined twice", zone.number)).into());
            }
            *slot = true;
        }
        Ok(())
    }

    fn zone(&self, zone: &ZoneSettings) -> ZoneResult {
        debug!(zone = zone.number, direction = ?zone.direction, "computing zone");

        let phase = zone.phase.enabled.then(|| {
            RegionBuilder::new(LoopGeometry::phase(zone, &self.supervision), zone.direction)
                .execute()
        });

        let ground_geometry = LoopGeometry::ground(zone, &self.supervision);
        let ground = zone
            .ground
            .reach
            .enabled
            .then(|| RegionBuilder::new(ground_geometry, zone.direction).execute());

        ZoneResult {
            number: zone.number,
            direction: zone.direction,
            phase,
            ground,
            alpha: ground_geometry.alpha,
        }
    }
}
