//! Turns parsed ephemeris records into bodies in working units, with the
//! presentation metadata the viewer needs

use crate::body::{Body, Rgb};
use crate::ephemeris::Ephemeris;
use crate::units;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Invalid value for selection. Expected 'inner', 'outer' or 'all'.")]
    InvalidSelection(String),
}

/// Which part of the solar system to simulate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    /// The first six bodies: Sun through Jupiter
    #[default]
    Inner,
    /// The Sun plus everything from Jupiter (the sixth body) outwards.
    /// Jupiter appears in both `Inner` and `Outer`, so the bundled file gives
    /// six bodies for each.
    Outer,
    All,
}

impl FromStr for Selection {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inner" => Ok(Self::Inner),
            "outer" => Ok(Self::Outer),
            "all" => Ok(Self::All),
            other => Err(CatalogError::InvalidSelection(other.to_string())),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Inner => "inner",
            Self::Outer => "outer",
            Self::All => "all",
        };
        f.write_str(name)
    }
}

const INNER_COUNT: usize = 6;
const OUTER_START: usize = 5;

/// Display radius (px), color and orbital period (days) by body name
struct Appearance {
    name: &'static str,
    radius_px: f32,
    color: Rgb,
    period: f64,
}

const APPEARANCES: &[Appearance] = &[
    Appearance { name: "Sun", radius_px: 15.0, color: [255, 223, 0], period: 1.0 },
    Appearance { name: "Mercury", radius_px: 3.0, color: [169, 169, 169], period: 87.97 },
    Appearance { name: "Venus", radius_px: 3.0, color: [255, 204, 153], period: 224.70 },
    Appearance { name: "Earth", radius_px: 5.0, color: [0, 102, 204], period: 365.25 },
    Appearance { name: "Mars", radius_px: 4.0, color: [210, 105, 30], period: 686.98 },
    Appearance { name: "Jupiter", radius_px: 12.0, color: [255, 165, 0], period: 4332.82 },
    Appearance { name: "Saturn", radius_px: 10.0, color: [194, 178, 128], period: 10755.70 },
    Appearance { name: "Uranus", radius_px: 9.0, color: [173, 216, 230], period: 30687.15 },
    Appearance { name: "Neptune", radius_px: 7.0, color: [0, 0, 139], period: 60190.03 },
    Appearance { name: "Pluto", radius_px: 2.0, color: [169, 169, 169], period: 90560.0 },
];

/// Convert every record to working units and keep the selected subset.
/// Returns the bodies and the ephemeris date.
pub fn build_bodies(ephemeris: &Ephemeris, selection: Selection) -> (Vec<Body>, NaiveDate) {
    let mut bodies: Vec<Body> = ephemeris
        .records
        .iter()
        .map(|record| {
            let body = Body::new(
                record.name.clone(),
                units::mass_from_kg(record.mass_kg),
                units::position_from_km(record.position_km),
                units::velocity_from_km_per_s(record.velocity_km_s),
            );
            match APPEARANCES.iter().find(|a| a.name.eq_ignore_ascii_case(&record.name)) {
                Some(a) => body.with_display(a.radius_px, a.color).with_period(a.period),
                None => body,
            }
        })
        .collect();

    match selection {
        Selection::Inner => bodies.truncate(INNER_COUNT),
        Selection::Outer => {
            let end = OUTER_START.min(bodies.len());
            if end > 1 {
                bodies.drain(1..end);
            }
        }
        Selection::All => {}
    }
    debug!(count = bodies.len(), %selection, "bodies built");

    (bodies, ephemeris.epoch.date())
}
