//! Working units: 1 sun mass, 1 AU, 1 day
//!
//! Input data arrives in kg, km and km/s and is converted once at load time.

use glam::DVec3;

/// Astronomical unit [m]
pub const AU_M: f64 = 1.496e11;
/// Mass of the sun [kg]
pub const SUN_MASS_KG: f64 = 1.989e30;
/// One day [s]
pub const DAY_S: f64 = 86_400.0;
/// Gravitational constant [m^3 kg^-1 s^-2]
pub const G_SI: f64 = 6.67430e-11;
/// Gravitational constant [AU^3 sunmass^-1 day^-2]
pub const G_AU_SUNMASS_DAY: f64 = 2.95912208286e-4;

pub fn mass_from_kg(kg: f64) -> f64 {
    kg / SUN_MASS_KG
}

pub fn position_from_km(km: DVec3) -> DVec3 {
    km * 1e3 / AU_M
}

pub fn velocity_from_km_per_s(km_per_s: DVec3) -> DVec3 {
    km_per_s * 1e3 / AU_M * DAY_S
}
