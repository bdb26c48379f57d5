//! Run configuration loaded from TOML
//!
//! Every field has a default, so an empty file (or no file at all) gives the
//! stock setup: the inner solar system from `resources/2024-Jan-01.txt`,
//! animated at 60 frames/s, one day per frame.
//!
//! ```toml
//! [physics]
//! gravitational_constant = 2.95912208286e-4
//!
//! [animation]
//! speed = 60.0
//! steps_per_frame = 1
//! rel_history_length = 0.6666666666666666
//! start_running = true
//!
//! [view]
//! width = 1000.0
//! height = 600.0
//! navigation_width = 100.0
//! field_of_view_au = 12.0
//! viewplane_normal = [0.0, 1.0, 0.6666666666666666]
//!
//! [data]
//! ephemeris = "resources/2024-Jan-01.txt"
//! selection = "inner"
//! ```

use crate::catalog::Selection;
use crate::clock::ClockParams;
use crate::controls::{SPEED_RANGE, STEPS_PER_FRAME_RANGE};
use crate::projection::{ProjectionError, ViewProjection, Viewport};
use crate::units::G_AU_SUNMASS_DAY;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config value for {field}: {message}")]
    Invalid { field: &'static str, message: String },

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// AU^3 / (sun mass * day^2)
    pub gravitational_constant: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: G_AU_SUNMASS_DAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub speed: f64,
    pub steps_per_frame: u32,
    /// Trail length in orbital periods
    pub rel_history_length: f64,
    pub start_running: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            speed: 60.0,
            steps_per_frame: 1,
            rel_history_length: 2.0 / 3.0,
            start_running: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub width: f64,
    pub height: f64,
    pub navigation_width: f64,
    pub field_of_view_au: f64,
    pub viewplane_normal: [f64; 3],
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
            navigation_width: 100.0,
            field_of_view_au: 12.0,
            viewplane_normal: [0.0, 1.0, 2.0 / 3.0],
        }
    }
}

impl ViewConfig {
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.height,
            navigation_width: self.navigation_width,
            field_of_view_au: self.field_of_view_au,
        }
    }

    pub fn projection(&self) -> Result<ViewProjection, ProjectionError> {
        ViewProjection::new(DVec3::from_array(self.viewplane_normal), self.viewport())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub ephemeris: PathBuf,
    pub selection: Selection,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            ephemeris: PathBuf::from("resources/2024-Jan-01.txt"),
            selection: Selection::Inner,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrreryConfig {
    pub physics: PhysicsConfig,
    pub animation: AnimationConfig,
    pub view: ViewConfig,
    pub data: DataConfig,
}

impl OrreryConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = self.physics.gravitational_constant;
        if !(g > 0.0 && g.is_finite()) {
            return Err(invalid("physics.gravitational_constant", "must be positive"));
        }

        let (min_speed, max_speed) = SPEED_RANGE;
        if !(min_speed..=max_speed).contains(&self.animation.speed) {
            return Err(invalid("animation.speed", "must be within 1 to 60"));
        }
        let (min_steps, max_steps) = STEPS_PER_FRAME_RANGE;
        if !(min_steps..=max_steps).contains(&self.animation.steps_per_frame) {
            return Err(invalid("animation.steps_per_frame", "must be within 1 to 50"));
        }
        if !(self.animation.rel_history_length >= 0.0) {
            return Err(invalid("animation.rel_history_length", "must not be negative"));
        }

        if !(self.view.field_of_view_au > 0.0) {
            return Err(invalid("view.field_of_view_au", "must be positive"));
        }
        if self.view.width <= self.view.navigation_width {
            return Err(invalid("view.width", "must exceed navigation_width"));
        }
        self.view.projection()?;
        Ok(())
    }

    pub fn clock_params(&self) -> ClockParams {
        ClockParams {
            g: self.physics.gravitational_constant,
            speed: self.animation.speed,
            steps_per_frame: self.animation.steps_per_frame,
        }
    }
}

fn invalid(field: &'static str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.to_string(),
    }
}
