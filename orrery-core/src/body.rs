use glam::DVec3;

/// Anything the force model can act on: a mass at a position.
pub trait Gravitating {
    fn mass(&self) -> f64;
    fn position(&self) -> DVec3;
}

/// Minimal mass/position record, for force computations that need no
/// velocity or presentation data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMass {
    pub mass: f64,
    pub position: DVec3,
}

impl PointMass {
    pub fn new(mass: f64, position: DVec3) -> Self {
        Self { mass, position }
    }
}

impl Gravitating for PointMass {
    fn mass(&self) -> f64 {
        self.mass
    }

    fn position(&self) -> DVec3 {
        self.position
    }
}

/// RGB color used by the renderer
pub type Rgb = [u8; 3];

/// A celestial body in working units (sun masses, AU, AU/day)
#[derive(Debug, Clone)]
pub struct Body {
    pub name: String,
    pub mass: f64,
    pub position: DVec3,
    pub velocity: DVec3,
    pub radius_px: f32, // display only
    pub color: Rgb,     // display only
    /// Orbital period in days; `None` when unknown
    pub period: Option<f64>,
}

impl Body {
    pub const DEFAULT_COLOR: Rgb = [150, 150, 150];
    pub const DEFAULT_RADIUS_PX: f32 = 4.0;

    pub fn new(name: impl Into<String>, mass: f64, position: DVec3, velocity: DVec3) -> Self {
        Self {
            name: name.into(),
            mass,
            position,
            velocity,
            radius_px: Self::DEFAULT_RADIUS_PX,
            color: Self::DEFAULT_COLOR,
            period: None,
        }
    }

    pub fn with_display(mut self, radius_px: f32, color: Rgb) -> Self {
        self.radius_px = radius_px;
        self.color = color;
        self
    }

    pub fn with_period(mut self, period: f64) -> Self {
        self.period = Some(period);
        self
    }
}

impl Gravitating for Body {
    fn mass(&self) -> f64 {
        self.mass
    }

    fn position(&self) -> DVec3 {
        self.position
    }
}
