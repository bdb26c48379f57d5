//! 3-D to screen projection used to populate trajectory history
//!
//! The physics never reads these values. Screen coordinates are pixels with the
//! y axis pointing up; a renderer with a y-down canvas has to flip them.

use glam::{DVec2, DVec3, Vec2};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("The zero vector does not have a well-defined perpendicular vector.")]
    ZeroVector,
}

/// Maps a 3-D position to a screen point, relative to `origin` (the
/// position the view is centered on)
pub trait Projector {
    fn project(&self, position: DVec3, origin: DVec3) -> Vec2;
}

impl<F> Projector for F
where
    F: Fn(DVec3, DVec3) -> Vec2,
{
    fn project(&self, position: DVec3, origin: DVec3) -> Vec2 {
        self(position, origin)
    }
}

/// Two unit vectors perpendicular to `v` and to each other
pub fn perpendicular_vectors(v: DVec3) -> Result<(DVec3, DVec3), ProjectionError> {
    if v == DVec3::ZERO {
        return Err(ProjectionError::ZeroVector);
    }
    // Cross with z unless v is parallel to it
    let helper = if v.x == 0.0 && v.y == 0.0 { DVec3::X } else { DVec3::Z };
    let perp1 = v.cross(helper).normalize();
    let perp2 = v.cross(perp1).normalize();
    Ok((perp1, perp2))
}

/// Coordinates of `position` in the plane spanned by the unit vectors `v1`, `v2`
pub fn orthogonal_projection(position: DVec3, v1: DVec3, v2: DVec3) -> DVec2 {
    DVec2::new(position.dot(v1), position.dot(v2))
}

/// Drawing area: a navigation strip on the left, the view to its right
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub navigation_width: f64,
    /// AU spanned by the view horizontally
    pub field_of_view_au: f64,
}

impl Viewport {
    pub fn pixels_per_au(&self) -> f64 {
        (self.width - self.navigation_width) / self.field_of_view_au
    }

    /// Scale AU coordinates to pixels, centered in the view area
    pub fn apply_scaling(&self, point: DVec2) -> DVec2 {
        let scale = self.pixels_per_au();
        let offset_x = ((self.width - self.navigation_width) / 2.0).floor() + self.navigation_width;
        let offset_y = (self.height / 2.0).floor();
        DVec2::new(point.x * scale + offset_x, point.y * scale + offset_y)
    }
}

/// Orthographic projection onto the plane with normal `normal`
#[derive(Debug, Clone, Copy)]
pub struct ViewProjection {
    v1: DVec3,
    v2: DVec3,
    pub viewport: Viewport,
}

impl ViewProjection {
    pub fn new(normal: DVec3, viewport: Viewport) -> Result<Self, ProjectionError> {
        let (v1, v2) = perpendicular_vectors(normal)?;
        Ok(Self { v1, v2, viewport })
    }

    pub fn basis(&self) -> (DVec3, DVec3) {
        (self.v1, self.v2)
    }
}

impl Projector for ViewProjection {
    fn project(&self, position: DVec3, origin: DVec3) -> Vec2 {
        let flat = orthogonal_projection(position - origin, self.v1, self.v2);
        self.viewport.apply_scaling(flat).as_vec2()
    }
}
