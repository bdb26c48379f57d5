//! Pairwise Newtonian gravity
//!
//! The force matrix is dense: cell `(i, j)` holds the force exerted on body `i`
//! by body `j`. Only the upper triangle is evaluated; the lower triangle is its
//! negation and the diagonal stays zero.

use crate::body::Gravitating;
use crate::error::PhysicsError;
use glam::DVec3;

/// Dense table of pairwise forces for one instant
#[derive(Debug, Clone, PartialEq)]
pub struct ForceMatrix {
    n: usize,
    cells: Vec<DVec3>, // row-major, n * n
}

impl ForceMatrix {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            cells: vec![DVec3::ZERO; n * n],
        }
    }

    /// Number of bodies (rows)
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Force on body `i` from body `j`
    pub fn get(&self, i: usize, j: usize) -> Result<DVec3, PhysicsError> {
        self.check_index(i)?;
        self.check_index(j)?;
        Ok(self.cells[i * self.n + j])
    }

    /// Single coordinate (0 = x, 1 = y, 2 = z) of the force on `i` from `j`
    pub fn component(&self, coord: usize, i: usize, j: usize) -> Result<f64, PhysicsError> {
        let force = self.get(i, j)?;
        force
            .to_array()
            .get(coord)
            .copied()
            .ok_or(PhysicsError::BodyIndexOutOfRange { index: coord, len: 3 })
    }

    /// Sum of row `i`: the net force on body `i`
    pub fn total_force(&self, i: usize) -> Result<DVec3, PhysicsError> {
        self.check_index(i)?;
        let row = &self.cells[i * self.n..(i + 1) * self.n];
        Ok(row.iter().fold(DVec3::ZERO, |acc, f| acc + *f))
    }

    fn set_pair(&mut self, i: usize, j: usize, force: DVec3) {
        self.cells[i * self.n + j] = force;
        self.cells[j * self.n + i] = -force;
    }

    fn check_index(&self, index: usize) -> Result<(), PhysicsError> {
        if index < self.n {
            Ok(())
        } else {
            Err(PhysicsError::BodyIndexOutOfRange { index, len: self.n })
        }
    }
}

/// Gravitational force exerted on `a` by `b`.
///
/// `first`/`second` are only used to label a zero-separation error.
pub fn pairwise_force<P: Gravitating>(
    a: &P,
    b: &P,
    g: f64,
    first: usize,
    second: usize,
) -> Result<DVec3, PhysicsError> {
    let d = b.position() - a.position();
    let r = d.length();
    if r == 0.0 {
        return Err(PhysicsError::CoincidentBodies { first, second });
    }
    let magnitude = g * a.mass() * b.mass() / (r * r);
    Ok(magnitude * (d / r))
}

/// Compute the full force matrix for `bodies`.
///
/// Fails before any work is done if a mass is not strictly positive, and on
/// the first coincident pair.
pub fn compute_force_matrix<P: Gravitating>(bodies: &[P], g: f64) -> Result<ForceMatrix, PhysicsError> {
    check_masses(bodies)?;

    let n = bodies.len();
    let mut forces = ForceMatrix::zeros(n);
    for i in 0..n {
        for j in (i + 1)..n {
            let f_ij = pairwise_force(&bodies[i], &bodies[j], g, i, j)?;
            forces.set_pair(i, j, f_ij);
        }
    }
    Ok(forces)
}

/// Free-function form of [`ForceMatrix::total_force`]
pub fn total_force(matrix: &ForceMatrix, body_index: usize) -> Result<DVec3, PhysicsError> {
    matrix.total_force(body_index)
}

fn check_masses<P: Gravitating>(bodies: &[P]) -> Result<(), PhysicsError> {
    for (index, body) in bodies.iter().enumerate() {
        let mass = body.mass();
        // negated so NaN is rejected too
        if !(mass > 0.0) {
            return Err(PhysicsError::NonPositiveMass { index, mass });
        }
    }
    Ok(())
}
