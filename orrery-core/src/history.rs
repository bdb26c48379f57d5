//! Bounded per-body trails of recently drawn screen positions

use crate::body::Body;
use crate::error::PhysicsError;
use glam::Vec2;
use std::collections::VecDeque;

/// One body's trail, oldest point first
#[derive(Debug, Clone, Default)]
pub struct Trail {
    points: VecDeque<Vec2>,
    capacity: Option<usize>, // None = unbounded
}

impl Trail {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            points: VecDeque::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.points.iter().copied()
    }

    pub fn latest(&self) -> Option<Vec2> {
        self.points.back().copied()
    }

    fn push(&mut self, point: Vec2) {
        self.points.push_back(point);
        if let Some(capacity) = self.capacity {
            while self.points.len() > capacity {
                self.points.pop_front();
            }
        }
    }

    fn clear(&mut self) {
        self.points.clear();
    }
}

/// Trail length for a body: `ceil(rel_history_length * period)` points, or
/// unbounded when the period is unknown or not positive
pub fn trail_capacity(period: Option<f64>, rel_history_length: f64) -> Option<usize> {
    match period {
        Some(period) if period > 0.0 => Some((rel_history_length * period).ceil().max(0.0) as usize),
        _ => None,
    }
}

/// Trails for every body, indexed in parallel with the body sequence
#[derive(Debug, Clone, Default)]
pub struct TrajectoryHistory {
    trails: Vec<Trail>,
}

impl TrajectoryHistory {
    pub fn new(bodies: &[Body], rel_history_length: f64) -> Self {
        Self::with_capacities(
            bodies
                .iter()
                .map(|b| trail_capacity(b.period, rel_history_length))
                .collect(),
        )
    }

    pub fn with_capacities(capacities: Vec<Option<usize>>) -> Self {
        Self {
            trails: capacities.into_iter().map(Trail::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.trails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }

    pub fn trail(&self, body_index: usize) -> Result<&Trail, PhysicsError> {
        let len = self.trails.len();
        self.trails
            .get(body_index)
            .ok_or(PhysicsError::BodyIndexOutOfRange { index: body_index, len })
    }

    pub fn trails(&self) -> &[Trail] {
        &self.trails
    }

    /// Append a point, evicting the oldest ones beyond the body's capacity
    pub fn record(&mut self, body_index: usize, screen_position: Vec2) -> Result<(), PhysicsError> {
        let len = self.trails.len();
        let trail = self
            .trails
            .get_mut(body_index)
            .ok_or(PhysicsError::BodyIndexOutOfRange { index: body_index, len })?;
        trail.push(screen_position);
        Ok(())
    }

    pub fn clear_all(&mut self) {
        for trail in &mut self.trails {
            trail.clear();
        }
    }

    /// Most recent point of a body's trail, or `current()` when the trail is
    /// still empty
    pub fn latest<F>(&self, body_index: usize, current: F) -> Result<Vec2, PhysicsError>
    where
        F: FnOnce() -> Vec2,
    {
        Ok(self.trail(body_index)?.latest().unwrap_or_else(current))
    }
}
