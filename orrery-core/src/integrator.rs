use crate::body::Body;
use crate::error::PhysicsError;
use crate::force::compute_force_matrix;
use chrono::{Duration, NaiveDate};
use glam::DVec3;

/// Advance all bodies by `step_days` days and return the advanced date.
///
/// Velocity takes an explicit Euler step; position moves by the average of
/// the velocity before and after that step. Every body uses forces from the
/// same pre-step configuration. A negative `step_days` integrates backwards.
///
/// The step is all-or-nothing: on error neither the bodies nor the date change.
pub fn advance(
    bodies: &mut [Body],
    g: f64,
    current_date: NaiveDate,
    step_days: i64,
) -> Result<NaiveDate, PhysicsError> {
    let new_date = Duration::try_days(step_days)
        .and_then(|delta| current_date.checked_add_signed(delta))
        .ok_or(PhysicsError::DateOutOfRange {
            date: current_date,
            step_days,
        })?;

    let forces = compute_force_matrix(bodies, g)?;
    let dt = step_days as f64;

    // Stage every update before touching the bodies
    let mut updated: Vec<(DVec3, DVec3)> = Vec::with_capacity(bodies.len());
    for (i, body) in bodies.iter().enumerate() {
        let a = forces.total_force(i)? / body.mass;
        let v_before = body.velocity;
        let v_after = v_before + a * dt;
        let x_after = body.position + (v_after + v_before) / 2.0 * dt;
        if !(v_after.is_finite() && x_after.is_finite()) {
            return Err(PhysicsError::NonFiniteState { index: i });
        }
        updated.push((x_after, v_after));
    }

    for (body, (position, velocity)) in bodies.iter_mut().zip(updated) {
        body.position = position;
        body.velocity = velocity;
    }

    Ok(new_date)
}

/// Run `steps` consecutive steps of `step_days` days each
pub fn advance_many(
    bodies: &mut [Body],
    g: f64,
    mut date: NaiveDate,
    step_days: i64,
    steps: u64,
) -> Result<NaiveDate, PhysicsError> {
    for _ in 0..steps {
        date = advance(bodies, g, date, step_days)?;
    }
    Ok(date)
}
