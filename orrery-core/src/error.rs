//! Precondition violations raised by the physics core
//!
//! None of these are recoverable: a step that fails is never applied, and the
//! clock refuses to continue once one has been observed.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    #[error("body {index} has non-positive mass {mass}")]
    NonPositiveMass { index: usize, mass: f64 },

    #[error("bodies {first} and {second} coincide (zero separation)")]
    CoincidentBodies { first: usize, second: usize },

    #[error("body index {index} is out of range for {len} bodies")]
    BodyIndexOutOfRange { index: usize, len: usize },

    #[error("integration produced a non-finite state for body {index}")]
    NonFiniteState { index: usize },

    #[error("date {date} cannot be advanced by {step_days} days")]
    DateOutOfRange { date: NaiveDate, step_days: i64 },
}
