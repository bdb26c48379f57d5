pub mod body;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod controls;
pub mod ephemeris;
pub mod error;
pub mod force;
pub mod history;
pub mod integrator;
pub mod projection;
pub mod units;

pub use body::{Body, Gravitating, PointMass};
pub use catalog::{build_bodies, Selection};
pub use clock::{
    fast_forward, ClockError, ClockParams, ClockStatus, FastForwardReport, ProgressSink,
    ProgressTracker, SimulationClock, SimulationState, TickOutcome,
};
pub use config::OrreryConfig;
pub use controls::{parse_speed, parse_steps_per_frame, validate_target_date, InputError};
pub use ephemeris::{load_ephemeris, parse_ephemeris, Ephemeris};
pub use error::PhysicsError;
pub use force::{compute_force_matrix, total_force, ForceMatrix};
pub use history::TrajectoryHistory;
pub use integrator::advance;
pub use projection::{Projector, ViewProjection, Viewport};
