//! Drives the integrator: continuous animation ticks and fast-forward runs
//!
//! The body sequence and the current date live behind one mutex. Animation
//! frames take the lock for the duration of a frame; a fast-forward worker takes
//! it for its whole run. While a worker handle exists the clock refuses to
//! animate, resume or start another run, so the two modes never interleave.

use crate::body::Body;
use crate::error::PhysicsError;
use crate::history::TrajectoryHistory;
use crate::integrator::advance;
use crate::projection::Projector;
use chrono::NaiveDate;
use glam::{DVec3, Vec2};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, TryLockError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum ClockError {
    #[error("a fast-forward computation is already in progress")]
    FastForwardInProgress,

    #[error("simulation halted after a physics fault: {0}")]
    Faulted(PhysicsError),

    #[error(transparent)]
    Physics(#[from] PhysicsError),

    #[error("fast-forward worker panicked")]
    WorkerPanicked,

    #[error("simulation state lock is poisoned")]
    StatePoisoned,

    #[error("failed to start fast-forward worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Bodies plus the current simulation date
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub bodies: Vec<Body>,
    pub date: NaiveDate,
}

impl SimulationState {
    pub fn new(bodies: Vec<Body>, date: NaiveDate) -> Self {
        Self { bodies, date }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockParams {
    /// Gravitational constant in AU^3 / (sun mass * day^2)
    pub g: f64,
    /// Target animation frames per second
    pub speed: f64,
    /// Integration steps (days) per animation frame
    pub steps_per_frame: u32,
}

impl Default for ClockParams {
    fn default() -> Self {
        Self {
            g: crate::units::G_AU_SUNMASS_DAY,
            speed: 60.0,
            steps_per_frame: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockStatus {
    Running,
    Paused,
    Computing { progress: f64 },
    Faulted,
}

/// Receives fast-forward progress in `[0, 1]`
pub trait ProgressSink {
    fn report(&self, fraction: f64);
}

impl<F> ProgressSink for F
where
    F: Fn(f64),
{
    fn report(&self, fraction: f64) {
        self(fraction)
    }
}

/// Progress shared between the worker and the UI thread, in hundredths
#[derive(Debug, Default)]
pub struct ProgressTracker {
    hundredths: AtomicU32,
}

impl ProgressTracker {
    pub fn fraction(&self) -> f64 {
        f64::from(self.hundredths.load(Ordering::Acquire)) / 100.0
    }

    pub fn reset(&self) {
        self.hundredths.store(0, Ordering::Release);
    }
}

impl ProgressSink for ProgressTracker {
    fn report(&self, fraction: f64) {
        let hundredths = (fraction.clamp(0.0, 1.0) * 100.0).round() as u32;
        self.hundredths.store(hundredths, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastForwardReport {
    pub steps: u64,
    /// +1 towards the future, -1 towards the past
    pub step_days: i64,
    pub date: NaiveDate,
}

/// Integrate `state` one day at a time until it reaches `target`.
///
/// Progress is reported each time another whole percent is crossed, so there
/// are at most 100 reports and the last one is exactly 1.0. A target equal to
/// the current date runs zero steps and reports nothing.
///
/// The run is all-or-nothing: `state` is only written once every step has
/// succeeded.
pub fn fast_forward<S>(
    state: &mut SimulationState,
    target: NaiveDate,
    g: f64,
    progress: &S,
) -> Result<FastForwardReport, PhysicsError>
where
    S: ProgressSink + ?Sized,
{
    let step_days: i64 = if target > state.date { 1 } else { -1 };
    let steps = target.signed_duration_since(state.date).num_days().unsigned_abs();

    let mut staged = state.clone();
    let mut reported = 0u64;
    for k in 0..steps {
        staged.date = advance(&mut staged.bodies, g, staged.date, step_days)?;
        let percent = (k + 1) * 100 / steps;
        if percent > reported {
            reported = percent;
            progress.report(percent as f64 / 100.0);
        }
    }
    *state = staged;

    Ok(FastForwardReport {
        steps,
        step_days,
        date: state.date,
    })
}

/// What a single [`SimulationClock::tick`] did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// Integration steps run by this tick
    pub steps: u32,
    /// Set on the one tick that observed a fast-forward completing
    pub fast_forward: Option<FastForwardReport>,
}

impl TickOutcome {
    pub fn needs_refresh(&self) -> bool {
        self.steps > 0 || self.fast_forward.is_some()
    }
}

type Worker = JoinHandle<Result<FastForwardReport, ClockError>>;

pub struct SimulationClock {
    state: Arc<Mutex<SimulationState>>,
    history: TrajectoryHistory,
    rel_history_length: f64,
    params: ClockParams,
    running: bool,
    worker: Option<Worker>,
    progress: Arc<ProgressTracker>,
    fault: Option<PhysicsError>,
    since_last_frame: Duration,
}

impl SimulationClock {
    /// A paused clock over `bodies`, starting at `date`
    pub fn new(bodies: Vec<Body>, date: NaiveDate, params: ClockParams, rel_history_length: f64) -> Self {
        let history = TrajectoryHistory::new(&bodies, rel_history_length);
        Self {
            state: Arc::new(Mutex::new(SimulationState::new(bodies, date))),
            history,
            rel_history_length,
            params,
            running: false,
            worker: None,
            progress: Arc::new(ProgressTracker::default()),
            fault: None,
            since_last_frame: Duration::ZERO,
        }
    }

    pub fn status(&self) -> ClockStatus {
        if self.fault.is_some() {
            ClockStatus::Faulted
        } else if self.is_computing() {
            ClockStatus::Computing {
                progress: self.progress(),
            }
        } else if self.running {
            ClockStatus::Running
        } else {
            ClockStatus::Paused
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True from `start_fast_forward` until the worker has been reaped by
    /// `tick` or `wait_for_fast_forward`
    pub fn is_computing(&self) -> bool {
        self.worker.is_some()
    }

    pub fn fault(&self) -> Option<&PhysicsError> {
        self.fault.as_ref()
    }

    pub fn progress(&self) -> f64 {
        self.progress.fraction()
    }

    pub fn params(&self) -> ClockParams {
        self.params
    }

    pub fn history(&self) -> &TrajectoryHistory {
        &self.history
    }

    /// Target frames per second; caller validates the range
    pub fn set_speed(&mut self, speed: f64) {
        self.params.speed = speed;
        self.since_last_frame = Duration::ZERO;
    }

    pub fn set_steps_per_frame(&mut self, steps_per_frame: u32) {
        self.params.steps_per_frame = steps_per_frame.max(1);
    }

    /// Read the state without blocking. `None` while a fast-forward holds it.
    pub fn with_state<R>(&self, f: impl FnOnce(&SimulationState) -> R) -> Option<R> {
        match self.state.try_lock() {
            Ok(guard) => Some(f(&guard)),
            Err(TryLockError::WouldBlock) => None,
            Err(TryLockError::Poisoned(_)) => None,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.with_state(|state| state.date)
    }

    pub fn resume(&mut self) -> Result<(), ClockError> {
        if let Some(fault) = &self.fault {
            return Err(ClockError::Faulted(fault.clone()));
        }
        if self.is_computing() {
            warn!("resume refused while fast-forward is running");
            return Err(ClockError::FastForwardInProgress);
        }
        if !self.running {
            info!("animation running");
        }
        self.running = true;
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.running {
            info!("animation paused");
        }
        self.running = false;
    }

    /// Play/pause; returns whether the animation is now running
    pub fn toggle_running(&mut self) -> Result<bool, ClockError> {
        if self.running {
            self.pause();
        } else {
            self.resume()?;
        }
        Ok(self.running)
    }

    /// Replace the bodies and date, e.g. after the initial conditions were
    /// reloaded. Clears history and any recorded fault.
    pub fn reset(&mut self, bodies: Vec<Body>, date: NaiveDate) -> Result<(), ClockError> {
        if self.is_computing() {
            return Err(ClockError::FastForwardInProgress);
        }
        self.history = TrajectoryHistory::new(&bodies, self.rel_history_length);
        let mut state = self.state.lock().map_err(|_| ClockError::StatePoisoned)?;
        *state = SimulationState::new(bodies, date);
        self.fault = None;
        self.since_last_frame = Duration::ZERO;
        info!(%date, "simulation reset");
        Ok(())
    }

    /// Called serially by the host loop with the wall time since the previous
    /// call. Runs at most one frame, once a full `1 / speed` interval has
    /// accumulated, and reaps a finished fast-forward.
    pub fn tick<P>(&mut self, elapsed: Duration, projector: &P) -> Result<TickOutcome, ClockError>
    where
        P: Projector + ?Sized,
    {
        let mut outcome = TickOutcome {
            fast_forward: self.poll_fast_forward()?,
            ..TickOutcome::default()
        };
        if let Some(fault) = &self.fault {
            return Err(ClockError::Faulted(fault.clone()));
        }
        if !self.running || self.is_computing() {
            return Ok(outcome);
        }

        let interval = Duration::try_from_secs_f64(1.0 / self.params.speed).unwrap_or(Duration::MAX);
        self.since_last_frame += elapsed;
        if self.since_last_frame < interval {
            return Ok(outcome);
        }
        self.since_last_frame = (self.since_last_frame - interval).min(interval);

        outcome.steps = self.step_frame(projector)?;
        Ok(outcome)
    }

    /// Run one frame (`steps_per_frame` steps) right away, recording history
    /// after every step. Returns the number of steps run.
    ///
    /// Bodies, date and history are committed together once the whole frame
    /// has succeeded; a fault in any step leaves all three untouched.
    pub fn step_frame<P>(&mut self, projector: &P) -> Result<u32, ClockError>
    where
        P: Projector + ?Sized,
    {
        if let Some(fault) = &self.fault {
            return Err(ClockError::Faulted(fault.clone()));
        }
        if self.is_computing() {
            return Err(ClockError::FastForwardInProgress);
        }

        let g = self.params.g;
        let steps = self.params.steps_per_frame;
        let mut state = self.state.lock().map_err(|_| ClockError::StatePoisoned)?;
        let mut bodies = state.bodies.clone();
        let mut date = state.date;
        let mut points: Vec<Vec<Vec2>> = Vec::with_capacity(steps as usize);
        for _ in 0..steps {
            date = match advance(&mut bodies, g, date, 1) {
                Ok(date) => date,
                Err(e) => {
                    drop(state);
                    return Err(self.record_fault(e));
                }
            };
            let origin = bodies.first().map_or(DVec3::ZERO, |b| b.position);
            points.push(bodies.iter().map(|b| projector.project(b.position, origin)).collect());
        }
        state.bodies = bodies;
        state.date = date;
        drop(state);

        for step_points in points {
            for (i, point) in step_points.into_iter().enumerate() {
                self.history.record(i, point)?;
            }
        }
        debug!(%date, steps, "frame");
        Ok(steps)
    }

    /// Start integrating towards `target` on a worker thread.
    ///
    /// Pauses the animation and clears all trails first. Refused while a
    /// previous worker has not been reaped.
    pub fn start_fast_forward(&mut self, target: NaiveDate) -> Result<(), ClockError> {
        if let Some(fault) = &self.fault {
            return Err(ClockError::Faulted(fault.clone()));
        }
        if self.is_computing() {
            warn!(%target, "fast-forward refused: another one is in progress");
            return Err(ClockError::FastForwardInProgress);
        }

        self.pause();
        self.history.clear_all();
        self.progress.reset();
        self.since_last_frame = Duration::ZERO;

        let state = Arc::clone(&self.state);
        let progress = Arc::clone(&self.progress);
        let g = self.params.g;
        info!(%target, "fast-forward started");
        let worker = thread::Builder::new()
            .name("fast-forward".to_string())
            .spawn(move || {
                let mut state = state.lock().map_err(|_| ClockError::StatePoisoned)?;
                let result = fast_forward(&mut state, target, g, progress.as_ref());
                progress.reset();
                result.map_err(ClockError::from)
            })?;
        self.worker = Some(worker);
        Ok(())
    }

    /// Block until the running fast-forward (if any) completes
    pub fn wait_for_fast_forward(&mut self) -> Result<Option<FastForwardReport>, ClockError> {
        match self.worker.take() {
            Some(worker) => self.reap(worker).map(Some),
            None => Ok(None),
        }
    }

    fn poll_fast_forward(&mut self) -> Result<Option<FastForwardReport>, ClockError> {
        match self.worker.take() {
            Some(worker) if worker.is_finished() => self.reap(worker).map(Some),
            Some(worker) => {
                self.worker = Some(worker);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn reap(&mut self, worker: Worker) -> Result<FastForwardReport, ClockError> {
        match worker.join() {
            Ok(Ok(report)) => {
                info!(date = %report.date, steps = report.steps, "fast-forward finished");
                Ok(report)
            }
            Ok(Err(ClockError::Physics(e))) => Err(self.record_fault(e)),
            Ok(Err(e)) => Err(e),
            Err(_) => {
                error!("fast-forward worker panicked");
                Err(ClockError::WorkerPanicked)
            }
        }
    }

    fn record_fault(&mut self, e: PhysicsError) -> ClockError {
        error!(error = %e, "physics fault, simulation halted");
        self.running = false;
        self.fault = Some(e.clone());
        ClockError::Faulted(e)
    }
}
