//! Interactive viewer for the orrery
//!
//! A navigation strip on the left holds the controls; the rest of the window
//! shows the bodies and their trails, projected onto the configured view plane.
//! The initial-conditions file is watched and reloaded when it changes.

use chrono::{Datelike, NaiveDate};
use eframe::egui;
use notify::{Event, RecommendedWatcher, Watcher};
use orrery_core::{
    build_bodies, load_ephemeris, parse_speed, parse_steps_per_frame, validate_target_date, Body,
    ClockError, ClockStatus, OrreryConfig, Projector, SimulationClock, ViewProjection,
};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use tracing::{info, warn};

const TRAIL_WIDTH: f32 = 1.0;
const BACKGROUND: egui::Color32 = egui::Color32::BLACK;

pub struct OrreryApp {
    clock: SimulationClock,
    projection: ViewProjection,
    config: OrreryConfig,
    ephemeris_path: PathBuf,
    year: String,
    month: String,
    day: String,
    speed_text: String,
    steps_text: String,
    /// Validation or fault message shown under the date entries
    message: Option<String>,
    /// Last frame's bodies, kept for drawing while a fast-forward holds the state
    snapshot: Vec<Body>,
    date: NaiveDate,
    #[allow(dead_code)] // Kept alive to maintain file watching
    file_watcher: Option<RecommendedWatcher>,
    file_receiver: mpsc::Receiver<notify::Result<Event>>,
    needs_reload: bool,
}

impl OrreryApp {
    pub fn new(config: OrreryConfig, projection: ViewProjection, bodies: Vec<Body>, date: NaiveDate) -> Self {
        let ephemeris_path = config
            .data
            .ephemeris
            .canonicalize()
            .unwrap_or_else(|_| config.data.ephemeris.clone());

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            // The receiver is gone during shutdown
            let _ = tx.send(res);
        })
        .ok();
        if let Some(ref mut w) = watcher {
            if let Err(e) = w.watch(&ephemeris_path, notify::RecursiveMode::NonRecursive) {
                warn!(error = %e, path = %ephemeris_path.display(), "cannot watch initial conditions");
            }
        }

        let mut clock = SimulationClock::new(
            bodies.clone(),
            date,
            config.clock_params(),
            config.animation.rel_history_length,
        );
        if config.animation.start_running {
            // A fresh clock has no fault and no worker
            let _ = clock.resume();
        }

        Self {
            clock,
            projection,
            ephemeris_path,
            year: date.year().to_string(),
            month: date.month().to_string(),
            day: date.day().to_string(),
            speed_text: format_number(config.animation.speed),
            steps_text: config.animation.steps_per_frame.to_string(),
            config,
            message: None,
            snapshot: bodies,
            date,
            file_watcher: watcher,
            file_receiver: rx,
            needs_reload: false,
        }
    }

    fn check_file_changes(&mut self) {
        while let Ok(event) = self.file_receiver.try_recv() {
            match event {
                Ok(Event {
                    kind: notify::EventKind::Modify(_),
                    paths,
                    ..
                }) => {
                    if paths.iter().any(|p| same_file(p, &self.ephemeris_path)) {
                        self.needs_reload = true;
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "file watcher error"),
            }
        }

        // Wait for a running fast-forward to finish before swapping the state
        if self.needs_reload && !self.clock.is_computing() {
            self.reload();
            self.needs_reload = false;
        }
    }

    fn reload(&mut self) {
        let ephemeris = match load_ephemeris(&self.ephemeris_path) {
            Ok(ephemeris) => ephemeris,
            Err(e) => {
                warn!(error = %e, "reload failed, keeping current simulation");
                self.message = Some(e.to_string());
                return;
            }
        };
        let (bodies, date) = build_bodies(&ephemeris, self.config.data.selection);
        match self.clock.reset(bodies.clone(), date) {
            Ok(()) => {
                info!(path = %self.ephemeris_path.display(), "initial conditions reloaded");
                self.snapshot = bodies;
                self.date = date;
                self.message = None;
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    fn press_play_pause(&mut self) {
        if let Err(e) = self.clock.toggle_running() {
            self.message = Some(clock_message(&e));
        }
    }

    fn press_set_date(&mut self) {
        let target = match validate_target_date(&self.year, &self.month, &self.day) {
            Ok(target) => target,
            Err(e) => {
                self.message = Some(e.to_string());
                return;
            }
        };
        match self.clock.start_fast_forward(target) {
            Ok(()) => self.message = None,
            Err(e) => self.message = Some(clock_message(&e)),
        }
    }

    fn press_set_speed(&mut self) {
        match parse_speed(&self.speed_text) {
            Ok(speed) => {
                self.clock.set_speed(speed);
                self.message = None;
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    fn press_set_steps(&mut self) {
        match parse_steps_per_frame(&self.steps_text) {
            Ok(steps) => {
                self.clock.set_steps_per_frame(steps);
                self.steps_text = steps.to_string();
                self.message = None;
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    fn advance_clock(&mut self, dt: f32) {
        let elapsed = Duration::try_from_secs_f32(dt).unwrap_or_default();
        match self.clock.tick(elapsed, &self.projection) {
            Ok(outcome) => {
                if let Some(report) = outcome.fast_forward {
                    self.set_date_fields(report.date);
                }
            }
            Err(e) => self.message = Some(clock_message(&e)),
        }

        // try_lock fails while a fast-forward runs; keep the previous frame then
        if let Some((bodies, date)) = self.clock.with_state(|s| (s.bodies.clone(), s.date)) {
            self.snapshot = bodies;
            self.date = date;
        }
    }

    fn set_date_fields(&mut self, date: NaiveDate) {
        self.year = date.year().to_string();
        self.month = date.month().to_string();
        self.day = date.day().to_string();
    }

    fn status_text(&self) -> String {
        match self.clock.status() {
            ClockStatus::Running => "Running".to_string(),
            ClockStatus::Paused => "Paused".to_string(),
            ClockStatus::Computing { progress } => format!("Computing... {:.0}%", progress * 100.0),
            ClockStatus::Faulted => "Halted".to_string(),
        }
    }

    fn navigation(&mut self, ui: &mut egui::Ui) {
        let computing = self.clock.is_computing();
        let play_label = if self.clock.is_running() { "⏸ Pause" } else { "▶ Play" };
        if ui.add_enabled(!computing, egui::Button::new(play_label)).clicked() {
            self.press_play_pause();
        }
        if ui.add_enabled(!computing, egui::Button::new("⏭ Step")).clicked() {
            if let Err(e) = self.clock.step_frame(&self.projection) {
                self.message = Some(clock_message(&e));
            }
        }
        ui.label(self.status_text());

        ui.separator();
        ui.label(self.date.format("%Y-%m-%d").to_string());
        for (label, text) in [
            ("Year", &mut self.year),
            ("Month", &mut self.month),
            ("Day", &mut self.day),
        ] {
            ui.label(label);
            ui.text_edit_singleline(text);
        }
        if ui.add_enabled(!computing, egui::Button::new("Set date")).clicked() {
            self.press_set_date();
        }
        if let ClockStatus::Computing { progress } = self.clock.status() {
            ui.add(egui::ProgressBar::new(progress as f32).show_percentage());
        }
        if let Some(message) = &self.message {
            ui.label(egui::RichText::new(message).color(egui::Color32::RED));
        }

        ui.separator();
        ui.label("Speed");
        ui.text_edit_singleline(&mut self.speed_text);
        if ui.button("Set").clicked() {
            self.press_set_speed();
        }
        ui.label("Days per frame");
        ui.text_edit_singleline(&mut self.steps_text);
        if ui.button("Set").clicked() {
            self.press_set_steps();
        }
    }

    fn canvas(&self, ui: &mut egui::Ui) {
        let height = ui.ctx().screen_rect().height();
        let painter = ui.painter();
        // Projected points are y-up window pixels
        let to_screen = |p: glam::Vec2| egui::pos2(p.x, height - p.y);

        for (trail, body) in self.clock.history().trails().iter().zip(&self.snapshot) {
            if trail.len() < 2 {
                continue;
            }
            let points: Vec<egui::Pos2> = trail.points().map(to_screen).collect();
            painter.add(egui::Shape::line(points, egui::Stroke::new(TRAIL_WIDTH, color(body))));
        }

        let origin = self.snapshot.first().map_or(glam::DVec3::ZERO, |b| b.position);
        for body in &self.snapshot {
            let center = to_screen(self.projection.project(body.position, origin));
            painter.circle_filled(center, body.radius_px, color(body));
            painter.text(
                center + egui::vec2(0.0, body.radius_px + 4.0),
                egui::Align2::CENTER_TOP,
                &body.name,
                egui::FontId::proportional(11.0),
                egui::Color32::WHITE,
            );
        }

        let params = self.clock.params();
        painter.text(
            egui::pos2(self.config.view.navigation_width as f32 + 8.0, height - 8.0),
            egui::Align2::LEFT_BOTTOM,
            format!(
                "Target animation speed: {} frames/s   Elapsed days per frame: {}",
                format_number(params.speed),
                params.steps_per_frame
            ),
            egui::FontId::proportional(12.0),
            egui::Color32::LIGHT_GRAY,
        );
    }
}

impl eframe::App for OrreryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_file_changes();
        self.advance_clock(ctx.input(|i| i.stable_dt));

        egui::SidePanel::left("navigation")
            .exact_width(self.config.view.navigation_width as f32)
            .resizable(false)
            .show(ctx, |ui| self.navigation(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(BACKGROUND))
            .show(ctx, |ui| self.canvas(ui));

        // The clock runs off the frame loop, so keep it turning
        ctx.request_repaint();
    }
}

fn color(body: &Body) -> egui::Color32 {
    let [r, g, b] = body.color;
    egui::Color32::from_rgb(r, g, b)
}

fn clock_message(e: &ClockError) -> String {
    match e {
        ClockError::FastForwardInProgress => "Please wait for the computation to finish".to_string(),
        other => other.to_string(),
    }
}

/// `60` rather than `60.0` for whole numbers
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    a == b || a.canonicalize().map_or(false, |a| a == b)
}
