//! Pain engine: the single owner of session, capture, haptics and reports.
//!
//! Every method takes `&mut self`, so all mutation is serialized by whoever
//! owns the engine (the actor in `actor.rs`).

use crate::capture::{resolve_pressure, StrokeCapture, SurfaceHit, TouchForce};
use crate::config::Config;
use crate::device::{DeviceEvent, HapticDevice};
use crate::haptics::{HapticSession, PlayOutcome};
use crate::model::ReportModel;
use crate::reporter::ReportGenerator;
use phantom_shared::{clamp_pressure, PainTexture, Position, Session, SessionSnapshot, Stroke};
use std::sync::Arc;
use tracing::{debug, info};

pub struct PainEngine {
    session: Session,
    capture: StrokeCapture,
    haptics: HapticSession,
    reporter: ReportGenerator,
    slider_pressure: f32,
    hover_threshold: f32,
}

impl PainEngine {
    pub fn new(
        config: &Config,
        device: Box<dyn HapticDevice>,
        model: Option<Arc<dyn ReportModel>>,
    ) -> Self {
        let capture = StrokeCapture::new(
            config.capture.max_strokes,
            config.capture.min_stroke_distance,
        );
        let haptics = HapticSession::new(device, config.haptics.cooldown());
        let reporter = ReportGenerator::new(
            model,
            config.report.model_timeout(),
            config.report.fallback_delay(),
        );

        Self {
            session: Session::new(),
            capture,
            haptics,
            reporter,
            slider_pressure: clamp_pressure(config.capture.default_slider_pressure),
            hover_threshold: config.session.hover_threshold,
        }
    }

    /// Bring up the haptic engine. Returns whether haptics are ready.
    pub fn prepare(&mut self) -> bool {
        let ready = self.haptics.prepare();
        info!(
            haptics = ready,
            model = self.reporter.has_model(),
            "Pain engine prepared"
        );
        ready
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn haptics(&self) -> &HapticSession {
        &self.haptics
    }

    pub fn reporter(&self) -> &ReportGenerator {
        &self.reporter
    }

    pub fn slider_pressure(&self) -> f32 {
        self.slider_pressure
    }

    pub fn set_slider_pressure(&mut self, pressure: f32) {
        self.slider_pressure = clamp_pressure(pressure);
    }

    /// Capture a touch. A miss, a full session or a too-close hit is a no-op.
    pub fn capture(
        &mut self,
        hit: Option<&SurfaceHit>,
        texture: PainTexture,
        touch: Option<TouchForce>,
    ) -> Option<Stroke> {
        let Some(hit) = hit else {
            debug!("Touch missed the avatar");
            return None;
        };

        let pressure = resolve_pressure(touch, self.slider_pressure);
        let stroke = self.capture.capture(&self.session, hit, texture, pressure)?;
        debug!(
            region = stroke.region(),
            texture = %texture,
            pressure = stroke.pressure(),
            "Stroke captured"
        );
        self.session.add_stroke(stroke.clone());
        Some(stroke)
    }

    pub fn clear(&mut self) {
        self.session.clear();
        self.capture.restart(None);
        self.reporter.reset();
        info!("Session cleared");
    }

    pub fn load_demo(&mut self) {
        self.session.load_demo();
        self.capture
            .restart(self.session.last().map(|stroke| *stroke.location()));
        self.reporter.reset();
        info!("Loaded demo session ({} strokes)", self.session.len());
    }

    pub fn play(&mut self, texture: PainTexture, intensity: f32) -> PlayOutcome {
        self.haptics.play(texture, intensity)
    }

    /// Replay the stroke nearest to `position`, if one is within the hover
    /// threshold
    pub fn replay_at(&mut self, position: &Position) -> Option<(Stroke, PlayOutcome)> {
        let stroke = self
            .session
            .nearest_stroke(position, self.hover_threshold)?
            .clone();
        let outcome = self.haptics.play(stroke.texture(), stroke.pressure());
        Some((stroke, outcome))
    }

    pub fn stop_haptics(&mut self) {
        self.haptics.stop();
    }

    pub fn finish_pattern(&mut self, generation: u64) {
        self.haptics.finish(generation);
    }

    pub fn handle_device_event(&mut self, event: DeviceEvent) {
        self.haptics.handle_device_event(event);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn shutdown(&mut self) {
        self.reporter.cancel();
        self.haptics.shutdown();
    }
}
