//! Engine actor and its handle.
//!
//! A single task owns the `PainEngine`; everything else talks to it through
//! a cloneable `EngineHandle`. Replies travel back on oneshot channels.
//! Device notifications arrive on their own channel and are handled in the
//! same loop. Report generation runs in a spawned task so haptics stay
//! responsive while a model call is pending.

use crate::capture::{Raycaster, SurfaceHit, TouchForce};
use crate::device::DeviceEvent;
use crate::engine::PainEngine;
use crate::haptics::PlayOutcome;
use crate::reporter::{GeneratedReport, ReportGenerator, ReportState};
use nalgebra::Point2;
use phantom_shared::{PainTexture, PhantomError, Position, SessionSnapshot, Stroke};
use serde::Serialize;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

const COMMAND_BUFFER: usize = 64;
const DEVICE_EVENT_BUFFER: usize = 8;

/// Point-in-time engine status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStatus {
    pub haptics_available: bool,
    pub haptics_ready: bool,
    pub active_texture: Option<PainTexture>,
    pub stroke_count: usize,
    pub slider_pressure: f32,
    pub model_configured: bool,
}

enum Command {
    Capture {
        hit: Option<SurfaceHit>,
        texture: PainTexture,
        touch: Option<TouchForce>,
        reply: oneshot::Sender<Option<Stroke>>,
    },
    SetSliderPressure(f32),
    Clear,
    LoadDemo,
    Play {
        texture: PainTexture,
        intensity: f32,
        reply: oneshot::Sender<PlayOutcome>,
    },
    ReplayAt {
        position: Position,
        reply: oneshot::Sender<Option<(Stroke, PlayOutcome)>>,
    },
    StopHaptics,
    PatternFinished(u64),
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Strokes(oneshot::Sender<Vec<Stroke>>),
    Status(oneshot::Sender<EngineStatus>),
    GenerateReport(oneshot::Sender<GeneratedReport>),
    CancelReport,
    Shutdown(oneshot::Sender<()>),
}

#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<Command>,
    device_tx: mpsc::Sender<DeviceEvent>,
    active_rx: watch::Receiver<Option<PainTexture>>,
    report_rx: watch::Receiver<ReportState>,
    /// Cancels directly when the command queue is full
    reporter: ReportGenerator,
}

/// Prepare the engine and start its actor task
pub fn spawn(mut engine: PainEngine) -> EngineHandle {
    engine.prepare();

    let (tx, commands) = mpsc::channel(COMMAND_BUFFER);
    let (device_tx, device_events) = mpsc::channel(DEVICE_EVENT_BUFFER);
    let handle = EngineHandle {
        active_rx: engine.haptics().subscribe(),
        report_rx: engine.reporter().subscribe(),
        reporter: engine.reporter().clone(),
        device_tx,
        tx: tx.clone(),
    };

    tokio::spawn(run(engine, commands, device_events, tx.downgrade()));
    handle
}

async fn run(
    mut engine: PainEngine,
    mut commands: mpsc::Receiver<Command>,
    mut device_events: mpsc::Receiver<DeviceEvent>,
    self_tx: mpsc::WeakSender<Command>,
) {
    info!("Pain engine actor started");
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => {
                    if !handle_command(&mut engine, command, &self_tx) {
                        break;
                    }
                }
                None => {
                    engine.shutdown();
                    break;
                }
            },
            Some(event) = device_events.recv() => engine.handle_device_event(event),
        }
    }
    info!("Pain engine actor stopped");
}

/// Apply one command. Returns false once the actor should stop.
fn handle_command(
    engine: &mut PainEngine,
    command: Command,
    self_tx: &mpsc::WeakSender<Command>,
) -> bool {
    match command {
        Command::Capture {
            hit,
            texture,
            touch,
            reply,
        } => {
            let _ = reply.send(engine.capture(hit.as_ref(), texture, touch));
        }
        Command::SetSliderPressure(pressure) => engine.set_slider_pressure(pressure),
        Command::Clear => engine.clear(),
        Command::LoadDemo => engine.load_demo(),
        Command::Play {
            texture,
            intensity,
            reply,
        } => {
            let outcome = engine.play(texture, intensity);
            schedule_finish(self_tx, outcome);
            let _ = reply.send(outcome);
        }
        Command::ReplayAt { position, reply } => {
            let replayed = engine.replay_at(&position);
            if let Some((_, outcome)) = &replayed {
                schedule_finish(self_tx, *outcome);
            }
            let _ = reply.send(replayed);
        }
        Command::StopHaptics => engine.stop_haptics(),
        Command::PatternFinished(generation) => engine.finish_pattern(generation),
        Command::Snapshot(reply) => {
            let _ = reply.send(engine.snapshot());
        }
        Command::Strokes(reply) => {
            let _ = reply.send(engine.session().strokes().to_vec());
        }
        Command::Status(reply) => {
            let _ = reply.send(EngineStatus {
                haptics_available: engine.haptics().is_available(),
                haptics_ready: engine.haptics().is_ready(),
                active_texture: engine.haptics().active_texture(),
                stroke_count: engine.session().len(),
                slider_pressure: engine.slider_pressure(),
                model_configured: engine.reporter().has_model(),
            });
        }
        Command::GenerateReport(reply) => {
            let generator = engine.reporter().clone();
            let snapshot = engine.snapshot();
            // Claimed here so a Clear or CancelReport queued behind us applies
            let ticket = generator.begin();
            tokio::spawn(async move {
                let generated = generator.run(ticket, &snapshot).await;
                let _ = reply.send(generated);
            });
        }
        Command::CancelReport => engine.reporter().cancel(),
        Command::Shutdown(reply) => {
            engine.shutdown();
            let _ = reply.send(());
            return false;
        }
    }
    true
}

/// Clear the active texture once the pattern has had time to play out
fn schedule_finish(self_tx: &mpsc::WeakSender<Command>, outcome: PlayOutcome) {
    let PlayOutcome::Started {
        generation,
        duration,
    } = outcome
    else {
        return;
    };
    let tx = self_tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        if let Some(tx) = tx.upgrade() {
            let _ = tx.send(Command::PatternFinished(generation)).await;
        }
    });
}

impl EngineHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, PhantomError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| PhantomError::EngineStopped)?;
        rx.await.map_err(|_| PhantomError::EngineStopped)
    }

    async fn send(&self, command: Command) -> Result<(), PhantomError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| PhantomError::EngineStopped)
    }

    /// Capture a resolved surface hit (`None` is a raycast miss)
    pub async fn capture(
        &self,
        hit: Option<SurfaceHit>,
        texture: PainTexture,
        touch: Option<TouchForce>,
    ) -> Result<Option<Stroke>, PhantomError> {
        self.request(|reply| Command::Capture {
            hit,
            texture,
            touch,
            reply,
        })
        .await
    }

    /// Raycast a screen point, then capture whatever it hit
    pub async fn capture_at(
        &self,
        raycaster: &dyn Raycaster,
        screen: Point2<f32>,
        texture: PainTexture,
        touch: Option<TouchForce>,
    ) -> Result<Option<Stroke>, PhantomError> {
        let hit = raycaster.raycast(screen);
        if hit.is_none() {
            debug!("No surface under ({:.1}, {:.1})", screen.x, screen.y);
        }
        self.capture(hit, texture, touch).await
    }

    pub async fn set_slider_pressure(&self, pressure: f32) -> Result<(), PhantomError> {
        self.send(Command::SetSliderPressure(pressure)).await
    }

    pub async fn clear(&self) -> Result<(), PhantomError> {
        self.send(Command::Clear).await
    }

    pub async fn load_demo(&self) -> Result<(), PhantomError> {
        self.send(Command::LoadDemo).await
    }

    pub async fn play(&self, texture: PainTexture, intensity: f32) -> Result<PlayOutcome, PhantomError> {
        self.request(|reply| Command::Play {
            texture,
            intensity,
            reply,
        })
        .await
    }

    pub async fn replay_at(
        &self,
        position: Position,
    ) -> Result<Option<(Stroke, PlayOutcome)>, PhantomError> {
        self.request(|reply| Command::ReplayAt { position, reply }).await
    }

    pub async fn stop_haptics(&self) -> Result<(), PhantomError> {
        self.send(Command::StopHaptics).await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, PhantomError> {
        self.request(Command::Snapshot).await
    }

    pub async fn strokes(&self) -> Result<Vec<Stroke>, PhantomError> {
        self.request(Command::Strokes).await
    }

    pub async fn status(&self) -> Result<EngineStatus, PhantomError> {
        self.request(Command::Status).await
    }

    /// Generate the end-of-session report. Always resolves to a report.
    pub async fn generate_report(&self) -> Result<GeneratedReport, PhantomError> {
        self.request(Command::GenerateReport).await
    }

    /// Abort a pending model call; the rule-based report is used instead
    ///
    /// Queued behind any report request already sent, so it cannot overtake
    /// the generation it is meant to stop.
    pub fn cancel_report(&self) {
        match self.tx.try_send(Command::CancelReport) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(_)) => self.reporter.cancel(),
        }
    }

    /// Sender for hardware stop/reset notifications
    pub fn device_events(&self) -> mpsc::Sender<DeviceEvent> {
        self.device_tx.clone()
    }

    pub fn active_texture(&self) -> watch::Receiver<Option<PainTexture>> {
        self.active_rx.clone()
    }

    pub fn report_state(&self) -> watch::Receiver<ReportState> {
        self.report_rx.clone()
    }

    pub async fn shutdown(&self) -> Result<(), PhantomError> {
        self.request(Command::Shutdown).await
    }
}
