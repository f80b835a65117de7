//! Haptic session: single-active-pattern playback with a replay cooldown.
//!
//! One `HapticSession` is owned by the engine actor for the lifetime of the
//! process. Starting a pattern is a single stop-then-start step on `&mut
//! self`, so two players are never considered active at once. The active
//! texture is published on a watch channel for the feedback badge.

use crate::device::{DeviceEvent, HapticDevice, PatternPlayer, IMMEDIATE};
use phantom_shared::{HapticPattern, PainTexture};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Minimum interval between accepted play requests
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(50);

/// What happened to a play request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayOutcome {
    /// No haptic engine; request ignored
    Unavailable,
    /// Inside the cooldown window; request ignored
    Throttled,
    /// Pattern is playing. `generation` identifies it for `finish`.
    Started { generation: u64, duration: Duration },
    /// Device refused the pattern; nothing is playing
    Failed,
}

impl PlayOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, PlayOutcome::Started { .. })
    }
}

pub struct HapticSession {
    device: Box<dyn HapticDevice>,
    running: bool,
    player: Option<Box<dyn PatternPlayer>>,
    last_texture: Option<PainTexture>,
    last_played_at: Option<Instant>,
    cooldown: Duration,
    generation: u64,
    active_tx: watch::Sender<Option<PainTexture>>,
}

impl HapticSession {
    pub fn new(device: Box<dyn HapticDevice>, cooldown: Duration) -> Self {
        let (active_tx, _) = watch::channel(None);
        Self {
            device,
            running: false,
            player: None,
            last_texture: None,
            last_played_at: None,
            cooldown,
            generation: 0,
            active_tx,
        }
    }

    /// Start the haptic engine. Returns whether it is ready to play.
    pub fn prepare(&mut self) -> bool {
        if !self.device.supports_haptics() {
            warn!("Haptics not supported, playback disabled");
            self.running = false;
            return false;
        }

        match self.device.start() {
            Ok(()) => {
                self.running = true;
                debug!("Haptic engine ready");
            }
            Err(e) => {
                self.running = false;
                warn!("Haptic engine start failed: {}", e);
            }
        }
        self.running
    }

    /// Hardware capability, queryable before `prepare`
    pub fn is_available(&self) -> bool {
        self.device.supports_haptics()
    }

    /// Engine prepared and running
    pub fn is_ready(&self) -> bool {
        self.running
    }

    pub fn active_texture(&self) -> Option<PainTexture> {
        *self.active_tx.borrow()
    }

    pub fn last_texture(&self) -> Option<PainTexture> {
        self.last_texture
    }

    pub fn has_active_player(&self) -> bool {
        self.player.is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<PainTexture>> {
        self.active_tx.subscribe()
    }

    pub fn play(&mut self, texture: PainTexture, intensity: f32) -> PlayOutcome {
        self.play_at(texture, intensity, Instant::now())
    }

    /// Play `texture` as if requested at `now`
    pub fn play_at(&mut self, texture: PainTexture, intensity: f32, now: Instant) -> PlayOutcome {
        if !self.running {
            debug!("Haptics unavailable, ignoring {} pattern", texture);
            return PlayOutcome::Unavailable;
        }

        if let Some(last) = self.last_played_at {
            if now.saturating_duration_since(last) < self.cooldown {
                debug!("Haptic cooldown active, dropping {} pattern", texture);
                return PlayOutcome::Throttled;
            }
        }
        self.last_played_at = Some(now);

        let pattern = HapticPattern::for_texture(texture, intensity);
        self.halt_player();

        let started = self
            .device
            .make_player(&pattern)
            .and_then(|mut player| player.start(IMMEDIATE).map(|()| player));

        match started {
            Ok(player) => {
                self.player = Some(player);
                self.last_texture = Some(texture);
                self.generation += 1;
                self.active_tx.send_replace(Some(texture));
                PlayOutcome::Started {
                    generation: self.generation,
                    duration: Duration::from_secs_f64(pattern.duration()),
                }
            }
            Err(e) => {
                warn!("Haptic pattern failed: {}", e);
                self.active_tx.send_replace(None);
                PlayOutcome::Failed
            }
        }
    }

    /// Pattern `generation` ran to completion. Ignored if superseded.
    pub fn finish(&mut self, generation: u64) {
        if generation != self.generation || self.player.is_none() {
            return;
        }
        self.player = None;
        self.active_tx.send_replace(None);
    }

    /// Halt the active pattern immediately
    pub fn stop(&mut self) {
        self.halt_player();
        self.active_tx.send_replace(None);
    }

    /// Stop playback and tear down the engine
    pub fn shutdown(&mut self) {
        self.stop();
        if self.running {
            self.device.stop();
            self.running = false;
            info!("Haptic engine shut down");
        }
    }

    /// Recover from an asynchronous device notification
    pub fn handle_device_event(&mut self, event: DeviceEvent) {
        // Players do not survive either event
        self.player = None;
        self.active_tx.send_replace(None);

        match event {
            DeviceEvent::Stopped { reason } => {
                info!("Haptic engine stopped ({}), restarting", reason);
                self.prepare();
            }
            DeviceEvent::Reset => {
                info!("Haptic engine reset, re-arming");
                match self.device.start() {
                    Ok(()) => self.running = true,
                    Err(e) => {
                        self.running = false;
                        warn!("Haptic engine restart failed: {}", e);
                    }
                }
            }
        }
    }

    fn halt_player(&mut self) {
        if let Some(mut player) = self.player.take() {
            if let Err(e) = player.stop(IMMEDIATE) {
                debug!("Stopping previous pattern: {}", e);
            }
        }
    }
}
