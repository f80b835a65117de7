//! Haptic hardware abstraction.
//!
//! The engine drives hardware only through `HapticDevice` and the players it
//! hands out. `SimulatedDevice` logs what it would play; `RecordingDevice`
//! records every call for tests and tracks how many players are running.

use phantom_shared::{HapticPattern, PhantomError};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// Start/stop time meaning "now"
pub const IMMEDIATE: f64 = 0.0;

// ============================================================================
// Device Traits
// ============================================================================

/// A prepared pattern on the device
pub trait PatternPlayer: Send {
    fn start(&mut self, at: f64) -> Result<(), PhantomError>;
    fn stop(&mut self, at: f64) -> Result<(), PhantomError>;
}

/// Haptic hardware capability
pub trait HapticDevice: Send {
    /// Whether the hardware can play patterns at all
    fn supports_haptics(&self) -> bool;

    /// Start (or restart) the underlying engine
    fn start(&mut self) -> Result<(), PhantomError>;

    /// Tear down the underlying engine
    fn stop(&mut self);

    fn make_player(&mut self, pattern: &HapticPattern) -> Result<Box<dyn PatternPlayer>, PhantomError>;
}

/// Asynchronous notifications from the hardware
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// Engine stopped on its own (audio session interruption, idle, ...)
    Stopped { reason: String },
    /// Engine server reset; all players are invalid
    Reset,
}

// ============================================================================
// Simulated Device (Production default)
// ============================================================================

/// Device that logs patterns instead of vibrating
#[derive(Debug)]
pub struct SimulatedDevice {
    supported: bool,
    running: bool,
}

impl SimulatedDevice {
    pub fn new() -> Self {
        Self {
            supported: true,
            running: false,
        }
    }

    /// A device without haptic capability; every play becomes a no-op
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            running: false,
        }
    }
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HapticDevice for SimulatedDevice {
    fn supports_haptics(&self) -> bool {
        self.supported
    }

    fn start(&mut self) -> Result<(), PhantomError> {
        if !self.supported {
            return Err(PhantomError::HapticsUnavailable);
        }
        self.running = true;
        info!("Simulated haptic engine started");
        Ok(())
    }

    fn stop(&mut self) {
        if self.running {
            info!("Simulated haptic engine stopped");
        }
        self.running = false;
    }

    fn make_player(&mut self, pattern: &HapticPattern) -> Result<Box<dyn PatternPlayer>, PhantomError> {
        if !self.running {
            return Err(PhantomError::Haptics("engine not running".to_string()));
        }
        Ok(Box::new(SimulatedPlayer {
            pattern: pattern.clone(),
        }))
    }
}

struct SimulatedPlayer {
    pattern: HapticPattern,
}

impl PatternPlayer for SimulatedPlayer {
    fn start(&mut self, at: f64) -> Result<(), PhantomError> {
        info!(
            texture = %self.pattern.texture,
            events = self.pattern.events.len(),
            duration = self.pattern.duration(),
            "Playing haptic pattern at t={:.2}",
            at
        );
        Ok(())
    }

    fn stop(&mut self, at: f64) -> Result<(), PhantomError> {
        debug!(texture = %self.pattern.texture, "Stopping haptic pattern at t={:.2}", at);
        Ok(())
    }
}

// ============================================================================
// Recording Device (Testing)
// ============================================================================

/// Everything a `RecordingDevice` has been asked to do
#[derive(Debug, Default, Clone)]
pub struct DeviceLog {
    pub engine_starts: usize,
    pub engine_stops: usize,
    /// Patterns in the order players were made
    pub patterns: Vec<HapticPattern>,
    pub player_starts: usize,
    pub player_stops: usize,
    /// Players started and not yet stopped or dropped
    pub active_players: usize,
    pub max_concurrent_players: usize,
}

/// Test device that records calls into a shared log
#[derive(Debug, Clone)]
pub struct RecordingDevice {
    log: Arc<Mutex<DeviceLog>>,
    supported: bool,
    fail_start: bool,
    running: bool,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(DeviceLog::default())),
            supported: true,
            fail_start: false,
            running: false,
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Hardware present but the engine refuses to start
    pub fn failing_start() -> Self {
        Self {
            fail_start: true,
            ..Self::new()
        }
    }

    /// Shared handle to the log; stays valid after the device is moved
    pub fn log_handle(&self) -> Arc<Mutex<DeviceLog>> {
        Arc::clone(&self.log)
    }

    /// Copy of the current log
    pub fn snapshot(handle: &Arc<Mutex<DeviceLog>>) -> DeviceLog {
        lock(handle).clone()
    }
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new()
    }
}

fn lock(log: &Arc<Mutex<DeviceLog>>) -> MutexGuard<'_, DeviceLog> {
    // A poisoned log only means a test panicked mid-write; keep reading it
    log.lock().unwrap_or_else(|e| e.into_inner())
}

impl HapticDevice for RecordingDevice {
    fn supports_haptics(&self) -> bool {
        self.supported
    }

    fn start(&mut self) -> Result<(), PhantomError> {
        if !self.supported {
            return Err(PhantomError::HapticsUnavailable);
        }
        if self.fail_start {
            return Err(PhantomError::Haptics("engine failed to start".to_string()));
        }
        lock(&self.log).engine_starts += 1;
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        lock(&self.log).engine_stops += 1;
        self.running = false;
    }

    fn make_player(&mut self, pattern: &HapticPattern) -> Result<Box<dyn PatternPlayer>, PhantomError> {
        if !self.running {
            return Err(PhantomError::Haptics("engine not running".to_string()));
        }
        lock(&self.log).patterns.push(pattern.clone());
        Ok(Box::new(RecordingPlayer {
            log: Arc::clone(&self.log),
            started: false,
        }))
    }
}

struct RecordingPlayer {
    log: Arc<Mutex<DeviceLog>>,
    started: bool,
}

impl RecordingPlayer {
    fn release(&mut self) {
        if self.started {
            self.started = false;
            let mut log = lock(&self.log);
            log.active_players = log.active_players.saturating_sub(1);
        }
    }
}

impl PatternPlayer for RecordingPlayer {
    fn start(&mut self, _at: f64) -> Result<(), PhantomError> {
        let mut log = lock(&self.log);
        log.player_starts += 1;
        if !self.started {
            self.started = true;
            log.active_players += 1;
            log.max_concurrent_players = log.max_concurrent_players.max(log.active_players);
        }
        Ok(())
    }

    fn stop(&mut self, _at: f64) -> Result<(), PhantomError> {
        lock(&self.log).player_stops += 1;
        self.release();
        Ok(())
    }
}

impl Drop for RecordingPlayer {
    fn drop(&mut self) {
        self.release();
    }
}
