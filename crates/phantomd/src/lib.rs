//! Phantom pain mapping engine runtime.
//!
//! Wraps the pure domain logic in `phantom-shared` with the pieces that
//! touch the outside world: configuration, the capture pipeline fed by a
//! raycaster, haptic hardware, the optional report model, and the actor
//! that serializes all of it.

pub mod actor;
pub mod capture;
pub mod config;
pub mod device;
pub mod engine;
pub mod haptics;
pub mod model;
pub mod reporter;

pub use actor::{spawn, EngineHandle, EngineStatus};
pub use capture::{Raycaster, StrokeCapture, SurfaceHit, TouchForce};
pub use config::Config;
pub use device::{DeviceEvent, HapticDevice, PatternPlayer, RecordingDevice, SimulatedDevice};
pub use engine::PainEngine;
pub use haptics::{HapticSession, PlayOutcome};
pub use model::{OllamaReportModel, ReportModel};
pub use reporter::{GeneratedReport, ReportGenerator, ReportState, ReportTicket};
