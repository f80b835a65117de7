//! Shared types and deterministic logic for Phantom components.
//!
//! Everything here is synchronous and pure: texture identities, strokes,
//! region classification, the session aggregator, haptic pattern tables and
//! the rule-based clinical report. Runtime concerns (devices, actors, the
//! external report model) live in `phantomd`.

pub mod demo;
pub mod error;
pub mod haptic_pattern;
pub mod mark;
pub mod region;
pub mod report;
pub mod session;
pub mod snapshot;
pub mod stroke;
pub mod texture;

pub use error::PhantomError;
pub use haptic_pattern::{HapticEvent, HapticEventKind, HapticPattern};
pub use region::{classify, region_from_position, AnatomicalPart, ANATOMICAL_PARTS};
pub use report::{IntensityBand, ReportData};
pub use session::Session;
pub use snapshot::SessionSnapshot;
pub use stroke::{clamp_pressure, Stroke, MAX_PRESSURE, MIN_PRESSURE};
pub use texture::PainTexture;

/// Avatar-local position of a stroke or surface hit.
pub type Position = nalgebra::Point3<f32>;

/// Crate version, shared by the daemon banner and report metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
