//! Stroke capture pipeline: raycast hit + texture + pressure -> Stroke.
//!
//! The pipeline never touches the session directly; it reads the stroke
//! count for the cap and hands back a classified stroke for the caller to
//! append. Dedup compares against the last stored stroke only.

use nalgebra::{Point2, Vector3};
use phantom_shared::mark::mark_anchor;
use phantom_shared::{classify, clamp_pressure, PainTexture, Position, Session, Stroke};
use tracing::debug;

/// Default per-session stroke cap
pub const MAX_STROKES: usize = 200;

/// Default minimum spacing between consecutive strokes
pub const MIN_STROKE_DISTANCE: f32 = 0.015;

/// A surface hit reported by the renderer, in avatar-local space
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceHit {
    pub position: Position,
    pub normal: Vector3<f32>,
    pub object_name: String,
}

impl SurfaceHit {
    pub fn new(position: Position, normal: Vector3<f32>, object_name: impl Into<String>) -> Self {
        Self {
            position,
            normal,
            object_name: object_name.into(),
        }
    }

    /// Where a renderer should place the paint mark for this hit, just off
    /// the surface. Not used by capture itself.
    pub fn mark_anchor(&self) -> Position {
        mark_anchor(&self.position, &self.normal)
    }
}

/// Hit-testing collaborator. The engine is agnostic to how hits are found.
pub trait Raycaster: Send + Sync {
    /// Map a 2D screen point to the surface it lands on, if any
    fn raycast(&self, screen: Point2<f32>) -> Option<SurfaceHit>;
}

/// Pointer force as reported by the input device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchForce {
    pub force: f32,
    pub maximum_possible_force: f32,
}

/// Pick the stroke pressure: normalized device force when the device reports
/// a nonzero maximum, otherwise the slider value. Always clamped.
pub fn resolve_pressure(touch: Option<TouchForce>, slider: f32) -> f32 {
    let raw = match touch {
        Some(t) if t.maximum_possible_force > 0.0 => t.force / t.maximum_possible_force,
        _ => slider,
    };
    clamp_pressure(raw)
}

/// Capture state for one session: limits plus the dedup cursor
#[derive(Debug, Clone)]
pub struct StrokeCapture {
    max_strokes: usize,
    min_distance: f32,
    last_position: Option<Position>,
}

impl Default for StrokeCapture {
    fn default() -> Self {
        Self::new(MAX_STROKES, MIN_STROKE_DISTANCE)
    }
}

impl StrokeCapture {
    pub fn new(max_strokes: usize, min_distance: f32) -> Self {
        Self {
            max_strokes,
            min_distance,
            last_position: None,
        }
    }

    pub fn max_strokes(&self) -> usize {
        self.max_strokes
    }

    pub fn last_position(&self) -> Option<&Position> {
        self.last_position.as_ref()
    }

    /// Turn a hit into a stroke, or drop it (cap reached / too close).
    /// Advances the dedup cursor on success.
    pub fn capture(
        &mut self,
        session: &Session,
        hit: &SurfaceHit,
        texture: PainTexture,
        pressure: f32,
    ) -> Option<Stroke> {
        if session.len() >= self.max_strokes {
            debug!("Stroke cap {} reached, dropping capture", self.max_strokes);
            return None;
        }

        if let Some(last) = &self.last_position {
            let distance = nalgebra::distance(last, &hit.position);
            if distance < self.min_distance {
                debug!("Capture {:.4} from previous stroke, deduplicated", distance);
                return None;
            }
        }

        let region = classify(Some(hit.object_name.as_str()), &hit.position);
        let stroke = Stroke::new(hit.position, texture, pressure, region);
        self.last_position = Some(hit.position);
        Some(stroke)
    }

    /// Re-sync the cursor after the session was replaced or cleared
    pub fn restart(&mut self, last: Option<Position>) {
        self.last_position = last;
    }
}
