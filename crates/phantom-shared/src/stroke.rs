//! Stroke: one captured pain point.

use crate::texture::PainTexture;
use crate::Position;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_PRESSURE: f32 = 0.1;
pub const MAX_PRESSURE: f32 = 1.0;

/// Clamp a raw pressure into [MIN_PRESSURE, MAX_PRESSURE].
/// NaN (a broken force reading) is treated as the minimum.
pub fn clamp_pressure(raw: f32) -> f32 {
    if raw.is_nan() {
        return MIN_PRESSURE;
    }
    raw.clamp(MIN_PRESSURE, MAX_PRESSURE)
}

/// Immutable pain point bound to a body region and texture.
///
/// The id exists only so list views can diff strokes; nothing in the
/// engine depends on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    id: Uuid,
    location: Position,
    texture: PainTexture,
    pressure: f32,
    region: String,
}

impl Stroke {
    /// Build a stroke; pressure is clamped before storage
    pub fn new(location: Position, texture: PainTexture, pressure: f32, region: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            location,
            texture,
            pressure: clamp_pressure(pressure),
            region: region.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Avatar-local location
    pub fn location(&self) -> &Position {
        &self.location
    }

    pub fn texture(&self) -> PainTexture {
        self.texture
    }

    pub fn pressure(&self) -> f32 {
        self.pressure
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Euclidean distance from this stroke to a point
    pub fn distance_to(&self, position: &Position) -> f32 {
        nalgebra::distance(&self.location, position)
    }
}
