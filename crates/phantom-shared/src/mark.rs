//! Paint-mark artifact naming and sizing.
//!
//! Marks and halos are scene entities the renderer creates for each stored
//! stroke; the raycaster can hit them, so their names must be recognisable.
//! The engine only uses `is_artifact` when classifying hits. The naming,
//! anchor and radius helpers are for the renderer placing marks.

use crate::texture::PainTexture;
use crate::Position;
use nalgebra::Vector3;

pub const MARK_PREFIX: &str = "paintMark";
pub const HALO_PREFIX: &str = "paintHalo";
pub const HOVER_PREVIEW_NAME: &str = "hoverPreview";

/// Distance a mark floats above the surface along the hit normal
pub const MARK_SURFACE_OFFSET: f32 = 0.005;

const MARK_BASE_RADIUS: f32 = 0.012;
const HALO_BASE_RADIUS: f32 = 0.022;

pub fn mark_name(texture: PainTexture) -> String {
    format!("{}_{}", MARK_PREFIX, texture.key())
}

pub fn halo_name(texture: PainTexture) -> String {
    format!("{}_{}", HALO_PREFIX, texture.key())
}

/// True if the entity name belongs to something the engine drew
pub fn is_artifact(name: &str) -> bool {
    name.starts_with(MARK_PREFIX) || name.starts_with(HALO_PREFIX) || name == HOVER_PREVIEW_NAME
}

/// Where a mark is anchored for a hit at `position` with surface `normal`
pub fn mark_anchor(position: &Position, normal: &Vector3<f32>) -> Position {
    position + normal * MARK_SURFACE_OFFSET
}

pub fn mark_radius(pressure: f32) -> f32 {
    MARK_BASE_RADIUS * pressure_scale(pressure)
}

pub fn halo_radius(pressure: f32) -> f32 {
    HALO_BASE_RADIUS * pressure_scale(pressure)
}

fn pressure_scale(pressure: f32) -> f32 {
    0.6 + pressure * 0.6
}
