//! Fixed demonstration corpus for product demos without live capture.
//!
//! The values are canned, not derived from the classifier: several strokes
//! carry arm/forearm labels that only a named-part hit would produce.

use crate::stroke::Stroke;
use crate::texture::PainTexture::{self, Burning, Electric, PinsAndNeedles};
use crate::Position;

pub const DEMO_STROKE_COUNT: usize = 26;

type DemoRow = ([f32; 3], PainTexture, f32, &'static str);

const DEMO_CORPUS: [DemoRow; DEMO_STROKE_COUNT] = [
    // Head
    ([0.0, 0.75, 0.10], Burning, 0.8, "Head"),
    ([0.03, 0.73, 0.09], Burning, 0.7, "Head"),
    ([-0.02, 0.76, 0.10], Burning, 0.65, "Head"),
    // Left arm
    ([-0.22, 0.45, 0.05], Electric, 0.9, "Left Upper Arm"),
    ([-0.22, 0.40, 0.05], Electric, 0.85, "Left Upper Arm"),
    ([-0.22, 0.35, 0.04], Electric, 0.8, "Left Upper Arm"),
    ([-0.22, 0.30, 0.04], Electric, 0.75, "Left Forearm"),
    ([-0.22, 0.25, 0.04], Electric, 0.7, "Left Forearm"),
    // Torso
    ([0.0, 0.50, 0.08], PinsAndNeedles, 0.5, "Upper Torso"),
    ([0.05, 0.48, 0.08], PinsAndNeedles, 0.55, "Upper Torso"),
    ([-0.05, 0.46, 0.07], PinsAndNeedles, 0.5, "Upper Torso"),
    ([0.0, 0.42, 0.07], PinsAndNeedles, 0.6, "Upper Torso"),
    ([0.03, 0.35, 0.07], PinsAndNeedles, 0.5, "Lower Torso"),
    // Right leg
    ([0.10, -0.10, 0.05], Burning, 0.9, "Right Upper Leg"),
    ([0.10, -0.15, 0.05], Burning, 0.85, "Right Upper Leg"),
    ([0.10, -0.20, 0.05], Burning, 0.8, "Right Upper Leg"),
    ([0.10, -0.25, 0.04], Burning, 0.75, "Right Upper Leg"),
    ([0.10, -0.38, 0.04], Electric, 0.6, "Right Lower Leg"),
    ([0.10, -0.42, 0.04], Electric, 0.65, "Right Lower Leg"),
    ([0.10, -0.46, 0.04], Electric, 0.7, "Right Lower Leg"),
    // Right arm
    ([0.22, 0.45, 0.05], PinsAndNeedles, 0.4, "Right Upper Arm"),
    ([0.22, 0.40, 0.05], PinsAndNeedles, 0.45, "Right Upper Arm"),
    // Lower back
    ([0.0, 0.30, 0.07], Burning, 0.6, "Lower Torso"),
    ([-0.04, 0.28, 0.07], Burning, 0.55, "Lower Torso"),
    // Left leg
    ([-0.10, -0.10, 0.05], PinsAndNeedles, 0.5, "Left Upper Leg"),
    ([-0.10, -0.15, 0.05], PinsAndNeedles, 0.55, "Left Upper Leg"),
];

/// Fresh copies of the demo strokes, in corpus order
pub fn demo_strokes() -> Vec<Stroke> {
    DEMO_CORPUS
        .iter()
        .map(|&([x, y, z], texture, pressure, region)| {
            Stroke::new(Position::new(x, y, z), texture, pressure, region)
        })
        .collect()
}
