//! Body region classifier.
//!
//! Maps a surface hit to one of a fixed set of coarse anatomical labels.
//! Named avatar parts map directly; anything else (paint marks, halos,
//! unknown entities) is classified from its avatar-local position using
//! vertical bands on y and a left/right split on x.

use crate::mark;
use crate::Position;

/// Half-width of the sagittal zone where no side prefix is applied
pub const SIDE_THRESHOLD: f32 = 0.05;

/// One entry in the avatar part table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnatomicalPart {
    /// Entity identifier as named in the avatar scene
    pub id: &'static str,
    /// Region label reported for hits on this part
    pub label: &'static str,
    /// Resting centre of the part in avatar-local space
    pub center: [f32; 3],
}

const fn part(id: &'static str, label: &'static str, center: [f32; 3]) -> AnatomicalPart {
    AnatomicalPart { id, label, center }
}

/// Avatar part table. Identifiers are matched exactly (case and side).
pub const ANATOMICAL_PARTS: &[AnatomicalPart] = &[
    part("head", "Head", [0.0, 0.78, 0.0]),
    part("neck", "Neck", [0.0, 0.65, 0.0]),
    part("upperTorso", "Upper Torso", [0.0, 0.50, 0.0]),
    part("lowerTorso", "Lower Torso", [0.0, 0.32, 0.0]),
    part("pelvis", "Pelvis", [0.0, 0.18, 0.0]),
    part("leftShoulder", "Left Shoulder", [-0.19, 0.58, 0.0]),
    part("rightShoulder", "Right Shoulder", [0.19, 0.58, 0.0]),
    part("leftUpperArm", "Left Upper Arm", [-0.22, 0.43, 0.0]),
    part("rightUpperArm", "Right Upper Arm", [0.22, 0.43, 0.0]),
    part("leftForearm", "Left Forearm", [-0.22, 0.23, 0.0]),
    part("rightForearm", "Right Forearm", [0.22, 0.23, 0.0]),
    part("leftUpperLeg", "Left Upper Leg", [-0.09, -0.01, 0.0]),
    part("rightUpperLeg", "Right Upper Leg", [0.09, -0.01, 0.0]),
    part("leftLowerLeg", "Left Lower Leg", [-0.09, -0.30, 0.0]),
    part("rightLowerLeg", "Right Lower Leg", [0.09, -0.30, 0.0]),
];

/// Look up a named avatar part
pub fn part_named(id: &str) -> Option<&'static AnatomicalPart> {
    ANATOMICAL_PARTS.iter().find(|p| p.id == id)
}

/// Classify a hit by entity name, falling back to position.
///
/// Self-generated artifacts (paint marks, halos, hover preview) are never
/// treated as named parts, so touching an earlier mark classifies the
/// underlying body location instead.
pub fn classify(named: Option<&str>, position: &Position) -> String {
    match named {
        Some(name) if !mark::is_artifact(name) => match part_named(name) {
            Some(part) => part.label.to_string(),
            None => region_from_position(position),
        },
        _ => region_from_position(position),
    }
}

/// Position-only classification.
///
/// Bands are checked top-down with strict `>` thresholds, so each y maps to
/// exactly one band. Torso and pelvis bands never carry a side.
pub fn region_from_position(position: &Position) -> String {
    let y = position.y;
    let side = side_prefix(position.x);

    if y > 0.65 {
        "Head".to_string()
    } else if y > 0.55 {
        sided(side, "Shoulder")
    } else if y > 0.35 {
        "Upper Torso".to_string()
    } else if y > 0.20 {
        "Lower Torso".to_string()
    } else if y > 0.10 {
        "Pelvis".to_string()
    } else if y > -0.10 {
        sided(side, "Hip")
    } else if y > -0.30 {
        sided(side, "Upper Leg")
    } else {
        sided(side, "Lower Leg")
    }
}

fn side_prefix(x: f32) -> Option<&'static str> {
    if x < -SIDE_THRESHOLD {
        Some("Left")
    } else if x > SIDE_THRESHOLD {
        Some("Right")
    } else {
        None
    }
}

fn sided(side: Option<&str>, base: &str) -> String {
    match side {
        Some(side) => format!("{} {}", side, base),
        None => base.to_string(),
    }
}
