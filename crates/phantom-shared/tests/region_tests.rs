//! Region classifier tests.
//!
//! Tests verify:
//! - Exact band thresholds (strict `>` comparisons)
//! - Side prefix rules around the sagittal plane
//! - Named parts are stable and exact
//! - Bands never overlap as y decreases

use phantom_shared::region::{classify, part_named, region_from_position, ANATOMICAL_PARTS};
use phantom_shared::Position;

fn at(x: f32, y: f32) -> Position {
    Position::new(x, y, 0.0)
}

/// Band rank from top (0 = Head) to bottom (7 = Lower Leg)
fn band_rank(label: &str) -> usize {
    let base = label
        .trim_start_matches("Left ")
        .trim_start_matches("Right ");
    match base {
        "Head" => 0,
        "Shoulder" => 1,
        "Upper Torso" => 2,
        "Lower Torso" => 3,
        "Pelvis" => 4,
        "Hip" => 5,
        "Upper Leg" => 6,
        "Lower Leg" => 7,
        other => panic!("unexpected label {}", other),
    }
}

#[test]
fn test_band_thresholds_are_exclusive() {
    assert_eq!(region_from_position(&at(0.0, 0.66)), "Head");
    assert_eq!(region_from_position(&at(0.0, 0.65)), "Shoulder");
    assert_eq!(region_from_position(&at(0.0, 0.55)), "Upper Torso");
    assert_eq!(region_from_position(&at(0.0, 0.35)), "Lower Torso");
    assert_eq!(region_from_position(&at(0.0, 0.20)), "Pelvis");
    assert_eq!(region_from_position(&at(0.0, 0.10)), "Hip");
    assert_eq!(region_from_position(&at(0.0, -0.10)), "Upper Leg");
    assert_eq!(region_from_position(&at(0.0, -0.30)), "Lower Leg");
    assert_eq!(region_from_position(&at(0.0, -0.50)), "Lower Leg");
}

#[test]
fn test_sided_bands() {
    assert_eq!(region_from_position(&at(-0.2, 0.6)), "Left Shoulder");
    assert_eq!(region_from_position(&at(0.2, 0.6)), "Right Shoulder");
    assert_eq!(region_from_position(&at(-0.1, 0.0)), "Left Hip");
    assert_eq!(region_from_position(&at(0.1, -0.2)), "Right Upper Leg");
    assert_eq!(region_from_position(&at(-0.09, -0.4)), "Left Lower Leg");
}

#[test]
fn test_torso_and_pelvis_never_sided() {
    for x in [-0.3, -0.06, 0.0, 0.06, 0.3] {
        assert_eq!(region_from_position(&at(x, 0.45)), "Upper Torso");
        assert_eq!(region_from_position(&at(x, 0.25)), "Lower Torso");
        assert_eq!(region_from_position(&at(x, 0.15)), "Pelvis");
        assert_eq!(region_from_position(&at(x, 0.8)), "Head");
    }
}

#[test]
fn test_side_zone_is_inclusive_of_threshold() {
    // |x| <= 0.05 is centre
    assert_eq!(region_from_position(&at(0.05, 0.6)), "Shoulder");
    assert_eq!(region_from_position(&at(-0.05, 0.6)), "Shoulder");
    assert_eq!(region_from_position(&at(0.051, 0.6)), "Right Shoulder");
}

#[test]
fn test_position_classification_monotonic_in_y() {
    let mut previous = 0;
    let mut y = 1.0f32;
    while y > -0.6 {
        let rank = band_rank(&region_from_position(&at(0.12, y)));
        assert!(rank >= previous, "band went back up at y={}", y);
        previous = rank;
        y -= 0.005;
    }
    assert_eq!(previous, 7);
}

#[test]
fn test_named_parts_are_stable() {
    for part in ANATOMICAL_PARTS {
        let far_away = at(5.0, 5.0);
        let first = classify(Some(part.id), &far_away);
        let second = classify(Some(part.id), &at(-5.0, -5.0));
        assert_eq!(first, part.label);
        assert_eq!(first, second);
    }
}

#[test]
fn test_unknown_or_missing_name_uses_position() {
    assert_eq!(classify(None, &at(0.0, 0.7)), "Head");
    assert_eq!(classify(Some("avatarRoot"), &at(0.0, 0.45)), "Upper Torso");
    assert_eq!(classify(Some(""), &at(0.2, -0.4)), "Right Lower Leg");
}

#[test]
fn test_stacked_marks_classify_body_location() {
    // Touching a mark placed on the right shin must not produce a mark label
    let label = classify(Some("paintMark_electric"), &at(0.09, -0.35));
    assert_eq!(label, "Right Lower Leg");
    let label = classify(Some("hoverPreview"), &at(0.0, 0.5));
    assert_eq!(label, "Upper Torso");
}

#[test]
fn test_part_centres_are_sided_consistently() {
    for part in ANATOMICAL_PARTS {
        if part.id.starts_with("left") {
            assert!(part.center[0] < 0.0, "{} should be at negative x", part.id);
            assert!(part.label.starts_with("Left "));
        } else if part.id.starts_with("right") {
            assert!(part.center[0] > 0.0, "{} should be at positive x", part.id);
            assert!(part.label.starts_with("Right "));
        }
    }
    assert_eq!(part_named("pelvis").map(|p| p.label), Some("Pelvis"));
}
