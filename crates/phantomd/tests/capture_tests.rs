//! Stroke capture pipeline tests.
//!
//! Tests verify:
//! - Session never exceeds the stroke cap
//! - Consecutive captures closer than the minimum distance are dropped
//! - Pressure source policy and clamping
//! - Region classification of named parts and self-generated artifacts

use approx::assert_relative_eq;
use nalgebra::Vector3;
use phantom_shared::{PainTexture, Position, Session};
use phantomd::capture::{resolve_pressure, MAX_STROKES, MIN_STROKE_DISTANCE};
use phantomd::{StrokeCapture, SurfaceHit, TouchForce};

fn hit_at(position: Position, name: &str) -> SurfaceHit {
    SurfaceHit::new(position, Vector3::new(0.0, 0.0, 1.0), name)
}

fn capture_into(
    capture: &mut StrokeCapture,
    session: &mut Session,
    hit: &SurfaceHit,
    texture: PainTexture,
) -> bool {
    match capture.capture(session, hit, texture, 0.5) {
        Some(stroke) => {
            session.add_stroke(stroke);
            true
        }
        None => false,
    }
}

// ============================================================================
// Capacity
// ============================================================================

#[test]
fn test_session_never_exceeds_cap() {
    let mut session = Session::new();
    let mut capture = StrokeCapture::default();

    for i in 0..(MAX_STROKES + 50) {
        let position = Position::new(-0.5 + i as f32 * 0.02, 0.4, 0.1);
        capture_into(&mut capture, &mut session, &hit_at(position, "avatar"), PainTexture::Burning);
        assert!(session.len() <= MAX_STROKES);
    }
    assert_eq!(session.len(), MAX_STROKES);
}

#[test]
fn test_cap_does_not_move_cursor() {
    let mut session = Session::new();
    let mut capture = StrokeCapture::new(1, MIN_STROKE_DISTANCE);
    let first = Position::new(0.0, 0.5, 0.1);
    capture_into(&mut capture, &mut session, &hit_at(first, "avatar"), PainTexture::Electric);
    capture_into(
        &mut capture,
        &mut session,
        &hit_at(Position::new(0.3, 0.5, 0.1), "avatar"),
        PainTexture::Electric,
    );
    assert_eq!(capture.last_position(), Some(&first));
}

// ============================================================================
// Dedup
// ============================================================================

#[test]
fn test_same_position_twice_stores_one() {
    let mut session = Session::new();
    let mut capture = StrokeCapture::default();
    let hit = hit_at(Position::new(0.1, 0.3, 0.1), "lowerTorso");

    assert!(capture_into(&mut capture, &mut session, &hit, PainTexture::Burning));
    assert!(!capture_into(&mut capture, &mut session, &hit, PainTexture::Burning));
    assert_eq!(session.len(), 1);
}

#[test]
fn test_dedup_boundary() {
    let mut session = Session::new();
    let mut capture = StrokeCapture::default();
    let origin = Position::new(0.0, 0.3, 0.1);
    capture_into(&mut capture, &mut session, &hit_at(origin, "avatar"), PainTexture::Burning);

    let near = Position::new(0.0, 0.3 + MIN_STROKE_DISTANCE * 0.9, 0.1);
    assert!(!capture_into(&mut capture, &mut session, &hit_at(near, "avatar"), PainTexture::Burning));

    let far = Position::new(0.0, 0.3 + MIN_STROKE_DISTANCE * 1.1, 0.1);
    assert!(capture_into(&mut capture, &mut session, &hit_at(far, "avatar"), PainTexture::Burning));
    assert_eq!(session.len(), 2);
}

#[test]
fn test_dedup_only_checks_previous_stroke() {
    let mut session = Session::new();
    let mut capture = StrokeCapture::default();
    let a = Position::new(0.0, 0.3, 0.1);
    let b = Position::new(0.2, 0.3, 0.1);

    assert!(capture_into(&mut capture, &mut session, &hit_at(a, "avatar"), PainTexture::Burning));
    assert!(capture_into(&mut capture, &mut session, &hit_at(b, "avatar"), PainTexture::Burning));
    // Drawing back over the first mark is allowed
    assert!(capture_into(&mut capture, &mut session, &hit_at(a, "avatar"), PainTexture::Burning));
    assert_eq!(session.len(), 3);
}

#[test]
fn test_retap_in_same_spot_is_deduplicated() {
    let mut session = Session::new();
    let mut capture = StrokeCapture::default();
    let spot = hit_at(Position::new(-0.1, 0.0, 0.1), "leftUpperLeg");

    assert!(capture_into(&mut capture, &mut session, &spot, PainTexture::PinsAndNeedles));
    // Finger lifted and placed again: still one continuous capture stream
    assert!(!capture_into(&mut capture, &mut session, &spot, PainTexture::PinsAndNeedles));
}

// ============================================================================
// Pressure
// ============================================================================

#[test]
fn test_pressure_is_always_clamped() {
    for (raw, expected) in [(0.0, 0.1), (-5.0, 0.1), (1.0, 1.0), (99.0, 1.0)] {
        assert_relative_eq!(resolve_pressure(None, raw), expected);

        let stroke = StrokeCapture::default()
            .capture(
                &Session::new(),
                &hit_at(Position::new(0.0, 0.8, 0.0), "head"),
                PainTexture::Burning,
                raw,
            )
            .unwrap();
        assert_relative_eq!(stroke.pressure(), expected);
    }
}

#[test]
fn test_force_used_only_with_nonzero_maximum() {
    let touch = TouchForce {
        force: 1.0,
        maximum_possible_force: 4.0,
    };
    assert_relative_eq!(resolve_pressure(Some(touch), 0.9), 0.25);

    let no_max = TouchForce {
        force: 1.0,
        maximum_possible_force: 0.0,
    };
    assert_relative_eq!(resolve_pressure(Some(no_max), 0.9), 0.9);
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn test_named_part_wins_over_position() {
    let stroke = StrokeCapture::default()
        .capture(
            &Session::new(),
            // Position says Head; the named part is authoritative
            &hit_at(Position::new(0.0, 0.8, 0.0), "rightForearm"),
            PainTexture::Electric,
            0.5,
        )
        .unwrap();
    assert_eq!(stroke.region(), "Right Forearm");
}

#[test]
fn test_artifacts_fall_back_to_position() {
    for name in ["paintMark_electric", "paintHalo_burning", "hoverPreview"] {
        let stroke = StrokeCapture::default()
            .capture(
                &Session::new(),
                &hit_at(Position::new(0.2, -0.4, 0.05), name),
                PainTexture::Electric,
                0.5,
            )
            .unwrap();
        assert_eq!(stroke.region(), "Right Lower Leg", "artifact {}", name);
    }
}
