//! Session aggregator: the ordered strokes of one painting pass.
//!
//! Derived statistics are computed from the stroke list on every call and
//! never cached, so they cannot drift from the underlying sequence.

use crate::demo;
use crate::snapshot::SessionSnapshot;
use crate::stroke::Stroke;
use crate::texture::PainTexture;
use crate::Position;
use std::collections::{BTreeMap, BTreeSet};

/// Default radius for hover / replay lookups
pub const DEFAULT_HOVER_THRESHOLD: f32 = 0.06;

#[derive(Debug, Clone, Default)]
pub struct Session {
    strokes: Vec<Stroke>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn last(&self) -> Option<&Stroke> {
        self.strokes.last()
    }

    /// Append a stroke (capacity is enforced by the capture pipeline)
    pub fn add_stroke(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    /// Replace contents with the fixed demonstration corpus
    pub fn load_demo(&mut self) {
        self.strokes = demo::demo_strokes();
    }

    /// Distinct region labels
    pub fn affected_regions(&self) -> BTreeSet<String> {
        self.strokes.iter().map(|s| s.region().to_string()).collect()
    }

    /// Stroke count per texture; textures with no strokes are absent
    pub fn texture_breakdown(&self) -> BTreeMap<PainTexture, usize> {
        let mut breakdown = BTreeMap::new();
        for stroke in &self.strokes {
            *breakdown.entry(stroke.texture()).or_insert(0) += 1;
        }
        breakdown
    }

    /// Mean pressure, accumulated and returned in f64 so band and
    /// percentage rounding see the unnarrowed value. Exactly 0 when empty.
    pub fn average_intensity(&self) -> f64 {
        if self.strokes.is_empty() {
            return 0.0;
        }
        let total: f64 = self.strokes.iter().map(|s| f64::from(s.pressure())).sum();
        total / self.strokes.len() as f64
    }

    /// Closest stroke strictly within `threshold`.
    ///
    /// Linear scan; ties keep the earliest inserted stroke.
    pub fn nearest_stroke(&self, position: &Position, threshold: f32) -> Option<&Stroke> {
        let mut best = None;
        let mut best_distance = threshold;
        for stroke in &self.strokes {
            let d = stroke.distance_to(position);
            if d < best_distance {
                best_distance = d;
                best = Some(stroke);
            }
        }
        best
    }

    /// Frozen statistics for report synthesis
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from_session(self)
    }
}
