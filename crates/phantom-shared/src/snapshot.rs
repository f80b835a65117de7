//! Frozen session statistics.
//!
//! Report synthesis (rule-based or model-backed) only ever sees this
//! snapshot, never the live session.

use crate::session::Session;
use crate::texture::PainTexture;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Distinct region labels, sorted
    pub regions: BTreeSet<String>,
    /// Stroke count per texture present
    pub texture_breakdown: BTreeMap<PainTexture, usize>,
    /// Mean pressure, 0 when empty
    pub average_intensity: f64,
    pub total_strokes: usize,
}

impl SessionSnapshot {
    pub fn from_session(session: &Session) -> Self {
        Self {
            regions: session.affected_regions(),
            texture_breakdown: session.texture_breakdown(),
            average_intensity: session.average_intensity(),
            total_strokes: session.len(),
        }
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Regions sorted lexicographically and comma-joined
    pub fn region_list(&self) -> String {
        self.regions.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }

    /// Textures by descending stroke count; equal counts keep declaration order
    pub fn textures_by_count(&self) -> Vec<(PainTexture, usize)> {
        let mut ranked: Vec<_> = self.texture_breakdown.iter().map(|(t, c)| (*t, *c)).collect();
        // BTreeMap yields declaration order and sort_by is stable
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// Most frequent texture, ties broken by declaration order
    pub fn dominant_texture(&self) -> Option<PainTexture> {
        self.textures_by_count().first().map(|(t, _)| *t)
    }

    /// Prompt for the external report model
    pub fn build_prompt(&self) -> String {
        let texture_desc: Vec<String> = self
            .textures_by_count()
            .iter()
            .map(|(texture, count)| format!("{}: {} points", texture.display_name(), count))
            .collect();
        let intensity = (self.average_intensity * 10.0).floor() as u32;

        format!(
            "Generate a clinical neuropathic pain report. \
             Patient mapped {} pain points across: {}. \
             Pain types: {}. \
             Average intensity: {}/10. \
             Provide location, quality description, intensity assessment, recommendation, and summary.",
            self.total_strokes,
            self.region_list(),
            texture_desc.join(", "),
            intensity
        )
    }
}
