//! Deterministic clinical report synthesis.
//!
//! All output is derived from a `SessionSnapshot` by fixed rules: no
//! randomness, no timestamps. The same snapshot always yields byte-identical
//! text. An external model may replace this report wholesale, but must
//! produce the same five-field shape.

use crate::error::PhantomError;
use crate::snapshot::SessionSnapshot;
use serde::{Deserialize, Serialize};

/// Distinct-region count at which the multi-region recommendation applies
pub const MULTI_REGION_THRESHOLD: usize = 4;

/// Distinct-texture count at which the mixed-modality recommendation applies
pub const MIXED_MODALITY_THRESHOLD: usize = 2;

const MULTI_REGION_RECOMMENDATION: &str = "Multi-region involvement suggests systemic neuropathic condition. \
Recommend comprehensive neurological evaluation, nerve conduction studies, and consideration of \
centralized pain management protocol.";

const CLOSING_SENTENCE: &str = "This sensory map was generated using tactile input translated to haptic \
feedback, providing a multi-modal pain assessment beyond traditional numeric scales.";

/// Sensation name used when no stroke exists
const FALLBACK_SENSATION: &str = "neuropathic";

/// Five-field clinical report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportData {
    pub location: String,
    pub quality: String,
    pub intensity: String,
    pub recommendation: String,
    pub summary: String,
}

/// Which algorithm produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSource {
    /// External generative model
    Model,
    /// Rule-based synthesis in this module
    Fallback,
}

impl std::fmt::Display for ReportSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Model => write!(f, "generative model"),
            Self::Fallback => write!(f, "rule-based engine"),
        }
    }
}

/// Average-intensity band (stable ordering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IntensityBand {
    Mild,
    Moderate,
    Significant,
    Severe,
}

impl IntensityBand {
    /// [0,0.3) Mild, [0.3,0.6) Moderate, [0.6,0.8) Significant, else Severe
    pub fn from_average(average: f64) -> Self {
        if average < 0.3 {
            Self::Mild
        } else if average < 0.6 {
            Self::Moderate
        } else if average < 0.8 {
            Self::Significant
        } else {
            Self::Severe
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::Significant => "Significant",
            Self::Severe => "Severe",
        }
    }

    /// One-sentence clinical detail for the summary
    pub fn detail(self) -> &'static str {
        match self {
            Self::Mild => "Low-intensity signals across mapped regions suggest early-stage or intermittent neuropathic activity.",
            Self::Moderate => "Moderate pressure mapping indicates consistent neuropathic discomfort requiring clinical attention.",
            Self::Significant => "High-intensity mapping across multiple regions suggests active neuropathic pain warranting prompt evaluation.",
            Self::Severe => "Very high intensity signals across the body map indicate severe neuropathic distress requiring urgent clinical review.",
        }
    }
}

impl std::fmt::Display for IntensityBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl ReportData {
    /// Build the rule-based report (pure function, deterministic)
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        let band = IntensityBand::from_average(snapshot.average_intensity);
        let regions = snapshot.region_list();
        let region_phrase = region_phrase(snapshot.region_count());

        Self {
            location: regions.clone(),
            quality: build_quality(snapshot),
            intensity: format!("{} ({}%)", band.label(), intensity_percent(snapshot.average_intensity)),
            recommendation: build_recommendation(snapshot, &region_phrase),
            summary: build_summary(snapshot, band, &regions, &region_phrase),
        }
    }

    /// Reject model output that leaves any field blank
    pub fn validate(&self) -> Result<(), PhantomError> {
        let fields = [
            ("location", &self.location),
            ("quality", &self.quality),
            ("intensity", &self.intensity),
            ("recommendation", &self.recommendation),
            ("summary", &self.summary),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(PhantomError::MalformedReport(format!("empty {} field", name)));
            }
        }
        Ok(())
    }
}

/// Shorthand for `ReportData::from_snapshot`
pub fn synthesize(snapshot: &SessionSnapshot) -> ReportData {
    ReportData::from_snapshot(snapshot)
}

/// Average intensity as a rounded percentage
pub fn intensity_percent(average: f64) -> u32 {
    (average * 100.0).round().max(0.0) as u32
}

/// "1 region" / "<n> regions"
pub fn region_phrase(count: usize) -> String {
    if count == 1 {
        "1 region".to_string()
    } else {
        format!("{} regions", count)
    }
}

fn build_quality(snapshot: &SessionSnapshot) -> String {
    snapshot
        .textures_by_count()
        .iter()
        .map(|(texture, count)| format!("{} ({} areas)", texture.descriptor(), count))
        .collect::<Vec<_>>()
        .join("; ")
}

fn build_recommendation(snapshot: &SessionSnapshot, region_phrase: &str) -> String {
    if snapshot.region_count() >= MULTI_REGION_THRESHOLD {
        MULTI_REGION_RECOMMENDATION.to_string()
    } else if snapshot.texture_breakdown.len() >= MIXED_MODALITY_THRESHOLD {
        format!(
            "Mixed pain modalities present across {}. Recommend targeted neurological assessment and multimodal pain management approach.",
            region_phrase
        )
    } else {
        format!(
            "Localized neuropathic symptoms in {}. Recommend focused clinical examination and nerve function assessment.",
            region_phrase
        )
    }
}

fn build_summary(snapshot: &SessionSnapshot, band: IntensityBand, regions: &str, region_phrase: &str) -> String {
    let dominant = snapshot
        .dominant_texture()
        .map(|t| t.display_name().to_lowercase())
        .unwrap_or_else(|| FALLBACK_SENSATION.to_string());

    format!(
        "Patient reports {} neuropathic pain across {}: {}. \
         The dominant sensation is {}, with {} discrete pain points mapped during the session. \
         {} {}",
        band.label().to_lowercase(),
        region_phrase,
        regions,
        dominant,
        snapshot.total_strokes,
        band.detail(),
        CLOSING_SENTENCE
    )
}

// =============================================================================
// Report formatting
// =============================================================================

/// Format report as plain text (deterministic, no timestamps)
pub fn format_text(report: &ReportData) -> String {
    let mut out = String::new();

    out.push_str("PAIN MAP REPORT\n");
    out.push_str("===============\n\n");
    for (title, value) in sections(report) {
        out.push_str(&format!("{}\n", title.to_uppercase()));
        out.push_str(&format!("  {}\n\n", if value.is_empty() { "none" } else { value }));
    }

    out
}

/// Format report as markdown (deterministic, no timestamps)
pub fn format_markdown(report: &ReportData) -> String {
    let mut out = String::new();

    out.push_str("# Pain Map Report\n\n");
    for (title, value) in sections(report) {
        out.push_str(&format!("## {}\n\n", title));
        out.push_str(&format!("{}\n\n", if value.is_empty() { "_none_" } else { value }));
    }

    out
}

fn sections(report: &ReportData) -> [(&'static str, &str); 5] {
    [
        ("Location", report.location.as_str()),
        ("Quality", report.quality.as_str()),
        ("Intensity", report.intensity.as_str()),
        ("Recommendation", report.recommendation.as_str()),
        ("Summary", report.summary.as_str()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(IntensityBand::from_average(0.0), IntensityBand::Mild);
        assert_eq!(IntensityBand::from_average(0.29), IntensityBand::Mild);
        assert_eq!(IntensityBand::from_average(0.3), IntensityBand::Moderate);
        assert_eq!(IntensityBand::from_average(0.6), IntensityBand::Significant);
        assert_eq!(IntensityBand::from_average(0.8), IntensityBand::Severe);
        assert_eq!(IntensityBand::from_average(1.0), IntensityBand::Severe);
    }

    #[test]
    fn test_region_phrase() {
        assert_eq!(region_phrase(0), "0 regions");
        assert_eq!(region_phrase(1), "1 region");
        assert_eq!(region_phrase(3), "3 regions");
    }

    #[test]
    fn test_intensity_percent_rounds() {
        assert_eq!(intensity_percent(0.0), 0);
        assert_eq!(intensity_percent(0.657), 66);
        assert_eq!(intensity_percent(0.554), 55);
        assert_eq!(intensity_percent(1.0), 100);
    }

    #[test]
    fn test_validate_rejects_blank_field() {
        let report = ReportData {
            location: "Head".to_string(),
            quality: "burning".to_string(),
            intensity: " ".to_string(),
            recommendation: "rest".to_string(),
            summary: "ok".to_string(),
        };
        assert!(matches!(report.validate(), Err(PhantomError::MalformedReport(_))));
    }
}
