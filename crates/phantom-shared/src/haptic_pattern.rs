//! Haptic pattern tables.
//!
//! Each texture maps to a fixed waveform. Times are seconds relative to the
//! pattern start; intensities are already scaled by the requested intensity.

use crate::texture::PainTexture;
use serde::{Deserialize, Serialize};

pub const MIN_INTENSITY: f32 = 0.1;
pub const MAX_INTENSITY: f32 = 1.0;

/// Burning: one low, sustained throb
const BURNING_DURATION: f64 = 0.3;
const BURNING_GAIN: f32 = 0.8;
const BURNING_SHARPNESS: f32 = 0.15;

/// Electric: irregularly spaced jolts, mimicking shock timing
const ELECTRIC_OFFSETS: [f64; 5] = [0.0, 0.08, 0.18, 0.26, 0.38];
const ELECTRIC_GAIN: f32 = 0.9;
const ELECTRIC_SHARPNESS: f32 = 0.9;

/// Pins & needles: faint high-sharpness buzz
const NEEDLES_DURATION: f64 = 0.2;
const NEEDLES_GAIN: f32 = 0.4;
const NEEDLES_SHARPNESS: f32 = 0.95;

/// Clamp a requested playback intensity into [0.1, 1.0]
pub fn clamp_intensity(raw: f32) -> f32 {
    if raw.is_nan() {
        return MIN_INTENSITY;
    }
    raw.clamp(MIN_INTENSITY, MAX_INTENSITY)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HapticEventKind {
    /// Sustained vibration for `duration` seconds
    Continuous { duration: f64 },
    /// Single sharp tap
    Transient,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HapticEvent {
    pub kind: HapticEventKind,
    pub relative_time: f64,
    pub intensity: f32,
    pub sharpness: f32,
}

impl HapticEvent {
    pub fn continuous(relative_time: f64, duration: f64, intensity: f32, sharpness: f32) -> Self {
        Self {
            kind: HapticEventKind::Continuous { duration },
            relative_time,
            intensity,
            sharpness,
        }
    }

    pub fn transient(relative_time: f64, intensity: f32, sharpness: f32) -> Self {
        Self {
            kind: HapticEventKind::Transient,
            relative_time,
            intensity,
            sharpness,
        }
    }

    /// Time at which this event stops vibrating
    pub fn end_time(&self) -> f64 {
        match self.kind {
            HapticEventKind::Continuous { duration } => self.relative_time + duration,
            HapticEventKind::Transient => self.relative_time,
        }
    }
}

/// Event sequence for one texture at one intensity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HapticPattern {
    pub texture: PainTexture,
    pub events: Vec<HapticEvent>,
}

impl HapticPattern {
    /// Build the pattern for `texture`; `intensity` is clamped first
    pub fn for_texture(texture: PainTexture, intensity: f32) -> Self {
        let intensity = clamp_intensity(intensity);
        let events = match texture {
            PainTexture::Burning => vec![HapticEvent::continuous(
                0.0,
                BURNING_DURATION,
                BURNING_GAIN * intensity,
                BURNING_SHARPNESS,
            )],
            PainTexture::Electric => ELECTRIC_OFFSETS
                .iter()
                .map(|&t| HapticEvent::transient(t, ELECTRIC_GAIN * intensity, ELECTRIC_SHARPNESS))
                .collect(),
            PainTexture::PinsAndNeedles => vec![HapticEvent::continuous(
                0.0,
                NEEDLES_DURATION,
                NEEDLES_GAIN * intensity,
                NEEDLES_SHARPNESS,
            )],
        };
        Self { texture, events }
    }

    /// Seconds from start until the last event ends
    pub fn duration(&self) -> f64 {
        self.events.iter().map(HapticEvent::end_time).fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations() {
        assert!((HapticPattern::for_texture(PainTexture::Burning, 1.0).duration() - 0.3).abs() < 1e-9);
        assert!((HapticPattern::for_texture(PainTexture::Electric, 1.0).duration() - 0.38).abs() < 1e-9);
        assert!((HapticPattern::for_texture(PainTexture::PinsAndNeedles, 1.0).duration() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_intensity_clamped_before_scaling() {
        let pattern = HapticPattern::for_texture(PainTexture::Burning, 5.0);
        assert!((pattern.events[0].intensity - 0.8).abs() < 1e-6);
        let pattern = HapticPattern::for_texture(PainTexture::Burning, 0.0);
        assert!((pattern.events[0].intensity - 0.08).abs() < 1e-6);
    }
}
