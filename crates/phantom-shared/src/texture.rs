//! Pain textures: the closed set of qualitative pain types.
//!
//! A texture is used as a key everywhere (brush, stroke, haptic pattern,
//! report descriptor). Declaration order is significant: it is the
//! tie-break order for every "most frequent texture" decision.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PainTexture {
    Burning,
    Electric,
    PinsAndNeedles,
}

impl PainTexture {
    /// All textures in declaration order
    pub const ALL: [PainTexture; 3] = [
        PainTexture::Burning,
        PainTexture::Electric,
        PainTexture::PinsAndNeedles,
    ];

    /// Stable key, also used in paint-mark entity names
    pub fn key(self) -> &'static str {
        match self {
            Self::Burning => "burning",
            Self::Electric => "electric",
            Self::PinsAndNeedles => "pinsAndNeedles",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Burning => "Burning",
            Self::Electric => "Electric",
            Self::PinsAndNeedles => "Pins & Needles",
        }
    }

    /// Symbol identifier for the brush toolbar
    pub fn icon(self) -> &'static str {
        match self {
            Self::Burning => "flame.fill",
            Self::Electric => "bolt.fill",
            Self::PinsAndNeedles => "sparkles",
        }
    }

    /// Brush colour as linear RGB in [0, 1]
    pub fn color(self) -> (f32, f32, f32) {
        match self {
            Self::Burning => (1.0, 0.35, 0.1),
            Self::Electric => (0.3, 0.85, 1.0),
            Self::PinsAndNeedles => (0.9, 0.4, 0.9),
        }
    }

    /// Clinical descriptor used in the report quality line
    pub fn descriptor(self) -> &'static str {
        match self {
            Self::Burning => "deep burning sensation",
            Self::Electric => "sharp electrical jolts",
            Self::PinsAndNeedles => "persistent tingling (paresthesia)",
        }
    }
}

impl std::fmt::Display for PainTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PainTexture {
    type Err = String;

    /// Accepts the key or the display name, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        PainTexture::ALL
            .into_iter()
            .find(|t| t.key().to_lowercase() == wanted || t.display_name().to_lowercase() == wanted)
            .ok_or_else(|| format!("unknown pain texture: {}", s))
    }
}
