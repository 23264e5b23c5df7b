use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{error::{EffectError, Result}, video::types::Frame};

/// The fixed effect catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectName {
    Blur,
    #[serde(alias = "contrast_boost")]
    Contrast,
    #[serde(alias = "black_white", alias = "greyscale")]
    Grayscale,
    Sepia,
    Vignette,
    Sharpen,
    Solarize,
    Invert,
    Colorize,
    None,
}

impl EffectName {
    /// Every catalog entry, identity last
    pub const ALL: [EffectName; 10] = [
        EffectName::Blur,
        EffectName::Contrast,
        EffectName::Grayscale,
        EffectName::Sepia,
        EffectName::Vignette,
        EffectName::Sharpen,
        EffectName::Solarize,
        EffectName::Invert,
        EffectName::Colorize,
        EffectName::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EffectName::Blur => "blur",
            EffectName::Contrast => "contrast",
            EffectName::Grayscale => "grayscale",
            EffectName::Sepia => "sepia",
            EffectName::Vignette => "vignette",
            EffectName::Sharpen => "sharpen",
            EffectName::Solarize => "solarize",
            EffectName::Invert => "invert",
            EffectName::Colorize => "colorize",
            EffectName::None => "none",
        }
    }
}

impl fmt::Display for EffectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectName {
    type Err = EffectError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let effect = match name.as_str() {
            "blur" => EffectName::Blur,
            "contrast" | "contrast_boost" | "contrast-boost" => EffectName::Contrast,
            "grayscale" | "greyscale" | "black_white" => EffectName::Grayscale,
            "sepia" => EffectName::Sepia,
            "vignette" => EffectName::Vignette,
            "sharpen" => EffectName::Sharpen,
            "solarize" => EffectName::Solarize,
            "invert" => EffectName::Invert,
            "colorize" | "colourize" => EffectName::Colorize,
            "none" | "identity" => EffectName::None,
            _ => return Err(EffectError::UnknownEffect { name }),
        };
        Ok(effect)
    }
}

/// Core trait that every catalog effect implements
///
/// Effects are pure: the input frame is never modified and the same input
/// pixels always produce the same output pixels.
pub trait Effect: Send + Sync {
    /// Catalog entry this effect implements
    fn name(&self) -> EffectName;

    /// Returns a human-readable description of this effect
    fn description(&self) -> &str;

    /// Produce a new frame with the effect applied
    fn apply(&self, frame: &Frame, params: &EffectParams) -> Result<Frame>;
}

/// Tunables shared by the catalog effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectParams {
    /// Gaussian sigma for `blur`, in pixels
    pub blur_sigma: f32,

    /// Linear stretch factor around mid-gray for `contrast`
    pub contrast_factor: f32,

    /// Blur sigma of the unsharp mask used by `sharpen`
    pub sharpen_sigma: f32,

    /// How much of the high-frequency detail `sharpen` adds back
    pub sharpen_amount: f32,

    /// Channel values at or above this are inverted by `solarize`
    pub solarize_threshold: u8,

    /// Maximum darkening of `vignette` at distance 1 from the center
    pub vignette_strength: f32,

    /// Color that black maps to in `colorize`
    pub colorize_dark: [u8; 3],

    /// Color that white maps to in `colorize`
    pub colorize_light: [u8; 3],
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            blur_sigma: 1.0,
            contrast_factor: 1.2,
            sharpen_sigma: 1.0,
            sharpen_amount: 1.5,
            solarize_threshold: 128,
            vignette_strength: 0.3,
            colorize_dark: [20, 12, 48],
            colorize_light: [255, 214, 150],
        }
    }
}

impl EffectParams {
    pub fn validate(&self) -> std::result::Result<(), (String, String)> {
        if !(self.blur_sigma.is_finite() && self.blur_sigma > 0.0) {
            return Err(("effects.params.blur_sigma".to_string(), self.blur_sigma.to_string()));
        }
        if !(self.contrast_factor.is_finite() && self.contrast_factor > 0.0) {
            return Err(("effects.params.contrast_factor".to_string(), self.contrast_factor.to_string()));
        }
        if !(self.sharpen_sigma.is_finite() && self.sharpen_sigma > 0.0) {
            return Err(("effects.params.sharpen_sigma".to_string(), self.sharpen_sigma.to_string()));
        }
        if !(0.0..=1.0).contains(&self.vignette_strength) {
            return Err(("effects.params.vignette_strength".to_string(), self.vignette_strength.to_string()));
        }
        Ok(())
    }
}
