use crate::{
    effects::{tone::map_pixels, Effect, EffectName, EffectParams},
    error::Result,
    video::types::Frame,
};

/// Radial darkening towards the corners
///
/// `factor = 1 - strength * sqrt(dx^2 + dy^2)` with `dx`, `dy` normalised so the
/// frame edge midpoints sit at distance 1. The factor is clamped to `[0, 1]`.
pub struct VignetteEffect;

impl Effect for VignetteEffect {
    fn name(&self) -> EffectName {
        EffectName::Vignette
    }

    fn description(&self) -> &str {
        "Darkened corners drawing the eye to the center"
    }

    fn apply(&self, frame: &Frame, params: &EffectParams) -> Result<Frame> {
        let cx = frame.width() as f32 / 2.0;
        let cy = frame.height() as f32 / 2.0;
        let strength = params.vignette_strength;

        Ok(map_pixels(frame, |x, y, rgb| {
            let dx = if cx > 0.0 { (x as f32 - cx) / cx } else { 0.0 };
            let dy = if cy > 0.0 { (y as f32 - cy) / cy } else { 0.0 };
            let distance = (dx * dx + dy * dy).sqrt();
            let factor = (1.0 - strength * distance).clamp(0.0, 1.0);

            rgb.map(|v| (v as f32 * factor).clamp(0.0, 255.0) as u8)
        }))
    }
}
