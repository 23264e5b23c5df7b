//! Neighbourhood filters built on the image crate's Gaussian blur

use image::imageops;

use crate::{
    effects::{tone::map_pixels, Effect, EffectName, EffectParams},
    error::{EffectError, Result},
    video::types::Frame,
};

fn check_sigma(effect: EffectName, sigma: f32) -> Result<()> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(EffectError::ApplyFailed {
            effect: effect.to_string(),
            reason: format!("sigma must be positive, got {}", sigma),
        }
        .into());
    }
    Ok(())
}

/// Subtle Gaussian softening
pub struct BlurEffect;

impl Effect for BlurEffect {
    fn name(&self) -> EffectName {
        EffectName::Blur
    }

    fn description(&self) -> &str {
        "Soft focus Gaussian blur"
    }

    fn apply(&self, frame: &Frame, params: &EffectParams) -> Result<Frame> {
        check_sigma(self.name(), params.blur_sigma)?;
        Ok(Frame::new(imageops::blur(frame.as_image(), params.blur_sigma)))
    }
}

/// Unsharp mask: adds back `amount` times the detail removed by a blur
pub struct SharpenEffect;

impl Effect for SharpenEffect {
    fn name(&self) -> EffectName {
        EffectName::Sharpen
    }

    fn description(&self) -> &str {
        "Unsharp mask edge enhancement"
    }

    fn apply(&self, frame: &Frame, params: &EffectParams) -> Result<Frame> {
        check_sigma(self.name(), params.sharpen_sigma)?;

        let blurred = imageops::blur(frame.as_image(), params.sharpen_sigma);
        let amount = params.sharpen_amount;

        Ok(map_pixels(frame, |x, y, rgb| {
            let soft = blurred.get_pixel(x, y).0;
            let mut out = [0u8; 3];
            for c in 0..3 {
                let detail = rgb[c] as f32 - soft[c] as f32;
                out[c] = (rgb[c] as f32 + amount * detail).round().clamp(0.0, 255.0) as u8;
            }
            out
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_frame() -> Frame {
        let mut frame = Frame::new_filled(16, 16, [40, 40, 40]);
        for y in 0..16 {
            for x in 8..16 {
                frame.set_pixel(x, y, [220, 220, 220]);
            }
        }
        frame
    }

    #[test]
    fn test_blur_softens_edges() {
        let frame = edge_frame();
        let out = BlurEffect.apply(&frame, &EffectParams::default()).unwrap();

        let dark_side = out.get_pixel(7, 8)[0];
        let bright_side = out.get_pixel(8, 8)[0];
        assert!(dark_side > 40);
        assert!(bright_side < 220);
    }

    #[test]
    fn test_sharpen_increases_edge_contrast() {
        let frame = edge_frame();
        let out = SharpenEffect.apply(&frame, &EffectParams::default()).unwrap();

        assert!(out.get_pixel(7, 8)[0] < 40);
        assert!(out.get_pixel(8, 8)[0] > 220);
        // flat areas far from the edge are unchanged
        assert_eq!(out.get_pixel(1, 8), [40, 40, 40]);
    }

    #[test]
    fn test_invalid_sigma_is_an_error() {
        let params = EffectParams { blur_sigma: -1.0, ..EffectParams::default() };
        assert!(BlurEffect.apply(&edge_frame(), &params).is_err());
    }
}
