//! Per-pixel color transforms

use rayon::prelude::*;

use crate::{
    effects::{Effect, EffectName, EffectParams},
    error::Result,
    video::types::Frame,
};

/// Build a new frame by mapping every pixel, rows in parallel
pub(crate) fn map_pixels<F>(frame: &Frame, f: F) -> Frame
where
    F: Fn(u32, u32, [u8; 3]) -> [u8; 3] + Sync,
{
    let (width, height) = frame.dimensions();
    let mut out = frame.as_image().clone();
    if width == 0 || height == 0 {
        return Frame::new(out);
    }

    let row_len = width as usize * 3;
    out.par_chunks_mut(row_len).enumerate().for_each(|(y, row)| {
        for (x, px) in row.chunks_exact_mut(3).enumerate() {
            let mapped = f(x as u32, y as u32, [px[0], px[1], px[2]]);
            px.copy_from_slice(&mapped);
        }
    });

    Frame::new(out)
}

/// ITU-R BT.601 luma
pub(crate) fn luma(rgb: [u8; 3]) -> f32 {
    0.299 * rgb[0] as f32 + 0.587 * rgb[1] as f32 + 0.114 * rgb[2] as f32
}

fn clamp_u8(value: f32) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

pub struct IdentityEffect;

impl Effect for IdentityEffect {
    fn name(&self) -> EffectName {
        EffectName::None
    }

    fn description(&self) -> &str {
        "Leaves the photo untouched"
    }

    fn apply(&self, frame: &Frame, _params: &EffectParams) -> Result<Frame> {
        Ok(frame.clone())
    }
}

/// Linear contrast stretch around mid-gray
pub struct ContrastEffect;

impl Effect for ContrastEffect {
    fn name(&self) -> EffectName {
        EffectName::Contrast
    }

    fn description(&self) -> &str {
        "Linear contrast boost around mid-gray"
    }

    fn apply(&self, frame: &Frame, params: &EffectParams) -> Result<Frame> {
        let factor = params.contrast_factor;
        Ok(map_pixels(frame, |_, _, rgb| {
            rgb.map(|v| clamp_u8(((v as f32 - 128.0) * factor + 128.0).round()))
        }))
    }
}

pub struct GrayscaleEffect;

impl Effect for GrayscaleEffect {
    fn name(&self) -> EffectName {
        EffectName::Grayscale
    }

    fn description(&self) -> &str {
        "Black and white from luma, kept as three channels"
    }

    fn apply(&self, frame: &Frame, _params: &EffectParams) -> Result<Frame> {
        Ok(map_pixels(frame, |_, _, rgb| {
            let l = clamp_u8(luma(rgb).round());
            [l, l, l]
        }))
    }
}

pub struct SepiaEffect;

impl Effect for SepiaEffect {
    fn name(&self) -> EffectName {
        EffectName::Sepia
    }

    fn description(&self) -> &str {
        "Warm brown sepia toning"
    }

    fn apply(&self, frame: &Frame, _params: &EffectParams) -> Result<Frame> {
        Ok(map_pixels(frame, |_, _, [r, g, b]| {
            let (r, g, b) = (r as f32, g as f32, b as f32);
            [
                clamp_u8(0.393 * r + 0.769 * g + 0.189 * b),
                clamp_u8(0.349 * r + 0.686 * g + 0.168 * b),
                clamp_u8(0.272 * r + 0.534 * g + 0.131 * b),
            ]
        }))
    }
}

pub struct SolarizeEffect;

impl Effect for SolarizeEffect {
    fn name(&self) -> EffectName {
        EffectName::Solarize
    }

    fn description(&self) -> &str {
        "Inverts every channel value above the threshold"
    }

    fn apply(&self, frame: &Frame, params: &EffectParams) -> Result<Frame> {
        let threshold = params.solarize_threshold;
        Ok(map_pixels(frame, |_, _, rgb| {
            rgb.map(|v| if v >= threshold { 255 - v } else { v })
        }))
    }
}

pub struct InvertEffect;

impl Effect for InvertEffect {
    fn name(&self) -> EffectName {
        EffectName::Invert
    }

    fn description(&self) -> &str {
        "Photographic negative"
    }

    fn apply(&self, frame: &Frame, _params: &EffectParams) -> Result<Frame> {
        Ok(map_pixels(frame, |_, _, rgb| rgb.map(|v| 255 - v)))
    }
}

/// Grayscale base re-tinted on a dark-to-light gradient
pub struct ColorizeEffect;

impl Effect for ColorizeEffect {
    fn name(&self) -> EffectName {
        EffectName::Colorize
    }

    fn description(&self) -> &str {
        "Duotone: shadows take the dark color, highlights the light one"
    }

    fn apply(&self, frame: &Frame, params: &EffectParams) -> Result<Frame> {
        let dark = params.colorize_dark.map(|c| c as f32);
        let light = params.colorize_light.map(|c| c as f32);

        Ok(map_pixels(frame, |_, _, rgb| {
            let t = luma(rgb) / 255.0;
            [
                clamp_u8((dark[0] + (light[0] - dark[0]) * t).round()),
                clamp_u8((dark[1] + (light[1] - dark[1]) * t).round()),
                clamp_u8((dark[2] + (light[2] - dark[2]) * t).round()),
            ]
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(effect: &dyn Effect, rgb: [u8; 3]) -> [u8; 3] {
        let frame = Frame::new_filled(1, 1, rgb);
        effect.apply(&frame, &EffectParams::default()).unwrap().get_pixel(0, 0)
    }

    #[test]
    fn test_contrast_pivots_on_mid_gray() {
        assert_eq!(apply(&ContrastEffect, [128, 128, 128]), [128, 128, 128]);
        assert_eq!(apply(&ContrastEffect, [178, 78, 255]), [188, 68, 255]);
        assert_eq!(apply(&ContrastEffect, [0, 0, 0]), [0, 0, 0]);
    }

    #[test]
    fn test_grayscale_replicates_luma() {
        let [r, g, b] = apply(&GrayscaleEffect, [255, 0, 0]);
        assert_eq!((r, g, b), (76, 76, 76));
    }

    #[test]
    fn test_sepia_matrix_and_clamp() {
        // 0.393*100 + 0.769*100 + 0.189*100 = 135.1 and so on
        assert_eq!(apply(&SepiaEffect, [100, 100, 100]), [135, 120, 93]);
        assert_eq!(apply(&SepiaEffect, [255, 255, 255]), [255, 255, 238]);
    }

    #[test]
    fn test_solarize_threshold() {
        assert_eq!(apply(&SolarizeEffect, [127, 128, 255]), [127, 127, 0]);
    }

    #[test]
    fn test_colorize_endpoints() {
        let params = EffectParams::default();
        assert_eq!(apply(&ColorizeEffect, [0, 0, 0]), params.colorize_dark);
        assert_eq!(apply(&ColorizeEffect, [255, 255, 255]), params.colorize_light);
    }
}
