use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::imageops::{self, FilterType};
use image::{GenericImageView, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ImageError, Result};
use crate::video::types::{Frame, NormalizedFrame, SourceImage};

/// How a photo is brought to the target frame size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizePolicy {
    /// Scale to fit, then center on a canvas of exactly the target size
    Pad,
    /// Scale to fit, no canvas; one axis may come out smaller than the target
    Fit,
}

impl Default for ResizePolicy {
    fn default() -> Self {
        Self::Pad
    }
}

impl FromStr for ResizePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pad" | "letterbox" => Ok(Self::Pad),
            "fit" => Ok(Self::Fit),
            other => Err(format!("unknown resize policy '{other}' (expected pad or fit)")),
        }
    }
}

/// Loads photos and brings them to the target frame geometry
pub struct ImageNormalizer {
    target: (u32, u32),
    policy: ResizePolicy,
    background: [u8; 3],
}

impl ImageNormalizer {
    pub fn new(target: (u32, u32), policy: ResizePolicy, background: [u8; 3]) -> Self {
        Self { target, policy, background }
    }

    /// Decode an image file into an RGB8 source image
    pub fn load<P: AsRef<Path>>(&self, index: usize, path: P) -> Result<SourceImage> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| ImageError::DecodeFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageError::EmptyImage { path: path.display().to_string() }.into());
        }

        let rgb_image = match image {
            image::DynamicImage::ImageRgb8(img) => img,
            _ => image.to_rgb8(),
        };

        debug!("Decoded {:?}: {}x{}", path, width, height);

        Ok(SourceImage {
            index,
            path: path.to_path_buf(),
            frame: Frame::new(rgb_image),
        })
    }

    /// Load and normalize in one step; the decoded source is dropped straight away
    pub fn load_normalized<P: AsRef<Path>>(&self, index: usize, path: P) -> Result<NormalizedFrame> {
        let source = self.load(index, path)?;
        Ok(self.normalize(source))
    }

    /// Resize a decoded image according to the configured policy
    pub fn normalize(&self, source: SourceImage) -> NormalizedFrame {
        let (src_w, src_h) = source.frame.dimensions();
        let (fit_w, fit_h) = fit_dimensions((src_w, src_h), self.target);

        let resized = if (fit_w, fit_h) == (src_w, src_h) {
            source.frame.into_image()
        } else {
            imageops::resize(source.frame.as_image(), fit_w, fit_h, FilterType::Lanczos3)
        };

        let frame = match self.policy {
            ResizePolicy::Fit => Frame::new(resized),
            ResizePolicy::Pad => Frame::new(self.letterbox(&resized)),
        };

        debug!(
            "Normalized image {} from {}x{} to {}x{} ({:?})",
            source.index,
            src_w,
            src_h,
            frame.width(),
            frame.height(),
            self.policy
        );

        NormalizedFrame {
            index: source.index,
            path: source.path,
            frame,
        }
    }

    fn letterbox(&self, resized: &RgbImage) -> RgbImage {
        let (target_w, target_h) = self.target;
        let mut canvas = Frame::new_filled(target_w, target_h, self.background).into_image();

        let offset_x = (target_w - resized.width()) / 2;
        let offset_y = (target_h - resized.height()) / 2;
        imageops::replace(&mut canvas, resized, offset_x as i64, offset_y as i64);

        canvas
    }
}

/// Largest size with the source aspect ratio that fits inside `target`
///
/// Both axes are clamped to `[1, target]` so rounding never spills over the canvas.
pub fn fit_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = (source.0.max(1) as f64, source.1.max(1) as f64);
    let (target_w, target_h) = (target.0 as f64, target.1 as f64);

    let scale = (target_w / src_w).min(target_h / src_h);

    let width = ((src_w * scale).round() as u32).clamp(1, target.0.max(1));
    let height = ((src_h * scale).round() as u32).clamp(1, target.1.max(1));
    (width, height)
}

/// Sort image paths by file name, the way uploads used to be ordered
pub fn sort_by_filename(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
}
