use std::borrow::Cow;
use std::path::PathBuf;

use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

use crate::effects::EffectName;
use crate::video::types::{EffectedFrame, Frame};

/// Per-frame motion applied while a clip is on screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Motion {
    Static,
    /// Linear zoom towards the center, `scale(t) = 1 + rate * t`
    Zoom { rate: f32 },
}

impl Default for Motion {
    fn default() -> Self {
        Self::Static
    }
}

impl Motion {
    /// Scale factor at `t` seconds into the clip
    pub fn scale_at(&self, t: f64) -> f64 {
        match *self {
            Motion::Static => 1.0,
            Motion::Zoom { rate } => (1.0 + rate as f64 * t.max(0.0)).max(1.0),
        }
    }
}

/// A still image held on screen for a fixed duration
#[derive(Debug, Clone)]
pub struct TimedClip {
    /// Position of the source photo in the caller's list
    pub index: usize,
    pub path: PathBuf,
    pub effect: EffectName,
    pub frame: Frame,
    /// Display duration in seconds
    pub duration: f64,
    pub fps: u32,
    pub motion: Motion,
}

impl TimedClip {
    /// Number of video frames this clip spans on its own
    pub fn frame_count(&self) -> usize {
        (self.duration * self.fps as f64).round() as usize
    }

    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    pub fn height(&self) -> u32 {
        self.frame.height()
    }

    /// The clip's picture `local_t` seconds after it appears
    ///
    /// Static clips borrow their frame; zooming clips resample a center crop.
    pub fn frame_at(&self, local_t: f64) -> Cow<'_, Frame> {
        let t = local_t.clamp(0.0, self.duration);
        let scale = self.motion.scale_at(t);
        if scale <= 1.0 {
            return Cow::Borrowed(&self.frame);
        }

        let (width, height) = self.frame.dimensions();
        let crop_w = ((width as f64 / scale).round() as u32).clamp(1, width);
        let crop_h = ((height as f64 / scale).round() as u32).clamp(1, height);
        let x = (width - crop_w) / 2;
        let y = (height - crop_h) / 2;

        let crop = imageops::crop_imm(self.frame.as_image(), x, y, crop_w, crop_h).to_image();
        let zoomed = imageops::resize(&crop, width, height, FilterType::Triangle);
        Cow::Owned(Frame::new(zoomed))
    }
}

/// Wraps effected frames into clips that share one duration, rate and motion
#[derive(Debug, Clone)]
pub struct ClipBuilder {
    duration: f64,
    fps: u32,
    motion: Motion,
}

impl ClipBuilder {
    pub fn new(duration: f64, fps: u32) -> Self {
        Self {
            duration,
            fps,
            motion: Motion::Static,
        }
    }

    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_zoom(self, rate: Option<f32>) -> Self {
        match rate {
            Some(rate) if rate > 0.0 => self.with_motion(Motion::Zoom { rate }),
            _ => self,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn build(&self, effected: EffectedFrame, path: PathBuf) -> TimedClip {
        TimedClip {
            index: effected.index,
            path,
            effect: effected.effect,
            frame: effected.frame,
            duration: self.duration,
            fps: self.fps,
            motion: self.motion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::detailed_frame;

    fn effected() -> EffectedFrame {
        EffectedFrame {
            index: 0,
            effect: EffectName::None,
            applied: true,
            frame: detailed_frame(),
        }
    }

    #[test]
    fn test_clip_frame_count() {
        let clip = ClipBuilder::new(3.0, 24).build(effected(), PathBuf::from("a.jpg"));
        assert_eq!(clip.frame_count(), 72);
        assert_eq!(clip.motion, Motion::Static);
    }

    #[test]
    fn test_static_clip_borrows_its_frame() {
        let clip = ClipBuilder::new(2.0, 24).build(effected(), PathBuf::from("a.jpg"));
        assert!(matches!(clip.frame_at(1.5), Cow::Borrowed(_)));
        assert_eq!(*clip.frame_at(1.5), detailed_frame());
    }

    #[test]
    fn test_zoom_changes_frames_over_time() {
        let clip = ClipBuilder::new(4.0, 24)
            .with_zoom(Some(0.1))
            .build(effected(), PathBuf::from("a.jpg"));

        let start = clip.frame_at(0.0).into_owned();
        let end = clip.frame_at(4.0).into_owned();

        assert_eq!(start, detailed_frame());
        assert_eq!(end.dimensions(), (100, 100));
        assert_ne!(end, start);
        assert!((clip.motion.scale_at(4.0) - 1.4).abs() < 1e-6);
    }

    #[test]
    fn test_non_positive_zoom_rate_is_ignored() {
        let builder = ClipBuilder::new(4.0, 24).with_zoom(Some(0.0));
        let clip = builder.build(effected(), PathBuf::from("a.jpg"));
        assert_eq!(clip.motion, Motion::Static);
    }
}
