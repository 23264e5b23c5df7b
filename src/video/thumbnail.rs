use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::ColorType;
use tracing::debug;

use crate::{
    composition::Timeline,
    config::ThumbnailConfig,
    error::{Result, ThumbnailError},
};

/// Writes a single JPEG still taken from the composed timeline
#[derive(Debug, Clone)]
pub struct ThumbnailExtractor {
    offset: f64,
    quality: u8,
    max_width: u32,
    directory: Option<PathBuf>,
}

impl ThumbnailExtractor {
    pub fn new(config: &ThumbnailConfig) -> Self {
        Self {
            offset: config.offset,
            quality: config.quality,
            max_width: config.max_width,
            directory: config.directory.clone(),
        }
    }

    /// Time of the thumbnail frame: the configured offset, kept inside `[0, duration)`
    pub fn thumbnail_time(&self, duration: f64, fps: u32) -> f64 {
        let last_frame = (duration - 1.0 / fps.max(1) as f64).max(0.0);
        self.offset.max(0.0).min(last_frame)
    }

    /// `thumb_<output file name>.jpg` next to the output unless a directory is configured
    pub fn path_for(&self, output: &Path) -> PathBuf {
        let name = output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());
        let directory = match &self.directory {
            Some(dir) => dir.clone(),
            None => output.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        directory.join(format!("thumb_{}.jpg", name))
    }

    /// Render the thumbnail frame and write it as JPEG
    pub fn extract(&self, timeline: &Timeline, output: &Path) -> Result<PathBuf> {
        let path = self.path_for(output);
        let write_failed = |reason: String| ThumbnailError::WriteFailed {
            path: path.display().to_string(),
            reason,
        };

        let t = self.thumbnail_time(timeline.duration(), timeline.fps());
        debug!("Rendering thumbnail at {:.2}s", t);

        let mut image = timeline.render_frame(t).into_image();
        let max_width = self.max_width;
        if max_width > 0 && max_width < image.width() {
            let height = ((image.height() as u64 * max_width as u64) / image.width() as u64).max(1) as u32;
            image = imageops::resize(&image, max_width, height, FilterType::Triangle);
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| write_failed(e.to_string()))?;
        }

        let file = File::create(&path).map_err(|e| write_failed(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        let encoded = JpegEncoder::new_with_quality(&mut writer, self.quality.clamp(1, 100))
            .encode(image.as_raw(), image.width(), image.height(), ColorType::Rgb8)
            .map_err(|e| e.to_string());
        let written = encoded.and_then(|_| writer.flush().map_err(|e| e.to_string()));

        if let Err(reason) = written {
            drop(writer);
            if let Err(e) = std::fs::remove_file(&path) {
                debug!("Could not remove incomplete thumbnail {:?}: {}", path, e);
            }
            return Err(write_failed(reason).into());
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::{TransitionCompositor, TransitionSelection};
    use crate::effects::EffectName;
    use crate::video::clip::{Motion, TimedClip};
    use crate::video::types::Frame;
    use tempfile::tempdir;

    fn config() -> ThumbnailConfig {
        ThumbnailConfig::default()
    }

    fn timeline(duration: f64) -> Timeline {
        let clip = TimedClip {
            index: 0,
            path: PathBuf::from("a.png"),
            effect: EffectName::None,
            frame: Frame::new_filled(1280, 720, [30, 200, 90]),
            duration,
            fps: 24,
            motion: Motion::Static,
        };
        TransitionCompositor::new(0.0, vec![], TransitionSelection::Fixed, None)
            .compose(vec![clip], (1280, 720), [0, 0, 0])
            .unwrap()
    }

    #[test]
    fn test_thumbnail_time_is_clamped() {
        let extractor = ThumbnailExtractor::new(&config());
        assert_eq!(extractor.thumbnail_time(13.0, 24), 1.0);
        assert!((extractor.thumbnail_time(0.5, 24) - (0.5 - 1.0 / 24.0)).abs() < 1e-9);
        assert_eq!(extractor.thumbnail_time(0.01, 24), 0.0);
    }

    #[test]
    fn test_thumbnail_path_naming() {
        let extractor = ThumbnailExtractor::new(&config());
        assert_eq!(
            extractor.path_for(Path::new("/videos/show.mp4")),
            PathBuf::from("/videos/thumb_show.mp4.jpg")
        );

        let mut custom = config();
        custom.directory = Some(PathBuf::from("/thumbs"));
        assert_eq!(
            ThumbnailExtractor::new(&custom).path_for(Path::new("/videos/show.mp4")),
            PathBuf::from("/thumbs/thumb_show.mp4.jpg")
        );
    }

    #[test]
    fn test_extract_writes_a_downscaled_jpeg() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("show.mp4");
        let extractor = ThumbnailExtractor::new(&config());

        let path = extractor.extract(&timeline(3.0), &output).unwrap();

        assert!(path.exists());
        let thumb = image::open(&path).unwrap().to_rgb8();
        assert_eq!(thumb.dimensions(), (640, 360));
    }

    #[test]
    fn test_zero_max_width_keeps_full_frame() {
        let dir = tempdir().unwrap();
        let mut custom = config();
        custom.max_width = 0;

        let path = ThumbnailExtractor::new(&custom)
            .extract(&timeline(1.0), &dir.path().join("full.mp4"))
            .unwrap();
        assert_eq!(image::open(&path).unwrap().to_rgb8().dimensions(), (1280, 720));
    }

    #[test]
    fn test_failed_encode_leaves_no_thumbnail_behind() {
        let dir = tempdir().unwrap();
        // JPEG cannot hold a frame wider than 65535 pixels
        let clip = TimedClip {
            index: 0,
            path: PathBuf::from("wide.png"),
            effect: EffectName::None,
            frame: Frame::new_filled(70_000, 2, [10, 20, 30]),
            duration: 1.0,
            fps: 24,
            motion: Motion::Static,
        };
        let wide = TransitionCompositor::new(0.0, vec![], TransitionSelection::Fixed, None)
            .compose(vec![clip], (70_000, 2), [0, 0, 0])
            .unwrap();

        let mut custom = config();
        custom.max_width = 0;
        let extractor = ThumbnailExtractor::new(&custom);
        let output = dir.path().join("wide.mp4");

        let result = extractor.extract(&wide, &output);

        assert!(matches!(
            result,
            Err(crate::error::CompositorError::Thumbnail(ThumbnailError::WriteFailed { .. }))
        ));
        assert!(!extractor.path_for(&output).exists());
    }

    #[test]
    fn test_unwritable_directory_is_reported() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"x").unwrap();

        let mut custom = config();
        custom.directory = Some(blocker.join("thumbs"));
        let result = ThumbnailExtractor::new(&custom).extract(&timeline(1.0), &dir.path().join("a.mp4"));

        assert!(matches!(
            result,
            Err(crate::error::CompositorError::Thumbnail(ThumbnailError::WriteFailed { .. }))
        ));
    }
}
