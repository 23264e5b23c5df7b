use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    audio::AudioFit,
    composition::{SlideEdge, TransitionKind, TransitionSelection, WipeDirection},
    effects::{EffectName, EffectParams, EffectSelection},
    error::{ConfigError, Result},
    video::ResizePolicy,
};

/// Main configuration for the Slideshow-Compositor
///
/// Every section is optional in a TOML file; missing values take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Photo decoding and resizing
    pub images: ImagesConfig,

    /// Effect catalog and selection
    pub effects: EffectsConfig,

    /// Per-image clip timing
    pub clip: ClipConfig,

    /// Transitions between clips
    pub transition: TransitionConfig,

    /// Soundtrack fitting
    pub audio: AudioConfig,

    /// Output video settings
    pub video: VideoConfig,

    /// Thumbnail still
    pub thumbnail: ThumbnailConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.images.validate()?;
        self.effects.validate()?;
        self.clip.validate()?;
        self.transition.validate(self.clip.duration_per_image)?;
        self.video.validate()?;
        self.thumbnail.validate()?;
        Ok(())
    }
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Photo loading configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Order photos by file name instead of the order they were given in
    pub sort_by_filename: bool,

    /// `pad` letterboxes onto the full frame, `fit` only scales
    pub resize_policy: ResizePolicy,

    /// Letterbox and uncovered-canvas color
    pub background: [u8; 3],
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            sort_by_filename: false,
            resize_policy: ResizePolicy::Pad,
            background: [0, 0, 0],
        }
    }
}

impl ImagesConfig {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Effect catalog and selection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Effects eligible for random and by-index selection
    pub catalog: Vec<EffectName>,

    pub selection: EffectSelection,

    /// Per-image effects for `explicit` selection, cycled when shorter than the photo list
    pub explicit: Vec<EffectName>,

    /// Seed for `random` selection; unseeded runs differ every time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Tunables shared by the effect implementations
    pub params: EffectParams,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            catalog: EffectName::ALL
                .into_iter()
                .filter(|e| *e != EffectName::None)
                .collect(),
            selection: EffectSelection::Random,
            explicit: Vec::new(),
            seed: None,
            params: EffectParams::default(),
        }
    }
}

impl EffectsConfig {
    fn validate(&self) -> Result<()> {
        if self.selection == EffectSelection::Explicit && self.explicit.is_empty() {
            return Err(invalid("effects.explicit", "[]").into());
        }

        self.params
            .validate()
            .map_err(|(key, value)| ConfigError::InvalidValue { key, value })?;

        Ok(())
    }
}

/// Per-image clip configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    /// Seconds each photo stays on screen
    pub duration_per_image: f64,

    /// Zoom speed `k` in `scale(t) = 1 + k·t`; no zoom when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom_rate: Option<f32>,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            duration_per_image: 4.0,
            zoom_rate: None,
        }
    }
}

impl ClipConfig {
    fn validate(&self) -> Result<()> {
        if !(self.duration_per_image.is_finite() && self.duration_per_image > 0.0) {
            return Err(invalid("clip.duration_per_image", self.duration_per_image).into());
        }

        if let Some(rate) = self.zoom_rate {
            if !(rate.is_finite() && rate >= 0.0) {
                return Err(invalid("clip.zoom_rate", rate).into());
            }
        }

        Ok(())
    }
}

/// Transition configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Overlap between adjacent clips in seconds
    pub duration: f64,

    /// Available treatments; empty means straight cuts
    pub kinds: Vec<TransitionKind>,

    pub selection: TransitionSelection,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Seconds of fade from the background at the start and back to it at the end
    pub edge_fade: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration: 0.5,
            kinds: vec![
                TransitionKind::Crossfade,
                TransitionKind::Slide { edge: SlideEdge::Left },
                TransitionKind::Wipe { direction: WipeDirection::LeftToRight },
            ],
            selection: TransitionSelection::Cycle,
            seed: None,
            edge_fade: 0.0,
        }
    }
}

impl TransitionConfig {
    fn validate(&self, clip_duration: f64) -> Result<()> {
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            return Err(invalid("transition.duration", self.duration).into());
        }

        if !(self.edge_fade.is_finite() && self.edge_fade >= 0.0) {
            return Err(invalid("transition.edge_fade", self.edge_fade).into());
        }

        if !self.kinds.is_empty() && self.duration >= clip_duration {
            return Err(invalid(
                "transition.duration",
                format!("{} (must be shorter than a clip of {}s)", self.duration, clip_duration),
            )
            .into());
        }

        Ok(())
    }
}

/// Soundtrack configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// What happens to tracks shorter than the video
    pub fit: AudioFit,
}

/// Output video configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Output resolution (width, height); both must be even
    pub resolution: (u32, u32),

    pub fps: u32,

    /// FFmpeg video encoder
    pub codec: String,

    /// x264 speed/size trade-off
    pub preset: String,

    /// Quality (0-100), mapped onto CRF
    pub quality: u8,

    /// Encoder threads
    pub threads: usize,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            resolution: (1280, 720),
            fps: 24,
            codec: "libx264".to_string(),
            preset: "medium".to_string(),
            quality: 85,
            threads: num_cpus::get(),
        }
    }
}

impl VideoConfig {
    fn validate(&self) -> Result<()> {
        let (width, height) = self.resolution;
        if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
            return Err(invalid("video.resolution", format!("{}x{}", width, height)).into());
        }

        if self.fps == 0 {
            return Err(invalid("video.fps", self.fps).into());
        }

        if self.quality > 100 {
            return Err(invalid("video.quality", self.quality).into());
        }

        if self.threads == 0 {
            return Err(invalid("video.threads", self.threads).into());
        }

        if self.codec.trim().is_empty() {
            return Err(invalid("video.codec", &self.codec).into());
        }

        Ok(())
    }
}

/// Thumbnail configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Seconds into the video, clamped to the last frame
    pub offset: f64,

    /// JPEG quality (1-100)
    pub quality: u8,

    /// Downscale wider thumbnails to this width; 0 keeps the full frame
    pub max_width: u32,

    /// Where thumbnails go; next to the video when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            offset: 1.0,
            quality: 85,
            max_width: 640,
            directory: None,
        }
    }
}

impl ThumbnailConfig {
    fn validate(&self) -> Result<()> {
        if !(self.offset.is_finite() && self.offset >= 0.0) {
            return Err(invalid("thumbnail.offset", self.offset).into());
        }

        if !(1..=100).contains(&self.quality) {
            return Err(invalid("thumbnail.quality", self.quality).into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompositorError;
    use tempfile::tempdir;

    fn invalid_key(config: &Config) -> Option<String> {
        match config.validate() {
            Err(CompositorError::Config(ConfigError::InvalidValue { key, .. })) => Some(key),
            _ => None,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.effects.catalog.len(), 9);
        assert!(!config.effects.catalog.contains(&EffectName::None));
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");

        let mut original = Config::default();
        original.effects.seed = Some(7);
        original.clip.zoom_rate = Some(0.05);
        original.audio.fit = AudioFit::PadSilence;
        original.images.resize_policy = ResizePolicy::Fit;

        original.save_to_file(&file_path).unwrap();
        let loaded = Config::from_file(&file_path).unwrap();

        assert_eq!(original, loaded);
    }

    #[test]
    fn test_full_size_thumbnail_survives_a_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("full_thumb.toml");

        let mut original = Config::default();
        original.thumbnail.max_width = 0;
        original.save_to_file(&file_path).unwrap();

        let loaded = Config::from_file(&file_path).unwrap();
        assert_eq!(loaded.thumbnail.max_width, 0);
        assert_eq!(original, loaded);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("partial.toml");
        std::fs::write(
            &file_path,
            r#"
[clip]
duration_per_image = 3.0

[transition]
duration = 0.5
kinds = [{ kind = "fade" }, { kind = "wipe", direction = "top_to_bottom" }]

[effects]
selection = "by_index"
catalog = ["sepia", "black_white"]
"#,
        )
        .unwrap();

        let config = Config::from_file(&file_path).unwrap();
        assert_eq!(config.clip.duration_per_image, 3.0);
        assert_eq!(
            config.transition.kinds,
            vec![
                TransitionKind::Crossfade,
                TransitionKind::Wipe { direction: WipeDirection::TopToBottom }
            ]
        );
        assert_eq!(config.effects.selection, EffectSelection::ByIndex);
        assert_eq!(config.effects.catalog, vec![EffectName::Sepia, EffectName::Grayscale]);
        assert_eq!(config.video, VideoConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Config::from_file(dir.path().join("nope.toml")),
            Err(CompositorError::Config(ConfigError::FileNotFound { .. }))
        ));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[video\nfps = ").unwrap();
        assert!(matches!(
            Config::from_file(&bad),
            Err(CompositorError::Config(ConfigError::ParseFailed { .. }))
        ));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = Config::default();
        config.video.resolution = (1279, 720);
        assert_eq!(invalid_key(&config).as_deref(), Some("video.resolution"));

        let mut config = Config::default();
        config.transition.duration = 4.0;
        assert_eq!(invalid_key(&config).as_deref(), Some("transition.duration"));

        let mut config = Config::default();
        config.transition.duration = -0.1;
        assert_eq!(invalid_key(&config).as_deref(), Some("transition.duration"));

        let mut config = Config::default();
        config.transition.edge_fade = f64::NAN;
        assert_eq!(invalid_key(&config).as_deref(), Some("transition.edge_fade"));

        let mut config = Config::default();
        config.clip.duration_per_image = 0.0;
        assert_eq!(invalid_key(&config).as_deref(), Some("clip.duration_per_image"));

        let mut config = Config::default();
        config.effects.selection = EffectSelection::Explicit;
        assert_eq!(invalid_key(&config).as_deref(), Some("effects.explicit"));

        let mut config = Config::default();
        config.thumbnail.quality = 0;
        assert_eq!(invalid_key(&config).as_deref(), Some("thumbnail.quality"));
    }

    #[test]
    fn test_straight_cuts_allow_any_transition_duration() {
        let mut config = Config::default();
        config.transition.kinds.clear();
        config.transition.duration = 10.0;
        assert!(config.validate().is_ok());
    }
}
