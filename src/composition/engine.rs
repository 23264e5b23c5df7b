use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    audio::{AudioAttacher, AudioLoader, AudioTrack},
    composition::{Timeline, TransitionCompositor},
    config::Config,
    effects::{EffectEngine, EffectName, EffectRegistry, EffectSelector},
    error::{CompositionError, CompositorError, Result},
    video::{
        normalizer::sort_by_filename, ClipBuilder, EffectedFrame, EncodedVideo, Encoder,
        FfmpegSinkFactory, ImageNormalizer, NormalizedFrame, SinkFactory, ThumbnailExtractor,
        TimedClip,
    },
};

/// Metadata describing a finished video
#[derive(Debug, Clone, Serialize)]
pub struct RenderResult {
    pub output_path: PathBuf,
    /// Seconds
    pub duration: f64,
    /// `WxH`
    pub resolution: String,
    /// File size in MiB
    pub size_mb: f64,
    pub thumbnail_path: Option<PathBuf>,
    /// Photos that made it into the video
    pub clips: usize,
    pub frames: usize,
    /// Effect shown for each clip, in timeline order
    pub effects: Vec<EffectName>,
    pub has_audio: bool,
}

/// What the caller gets back: never an error, always a message
#[derive(Debug, Clone, Serialize)]
pub struct RenderOutcome {
    pub success: bool,
    pub message: String,
    pub result: Option<RenderResult>,
}

/// Main engine that turns photos and an optional soundtrack into a slideshow video
///
/// The engine follows a clear pipeline:
/// 1. Image Loading - Decode every photo and fit it to the output resolution
/// 2. Effects - Apply one catalog effect per photo
/// 3. Clips - Give each photo its duration and motion
/// 4. Timeline - Overlap clips with transitions
/// 5. Audio - Loop or trim the soundtrack to the timeline
/// 6. Encoding - Stream the timeline into an MP4
/// 7. Thumbnail - Write a JPEG still
pub struct SlideshowEngine {
    config: Config,
    registry: EffectRegistry,
    sink_factory: Arc<dyn SinkFactory>,
}

impl SlideshowEngine {
    /// Create an engine with the built-in effects and the `ffmpeg` encoder
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registry: EffectRegistry::new(),
            sink_factory: Arc::new(FfmpegSinkFactory),
        }
    }

    /// Replace the effect registry, e.g. to add custom effects
    pub fn with_registry(mut self, registry: EffectRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the encode backend
    pub fn with_sink_factory(mut self, factory: Box<dyn SinkFactory>) -> Self {
        self.sink_factory = Arc::from(factory);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the pipeline and report the outcome in caller-facing form
    pub fn run<P: AsRef<Path>>(
        &self,
        images: &[P],
        audio: Option<&Path>,
        output: &Path,
    ) -> RenderOutcome {
        match self.assemble(images, audio, output) {
            Ok(result) => RenderOutcome {
                success: true,
                message: "Video created successfully".to_string(),
                result: Some(result),
            },
            Err(e) => {
                warn!("Slideshow failed during {}: {}", e.stage(), e);
                e.into()
            }
        }
    }

    /// Main assembly method - orchestrates the entire pipeline
    ///
    /// # Arguments
    ///
    /// * `images` - Photo paths in display order (JPG or PNG)
    /// * `audio` - Optional soundtrack (WAV or MP3)
    /// * `output` - Path for the final MP4
    pub fn assemble<P: AsRef<Path>>(
        &self,
        images: &[P],
        audio: Option<&Path>,
        output: &Path,
    ) -> Result<RenderResult> {
        self.config.validate()?;

        info!("🎬 Starting slideshow assembly");
        info!("   Photos: {}", images.len());
        info!("   Audio: {:?}", audio);
        info!("   Output: {:?}", output);

        // Pipeline Step 1: Image Loading
        let normalized = self.load_images(images)?;

        // Pipeline Step 2: Effects
        let effected = self.apply_effects(normalized);

        // Pipeline Step 3: Clips
        let clips = self.build_clips(effected);
        let effects: Vec<EffectName> = clips.iter().map(|c| c.effect).collect();

        // Pipeline Step 4: Timeline
        let timeline = self.compose_timeline(clips)?;

        // Pipeline Step 5: Audio
        let track = self.attach_audio(audio, timeline.duration());

        // Pipeline Step 6: Encoding
        let encoded = self.encode(&timeline, track.as_ref(), output)?;

        // Pipeline Step 7: Thumbnail
        let thumbnail_path = self.extract_thumbnail(&timeline, output);

        let result = RenderResult {
            output_path: encoded.path.clone(),
            duration: encoded.duration,
            resolution: timeline.resolution(),
            size_mb: encoded.file_size as f64 / 1024.0 / 1024.0,
            thumbnail_path,
            clips: timeline.len(),
            frames: encoded.frame_count,
            effects,
            has_audio: encoded.has_audio,
        };

        info!("🎉 Slideshow complete! Output saved to: {:?}", output);
        Ok(result)
    }

    // ==========================================
    // PIPELINE STEP 1: IMAGE LOADING
    // ==========================================

    fn load_images<P: AsRef<Path>>(&self, images: &[P]) -> Result<Vec<NormalizedFrame>> {
        info!("📷 Step 1: Loading photos...");

        let mut paths: Vec<PathBuf> = images.iter().map(|p| p.as_ref().to_path_buf()).collect();
        if self.config.images.sort_by_filename {
            sort_by_filename(&mut paths);
        }

        let normalizer = ImageNormalizer::new(
            self.config.video.resolution,
            self.config.images.resize_policy,
            self.config.images.background,
        );

        let mut frames = Vec::with_capacity(paths.len());
        for (index, path) in paths.iter().enumerate() {
            match normalizer.load_normalized(index, path) {
                Ok(frame) => {
                    debug!("      {:02} - {:?} ({}x{})", index, path, frame.frame.width(), frame.frame.height());
                    frames.push(frame);
                }
                Err(e) => warn!("Skipping photo {:?}: {}", path, e),
            }
        }

        if frames.is_empty() {
            return Err(CompositionError::NoClips { attempted: paths.len() }.into());
        }

        info!("   ✅ Photos loaded: {} of {}", frames.len(), paths.len());
        Ok(frames)
    }

    // ==========================================
    // PIPELINE STEP 2: EFFECTS
    // ==========================================

    fn apply_effects(&self, frames: Vec<NormalizedFrame>) -> Vec<(PathBuf, EffectedFrame)> {
        info!("🎨 Step 2: Applying effects...");

        let mut selector = EffectSelector::from_config(&self.config.effects);
        let engine = EffectEngine::new(&self.registry, &self.config.effects.params);

        // Picks follow the source position, not the position among loaded photos
        let effected: Vec<_> = frames
            .into_iter()
            .map(|frame| {
                let name = selector.pick(frame.index);
                let path = frame.path.clone();
                (path, engine.apply(frame, name))
            })
            .collect();

        let failed = effected.iter().filter(|(_, f)| !f.applied).count();
        info!(
            "   ✅ Effects: {}",
            effected.iter().map(|(_, f)| f.effect.as_str()).collect::<Vec<_>>().join(", ")
        );
        if failed > 0 {
            warn!("   {} effect(s) fell back to the original photo", failed);
        }

        effected
    }

    // ==========================================
    // PIPELINE STEP 3: CLIPS
    // ==========================================

    fn build_clips(&self, effected: Vec<(PathBuf, EffectedFrame)>) -> Vec<TimedClip> {
        info!("🎞️  Step 3: Building clips...");

        let builder = ClipBuilder::new(self.config.clip.duration_per_image, self.config.video.fps)
            .with_zoom(self.config.clip.zoom_rate);

        let clips: Vec<TimedClip> = effected
            .into_iter()
            .map(|(path, frame)| builder.build(frame, path))
            .collect();

        info!(
            "   ✅ {} clips of {:.1}s at {} fps",
            clips.len(),
            builder.duration(),
            self.config.video.fps
        );
        clips
    }

    // ==========================================
    // PIPELINE STEP 4: TIMELINE
    // ==========================================

    fn compose_timeline(&self, clips: Vec<TimedClip>) -> Result<Timeline> {
        info!("⏱️  Step 4: Composing timeline...");

        let compositor = TransitionCompositor::from_config(&self.config.transition);
        let timeline = compositor.compose(
            clips,
            self.config.video.resolution,
            self.config.images.background,
        )?;

        info!("   ✅ Timeline composed:");
        info!("      Clips: {}", timeline.len());
        info!("      Transition: {:.2}s", timeline.transition_duration());
        info!("      Duration: {:.2}s ({} frames)", timeline.duration(), timeline.frame_count());

        Ok(timeline)
    }

    // ==========================================
    // PIPELINE STEP 5: AUDIO
    // ==========================================

    fn attach_audio(&self, audio: Option<&Path>, duration: f64) -> Option<AudioTrack> {
        info!("🎵 Step 5: Attaching audio...");

        let track = audio.and_then(|path| match AudioLoader::load(path) {
            Ok(track) => {
                info!(
                    "   Loaded: {:.1}s, {} Hz, {} channels",
                    track.duration(),
                    track.sample_rate,
                    track.channels
                );
                Some(track)
            }
            Err(e) => {
                warn!("Failed to load audio file, continuing without sound: {}", e);
                None
            }
        });

        let attacher = AudioAttacher::new(self.config.audio.fit);
        let fitted = attacher.attach(track, duration);
        if let Some(track) = &fitted {
            info!("   ✅ Audio fitted to {:.2}s ({:?})", track.duration(), attacher.fit());
        }
        fitted
    }

    // ==========================================
    // PIPELINE STEP 6: ENCODING
    // ==========================================

    fn encode(
        &self,
        timeline: &Timeline,
        track: Option<&AudioTrack>,
        output: &Path,
    ) -> Result<EncodedVideo> {
        info!("🎬 Step 6: Encoding video...");

        let encoder = Encoder::new(&self.config.video).with_shared_factory(self.sink_factory.clone());
        let encoded = encoder.encode(timeline, track, output)?;

        info!("   ✅ Encoding complete:");
        info!("      File saved: {:?}", encoded.path);
        info!("      Duration: {:.1}s", encoded.duration);
        info!("      Frame count: {}", encoded.frame_count);
        info!("      File size: {:.1} MB", encoded.file_size as f64 / 1024.0 / 1024.0);

        Ok(encoded)
    }

    // ==========================================
    // PIPELINE STEP 7: THUMBNAIL
    // ==========================================

    fn extract_thumbnail(&self, timeline: &Timeline, output: &Path) -> Option<PathBuf> {
        info!("🖼️  Step 7: Extracting thumbnail...");

        match ThumbnailExtractor::new(&self.config.thumbnail).extract(timeline, output) {
            Ok(path) => {
                info!("   ✅ Thumbnail saved: {:?}", path);
                Some(path)
            }
            Err(e) => {
                warn!("Thumbnail extraction failed: {}", e);
                None
            }
        }
    }
}

impl From<CompositorError> for RenderOutcome {
    fn from(e: CompositorError) -> Self {
        Self {
            success: false,
            message: e.user_message(),
            result: None,
        }
    }
}
