//! # Video Processing Module
//!
//! Turns photos into frames and frames into an MP4.
//!
//! - [`normalizer`] decodes photos and fits them to the output resolution
//! - [`clip`] holds a processed frame on screen for a fixed time, optionally zooming
//! - [`encoder`] streams a composed timeline into `ffmpeg`
//! - [`thumbnail`] writes a JPEG still of the timeline

pub mod clip;
pub mod encoder;
pub mod normalizer;
pub mod thumbnail;
pub mod types;

pub use clip::{ClipBuilder, Motion, TimedClip};
pub use encoder::{
    check_ffmpeg_available, quality_to_crf, EncodeJob, EncodedVideo, Encoder, FfmpegSink,
    FfmpegSinkFactory, FrameSink, SinkFactory,
};
pub use normalizer::{ImageNormalizer, ResizePolicy};
pub use thumbnail::ThumbnailExtractor;
pub use types::{is_supported_image, EffectedFrame, Frame, NormalizedFrame, SourceImage};
