//! # Slideshow-Compositor
//!
//! Turn a handful of photos and an optional song into a short slideshow video.
//!
//! Each photo is fitted to the output resolution, given one visual effect and held on
//! screen for a fixed time. Neighbouring photos overlap with a crossfade, slide or wipe,
//! the soundtrack is looped or trimmed to fit, and the result is encoded to H.264/AAC MP4
//! together with a JPEG thumbnail.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use slideshow_compositor::{Config, SlideshowEngine};
//!
//! let engine = SlideshowEngine::new(Config::default());
//! let outcome = engine.run(
//!     &["01.jpg", "02.jpg", "03.jpg", "04.jpg", "05.jpg"],
//!     Some(Path::new("song.mp3")),
//!     Path::new("slideshow.mp4"),
//! );
//!
//! if let Some(result) = outcome.result {
//!     println!("{} ({:.1}s, {:.1} MB)", result.resolution, result.duration, result.size_mb);
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`video`] - Photo normalization, clips, encoding and thumbnails
//! - [`effects`] - The effect catalog
//! - [`composition`] - Timeline, transitions and the pipeline engine
//! - [`audio`] - Soundtrack loading and fitting
//! - [`config`] - Configuration management
//!
//! ## Creating Custom Effects
//!
//! Replace a catalog entry by implementing the [`Effect`](effects::Effect) trait:
//!
//! ```rust,no_run
//! use slideshow_compositor::effects::{Effect, EffectName, EffectParams, EffectRegistry};
//! use slideshow_compositor::video::Frame;
//! use slideshow_compositor::Result;
//!
//! struct WarmSepia;
//!
//! impl Effect for WarmSepia {
//!     fn name(&self) -> EffectName {
//!         EffectName::Sepia
//!     }
//!
//!     fn description(&self) -> &str {
//!         "Sepia with a little extra red"
//!     }
//!
//!     fn apply(&self, frame: &Frame, _params: &EffectParams) -> Result<Frame> {
//!         Ok(frame.clone())
//!     }
//! }
//!
//! let mut registry = EffectRegistry::new();
//! registry.register(EffectName::Sepia, || Box::new(WarmSepia));
//! ```

pub mod audio;
pub mod composition;
pub mod config;
pub mod effects;
pub mod error;
pub mod video;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types for convenience
pub use crate::{
    composition::{RenderOutcome, RenderResult, SlideshowEngine},
    config::Config,
    error::{CompositorError, Result},
};
