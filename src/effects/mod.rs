//! # Effect Catalog
//!
//! One visual transform is applied to each normalized photo before it becomes a clip.
//! Every effect is a pure function of the input pixels and produces a new frame.
//!
//! ## Built-in Effects
//!
//! - **blur**: subtle Gaussian soft focus (sigma ≈ 1 px)
//! - **contrast**: linear stretch around mid-gray (×1.2)
//! - **grayscale**: BT.601 luma on all three channels
//! - **sepia**: classic brown toning matrix
//! - **vignette**: radial darkening towards the corners
//! - **sharpen**: unsharp mask
//! - **solarize**: inverts values above a threshold
//! - **invert**: photographic negative
//! - **colorize**: duotone between a dark and a light color
//! - **none**: identity
//!
//! ## Usage
//!
//! ```rust,no_run
//! use slideshow_compositor::effects::{EffectEngine, EffectName, EffectParams, EffectRegistry};
//! use slideshow_compositor::video::Frame;
//!
//! let registry = EffectRegistry::new();
//! let params = EffectParams::default();
//! let engine = EffectEngine::new(&registry, &params);
//!
//! let frame = Frame::new_filled(320, 240, [120, 80, 200]);
//! let sepia = engine.apply_effect(&frame, EffectName::Sepia).unwrap();
//! ```

pub mod engine;
pub mod registry;
pub mod traits;

// Effect implementations
pub mod filter;
pub mod tone;
pub mod vignette;

// Re-exports for convenience
pub use engine::{EffectEngine, EffectSelection, EffectSelector};
pub use registry::EffectRegistry;
pub use traits::{Effect, EffectName, EffectParams};

pub use filter::{BlurEffect, SharpenEffect};
pub use tone::{
    ColorizeEffect, ContrastEffect, GrayscaleEffect, IdentityEffect, InvertEffect, SepiaEffect,
    SolarizeEffect,
};
pub use vignette::VignetteEffect;
