//! # Composition
//!
//! Arranges clips on a timeline and runs the whole slideshow pipeline.

pub mod engine;
pub mod timeline;

// Re-exports for convenience
pub use engine::{RenderOutcome, RenderResult, SlideshowEngine};
pub use timeline::{
    SlideEdge, Timeline, TimelineEntry, TransitionCompositor, TransitionKind, TransitionSelection,
    WipeDirection,
};
