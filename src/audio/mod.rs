//! # Audio Module
//!
//! Loads the optional soundtrack and fits it to the length of the slideshow.
//!
//! ## Core Features
//!
//! - **Loading**: WAV through hound, MP3 through Symphonia, decoded to interleaved f32
//! - **Fitting**: seamless looping or silence padding for short tracks, truncation for long ones
//! - **Export**: the fitted track is written as a float WAV for the encoder
//!
//! ## Usage
//!
//! ```rust,no_run
//! use slideshow_compositor::audio::{AudioAttacher, AudioFit, AudioLoader};
//!
//! # fn main() -> anyhow::Result<()> {
//! let track = AudioLoader::load("song.mp3")?;
//! let fitted = AudioAttacher::new(AudioFit::Loop).reconcile(track, 13.0);
//!
//! println!("{:.1}s at {} Hz", fitted.duration(), fitted.sample_rate);
//! # Ok(())
//! # }
//! ```

pub mod attacher;
pub mod loader;
pub mod types;

pub use attacher::{AudioAttacher, AudioFit};
pub use loader::AudioLoader;
pub use types::AudioTrack;
