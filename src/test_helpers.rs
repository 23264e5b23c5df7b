//! Shared fixtures for the unit tests: photos, frames and WAV files.

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

use crate::video::types::Frame;

/// White 100x100 frame with a red square, a blue diagonal and a gray ramp along
/// the bottom, so every catalog effect has something to change
pub fn detailed_frame() -> Frame {
    let mut frame = Frame::new_filled(100, 100, [255, 255, 255]);
    for y in 20..80 {
        for x in 20..80 {
            frame.set_pixel(x, y, [255, 0, 0]);
        }
    }
    for y in 85..100 {
        for x in 0..100 {
            let v = (x * 255 / 99) as u8;
            frame.set_pixel(x, y, [v, v, v]);
        }
    }
    for i in 0..100 {
        for w in 0..3 {
            frame.set_pixel((i + w).min(99), i, [0, 0, 255]);
        }
    }
    frame
}

/// Write a photo with a horizontal color gradient to `dir/name`
pub fn write_photo(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    });
    image.save(&path).unwrap();
    path
}

/// Write bytes that no decoder will accept
pub fn write_corrupt_photo(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"\xFF\xD8\xFF this is not really a jpeg").unwrap();
    path
}

/// Mono 16-bit WAV whose sample `i` is `i % 100` (scaled), so repetitions are easy to spot
pub fn write_ramp_wav(dir: &Path, name: &str, sample_rate: u32, seconds: f64) -> PathBuf {
    let path = dir.join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    let total = (seconds * sample_rate as f64).round() as usize;
    for i in 0..total {
        writer.write_sample(((i % 100) as i16) * 100).unwrap();
    }
    writer.finalize().unwrap();
    path
}
