use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::audio::types::AudioTrack;

/// What to do with a track that is shorter than the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFit {
    /// Repeat the track back to back, then cut at the timeline end
    Loop,
    /// Play the track once and fill the remainder with silence
    PadSilence,
}

impl Default for AudioFit {
    fn default() -> Self {
        Self::Loop
    }
}

impl std::str::FromStr for AudioFit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "loop" => Ok(Self::Loop),
            "pad_silence" | "pad" | "silence" => Ok(Self::PadSilence),
            other => Err(format!("unknown audio fit '{}', expected loop or pad_silence", other)),
        }
    }
}

/// Reconciles an audio track with the timeline length
///
/// Samples are never resampled, pitch-shifted or stretched: the track is only
/// repeated, padded or cut on whole sample frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioAttacher {
    fit: AudioFit,
}

impl AudioAttacher {
    pub fn new(fit: AudioFit) -> Self {
        Self { fit }
    }

    pub fn fit(&self) -> AudioFit {
        self.fit
    }

    /// Bind an optional track to a timeline of `duration` seconds
    ///
    /// No track means a silent video.
    pub fn attach(&self, track: Option<AudioTrack>, duration: f64) -> Option<AudioTrack> {
        match track {
            Some(track) => Some(self.reconcile(track, duration)),
            None => {
                info!("   No audio track, the video will be silent");
                None
            }
        }
    }

    /// Loop or truncate `track` so it lasts exactly `duration` seconds
    pub fn reconcile(&self, track: AudioTrack, duration: f64) -> AudioTrack {
        let channels = track.channels.max(1) as usize;
        let target_frames = (duration.max(0.0) * track.sample_rate as f64).round() as usize;
        let target_len = target_frames * channels;

        // Drop any dangling partial frame before working in whole frames
        let mut samples = track.samples;
        let whole = samples.len() - samples.len() % channels;
        samples.truncate(whole);

        let source_len = samples.len();

        if source_len >= target_len {
            debug!(
                "Truncating audio from {:.2}s to {:.2}s",
                source_len as f64 / channels as f64 / track.sample_rate as f64,
                duration
            );
            samples.truncate(target_len);
        } else if source_len == 0 {
            samples = vec![0.0; target_len];
        } else {
            match self.fit {
                AudioFit::Loop => {
                    let repeats = target_len as f64 / source_len as f64;
                    debug!("Looping audio {:.2} times to cover {:.2}s", repeats, duration);

                    let mut looped = Vec::with_capacity(target_len);
                    while looped.len() < target_len {
                        let take = (target_len - looped.len()).min(source_len);
                        looped.extend_from_slice(&samples[..take]);
                    }
                    samples = looped;
                }
                AudioFit::PadSilence => {
                    debug!("Padding audio with silence up to {:.2}s", duration);
                    samples.resize(target_len, 0.0);
                }
            }
        }

        AudioTrack { samples, ..track }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_track(seconds: f64, sample_rate: u32, channels: u16) -> AudioTrack {
        let frames = (seconds * sample_rate as f64).round() as usize;
        AudioTrack {
            samples: (0..frames * channels as usize).map(|i| (i % 997) as f32 / 997.0).collect(),
            sample_rate,
            channels,
        }
    }

    #[test]
    fn test_short_track_is_looped_to_exact_length() {
        let track = ramp_track(2.0, 8000, 2);
        let original = track.samples.clone();

        let out = AudioAttacher::default().reconcile(track, 5.0);

        assert_eq!(out.samples.len(), 5 * 8000 * 2);
        assert_eq!(out.duration(), 5.0);
        // a full repetition sits right after the first pass
        assert_eq!(&out.samples[..original.len()], &original[..]);
        assert_eq!(&out.samples[original.len()..original.len() * 2], &original[..]);
        // and the tail is the beginning of the track again
        let tail = out.samples.len() - original.len() * 2;
        assert_eq!(&out.samples[original.len() * 2..], &original[..tail]);
    }

    #[test]
    fn test_long_track_is_truncated_from_the_start() {
        let track = ramp_track(8.0, 8000, 1);
        let original = track.samples.clone();

        let out = AudioAttacher::new(AudioFit::Loop).reconcile(track, 5.0);

        assert_eq!(out.samples.len(), 40000);
        assert_eq!(&out.samples[..], &original[..40000]);
    }

    #[test]
    fn test_pad_silence_plays_once() {
        let track = ramp_track(2.0, 4000, 1);
        let original = track.samples.clone();

        let out = AudioAttacher::new(AudioFit::PadSilence).reconcile(track, 3.0);

        assert_eq!(out.samples.len(), 12000);
        assert_eq!(&out.samples[..8000], &original[..]);
        assert!(out.samples[8000..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_fractional_duration_rounds_to_whole_frames() {
        let track = ramp_track(1.0, 44100, 2);
        let out = AudioAttacher::default().reconcile(track, 13.0 / 3.0);

        let frames = (13.0 / 3.0 * 44100.0_f64).round() as usize;
        assert_eq!(out.samples.len(), frames * 2);
        assert_eq!(out.frame_count(), frames);
    }

    #[test]
    fn test_missing_track_stays_silent() {
        assert!(AudioAttacher::default().attach(None, 10.0).is_none());
    }

    #[test]
    fn test_fit_parsing() {
        assert_eq!("loop".parse::<AudioFit>().unwrap(), AudioFit::Loop);
        assert_eq!("PAD_SILENCE".parse::<AudioFit>().unwrap(), AudioFit::PadSilence);
        assert!("stretch".parse::<AudioFit>().is_err());
    }
}
