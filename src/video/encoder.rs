use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, info, warn};

use crate::{
    audio::AudioTrack,
    composition::Timeline,
    config::VideoConfig,
    error::{EncodeError, Result},
    video::types::Frame,
};

/// Represents an encoded video output
#[derive(Debug, Clone)]
pub struct EncodedVideo {
    pub path: PathBuf,
    pub duration: f64,
    pub frame_count: usize,
    pub file_size: u64,
    pub has_audio: bool,
}

/// Everything a sink needs to start one encode
#[derive(Debug, Clone)]
pub struct EncodeJob {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub codec: String,
    pub preset: String,
    pub crf: u8,
    pub threads: usize,
    /// WAV file to mux as the audio stream
    pub audio: Option<PathBuf>,
}

/// Destination for rendered frames, in presentation order
pub trait FrameSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()>;

    /// Flush and close; the output file is complete once this returns `Ok`
    fn finish(self: Box<Self>) -> Result<()>;
}

/// Opens one sink per encode
pub trait SinkFactory: Send + Sync {
    fn open(&self, job: &EncodeJob) -> Result<Box<dyn FrameSink>>;
}

/// Spawns the system `ffmpeg` for every encode
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegSinkFactory;

impl SinkFactory for FfmpegSinkFactory {
    fn open(&self, job: &EncodeJob) -> Result<Box<dyn FrameSink>> {
        Ok(Box::new(FfmpegSink::spawn(job)?))
    }
}

/// Streams raw rgb24 frames into an `ffmpeg` child process
pub struct FfmpegSink {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    frame_len: usize,
}

impl FfmpegSink {
    pub fn spawn(job: &EncodeJob) -> Result<Self> {
        if !check_ffmpeg_available() {
            return Err(EncodeError::FfmpegUnavailable.into());
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.args(["-y", "-loglevel", "error"]);
        cmd.args([
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &format!("{}x{}", job.width, job.height),
            "-r",
            &job.fps.to_string(),
            "-i",
            "pipe:0",
        ]);

        match job.audio.as_ref() {
            Some(audio) => {
                cmd.arg("-i")
                    .arg(audio)
                    .args(["-map", "0:v", "-map", "1:a", "-c:a", "aac", "-shortest"]);
            }
            None => {
                cmd.arg("-an");
            }
        }

        cmd.args([
            "-c:v",
            &job.codec,
            "-preset",
            &job.preset,
            "-crf",
            &job.crf.to_string(),
            "-pix_fmt",
            "yuv420p",
            "-threads",
            &job.threads.to_string(),
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(&job.output);

        debug!("Spawning {:?}", cmd);

        let mut child = cmd.spawn().map_err(|e| EncodeError::Failed {
            reason: format!("Failed to spawn FFmpeg process: {}", e),
        })?;

        let stdin = child.stdin.take().ok_or_else(|| EncodeError::Failed {
            reason: "FFmpeg stdin was not captured".to_string(),
        })?;
        let mut stderr = child.stderr.take().ok_or_else(|| EncodeError::Failed {
            reason: "FFmpeg stderr was not captured".to_string(),
        })?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        Ok(Self {
            child: Some(child),
            stdin: Some(stdin),
            stderr_drain: Some(stderr_drain),
            frame_len: job.width as usize * job.height as usize * 3,
        })
    }
}

impl FrameSink for FfmpegSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let bytes = frame.as_rgb_bytes();
        if bytes.len() != self.frame_len {
            return Err(EncodeError::InvalidParameters {
                details: format!(
                    "frame is {} bytes, expected {}",
                    bytes.len(),
                    self.frame_len
                ),
            }
            .into());
        }

        let stdin = self.stdin.as_mut().ok_or_else(|| EncodeError::Failed {
            reason: "FFmpeg sink is already finalized".to_string(),
        })?;
        stdin.write_all(bytes).map_err(|e| EncodeError::Failed {
            reason: format!("Failed to write frame to FFmpeg: {}", e),
        })?;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<()> {
        drop(self.stdin.take());
        let mut child = self.child.take().ok_or_else(|| EncodeError::Failed {
            reason: "FFmpeg process is gone".to_string(),
        })?;

        let status = child.wait().map_err(|e| EncodeError::Failed {
            reason: format!("FFmpeg execution failed: {}", e),
        })?;
        let stderr = match self.stderr_drain.take() {
            Some(handle) => handle.join().ok().and_then(|r| r.ok()).unwrap_or_default(),
            None => Vec::new(),
        };

        if !status.success() {
            return Err(EncodeError::Failed {
                reason: format!(
                    "FFmpeg exited with {}: {}",
                    status,
                    String::from_utf8_lossy(&stderr).trim()
                ),
            }
            .into());
        }

        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            // Only reached when the encode was abandoned half way
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Whether `ffmpeg` can be invoked from PATH
pub fn check_ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Map a 0-100 quality to an x264 CRF (100 is visually lossless, 0 is worst)
pub fn quality_to_crf(quality: u8) -> u8 {
    let quality = quality.min(100);
    (51 - ((quality as f32 / 100.0) * 51.0) as u8).clamp(0, 51)
}

/// Renders a timeline frame by frame into a sink
pub struct Encoder {
    codec: String,
    preset: String,
    quality: u8,
    threads: usize,
    factory: Arc<dyn SinkFactory>,
}

impl Encoder {
    pub fn new(config: &VideoConfig) -> Self {
        Self {
            codec: config.codec.clone(),
            preset: config.preset.clone(),
            quality: config.quality,
            threads: config.threads,
            factory: Arc::new(FfmpegSinkFactory),
        }
    }

    pub fn with_sink_factory(mut self, factory: Box<dyn SinkFactory>) -> Self {
        self.factory = Arc::from(factory);
        self
    }

    pub fn with_shared_factory(mut self, factory: Arc<dyn SinkFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Encode `timeline` (plus optional audio) to `output`
    ///
    /// On failure the partially written output is removed before the error is returned.
    pub fn encode(
        &self,
        timeline: &Timeline,
        audio: Option<&AudioTrack>,
        output: &Path,
    ) -> Result<EncodedVideo> {
        let (width, height) = timeline.canvas();
        if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
            return Err(EncodeError::InvalidParameters {
                details: format!("resolution {}x{} must be non-zero and even", width, height),
            }
            .into());
        }

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        // Held until the end of this call, removed on drop
        let audio_file = match audio {
            Some(track) => match write_temp_wav(track) {
                Ok(file) => Some(file),
                Err(e) => {
                    warn!("Could not stage audio for encoding, continuing silent: {}", e);
                    None
                }
            },
            None => None,
        };

        let job = EncodeJob {
            output: output.to_path_buf(),
            width,
            height,
            fps: timeline.fps(),
            codec: self.codec.clone(),
            preset: self.preset.clone(),
            crf: quality_to_crf(self.quality),
            threads: self.threads,
            audio: audio_file.as_ref().map(|f| f.path().to_path_buf()),
        };

        info!(
            "   Encoding {} frames at {} fps ({}, preset {}, crf {})",
            timeline.frame_count(),
            job.fps,
            job.codec,
            job.preset,
            job.crf
        );

        // An output that exists before the sink opens is not ours to remove
        let sink = self.factory.open(&job)?;

        match self.stream(timeline, job.fps, sink) {
            Ok(frame_count) => {
                let file_size = std::fs::metadata(output)
                    .map_err(|e| EncodeError::Failed {
                        reason: format!("output {} is missing after encode: {}", output.display(), e),
                    })?
                    .len();

                Ok(EncodedVideo {
                    path: output.to_path_buf(),
                    duration: timeline.duration(),
                    frame_count,
                    file_size,
                    has_audio: job.audio.is_some(),
                })
            }
            Err(e) => {
                if output.exists() {
                    if let Err(remove_err) = std::fs::remove_file(output) {
                        warn!("Failed to remove partial output {:?}: {}", output, remove_err);
                    }
                }
                Err(e)
            }
        }
    }

    fn stream(&self, timeline: &Timeline, fps: u32, mut sink: Box<dyn FrameSink>) -> Result<usize> {
        let frame_count = timeline.frame_count();

        for k in 0..frame_count {
            let frame = timeline.render_frame(timeline.frame_time(k));
            sink.write_frame(&frame)?;

            if k > 0 && k % (fps as usize * 5).max(1) == 0 {
                debug!("   {} / {} frames", k, frame_count);
            }
        }

        sink.finish()?;
        Ok(frame_count)
    }
}

fn write_temp_wav(track: &AudioTrack) -> Result<tempfile::NamedTempFile> {
    let file = tempfile::Builder::new()
        .prefix("slideshow_audio_")
        .suffix(".wav")
        .tempfile()?;
    track.write_wav(file.path())?;
    Ok(file)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::composition::{TransitionCompositor, TransitionKind, TransitionSelection};
    use crate::effects::EffectName;
    use crate::video::clip::{Motion, TimedClip};
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    /// What a recording sink saw during one encode
    #[derive(Debug, Default)]
    pub(crate) struct Recording {
        pub jobs: Vec<EncodeJob>,
        pub frames: usize,
        pub first_frame: Option<Frame>,
        /// Audio file existed while the sink was open
        pub audio_present: bool,
    }

    /// Counts frames instead of encoding them and writes a stub file on finish
    pub(crate) struct RecordingSinkFactory {
        pub recording: Arc<Mutex<Recording>>,
        pub fail_after: Option<usize>,
    }

    impl RecordingSinkFactory {
        pub fn new() -> (Self, Arc<Mutex<Recording>>) {
            let recording = Arc::new(Mutex::new(Recording::default()));
            (
                Self {
                    recording: recording.clone(),
                    fail_after: None,
                },
                recording,
            )
        }
    }

    struct RecordingSink {
        recording: Arc<Mutex<Recording>>,
        output: PathBuf,
        fail_after: Option<usize>,
        written: usize,
    }

    impl SinkFactory for RecordingSinkFactory {
        fn open(&self, job: &EncodeJob) -> Result<Box<dyn FrameSink>> {
            let mut recording = self.recording.lock().unwrap();
            recording.audio_present = job.audio.as_ref().map_or(false, |p| p.exists());
            recording.jobs.push(job.clone());
            std::fs::write(&job.output, b"partial")?;
            Ok(Box::new(RecordingSink {
                recording: self.recording.clone(),
                output: job.output.clone(),
                fail_after: self.fail_after,
                written: 0,
            }))
        }
    }

    impl FrameSink for RecordingSink {
        fn write_frame(&mut self, frame: &Frame) -> Result<()> {
            if Some(self.written) == self.fail_after {
                return Err(EncodeError::Failed { reason: "disk full".to_string() }.into());
            }
            self.written += 1;
            let mut recording = self.recording.lock().unwrap();
            recording.frames += 1;
            if recording.first_frame.is_none() {
                recording.first_frame = Some(frame.clone());
            }
            Ok(())
        }

        fn finish(self: Box<Self>) -> Result<()> {
            std::fs::write(&self.output, vec![0u8; 2048])?;
            Ok(())
        }
    }

    fn timeline(clips: usize) -> Timeline {
        let clips = (0..clips)
            .map(|i| TimedClip {
                index: i,
                path: PathBuf::from(format!("{}.png", i)),
                effect: EffectName::None,
                frame: Frame::new_filled(16, 8, [i as u8 * 40, 0, 0]),
                duration: 1.0,
                fps: 24,
                motion: Motion::Static,
            })
            .collect();
        TransitionCompositor::new(
            0.25,
            vec![TransitionKind::Crossfade],
            TransitionSelection::Cycle,
            Some(1),
        )
        .compose(clips, (16, 8), [0, 0, 0])
        .unwrap()
    }

    #[test]
    fn test_quality_to_crf() {
        assert_eq!(quality_to_crf(100), 0);
        assert_eq!(quality_to_crf(0), 51);
        assert_eq!(quality_to_crf(85), 8);
        assert_eq!(quality_to_crf(255), 0);
    }

    #[test]
    fn test_encode_streams_every_frame() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.mp4");
        let (factory, recording) = RecordingSinkFactory::new();
        let encoder = Encoder::new(&VideoConfig::default()).with_sink_factory(Box::new(factory));

        let timeline = timeline(3);
        let encoded = encoder.encode(&timeline, None, &output).unwrap();

        // 3 * 1.0 - 2 * 0.25
        assert_eq!(encoded.frame_count, 60);
        assert_eq!(encoded.file_size, 2048);
        assert!(!encoded.has_audio);

        let recording = recording.lock().unwrap();
        assert_eq!(recording.frames, 60);
        assert_eq!(recording.jobs[0].crf, quality_to_crf(VideoConfig::default().quality));
        assert_eq!(recording.first_frame.as_ref().unwrap().dimensions(), (16, 8));
    }

    #[test]
    fn test_failed_encode_removes_partial_output() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.mp4");
        let (mut factory, _recording) = RecordingSinkFactory::new();
        factory.fail_after = Some(10);
        let encoder = Encoder::new(&VideoConfig::default()).with_sink_factory(Box::new(factory));

        let result = encoder.encode(&timeline(2), None, &output);

        assert!(matches!(
            result,
            Err(crate::error::CompositorError::Encode(EncodeError::Failed { .. }))
        ));
        assert!(!output.exists());
    }

    struct UnavailableSinkFactory;

    impl SinkFactory for UnavailableSinkFactory {
        fn open(&self, _job: &EncodeJob) -> Result<Box<dyn FrameSink>> {
            Err(EncodeError::FfmpegUnavailable.into())
        }
    }

    #[test]
    fn test_unopened_sink_leaves_existing_output_alone() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.mp4");
        std::fs::write(&output, b"yesterday's video").unwrap();
        let encoder =
            Encoder::new(&VideoConfig::default()).with_sink_factory(Box::new(UnavailableSinkFactory));

        let result = encoder.encode(&timeline(2), None, &output);

        assert!(result.is_err());
        assert_eq!(std::fs::read(&output).unwrap(), b"yesterday's video");
    }

    #[test]
    fn test_audio_is_staged_as_a_temporary_wav() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.mp4");
        let (factory, recording) = RecordingSinkFactory::new();
        let encoder = Encoder::new(&VideoConfig::default()).with_sink_factory(Box::new(factory));

        let track = AudioTrack {
            samples: vec![0.25; 8000],
            sample_rate: 8000,
            channels: 1,
        };

        let encoded = encoder.encode(&timeline(1), Some(&track), &output).unwrap();
        assert!(encoded.has_audio);

        let recording = recording.lock().unwrap();
        assert!(recording.audio_present);
        let staged = recording.jobs[0].audio.clone().unwrap();
        assert!(!staged.exists(), "temporary audio should be gone after encoding");
    }

    #[test]
    fn test_odd_resolution_is_rejected() {
        let clip = TimedClip {
            index: 0,
            path: PathBuf::from("a.png"),
            effect: EffectName::None,
            frame: Frame::new_black(15, 8),
            duration: 1.0,
            fps: 24,
            motion: Motion::Static,
        };
        let timeline = TransitionCompositor::new(0.0, vec![], TransitionSelection::Fixed, None)
            .compose(vec![clip], (15, 8), [0, 0, 0])
            .unwrap();

        let dir = tempdir().unwrap();
        let (factory, _recording) = RecordingSinkFactory::new();
        let encoder = Encoder::new(&VideoConfig::default()).with_sink_factory(Box::new(factory));
        assert!(encoder.encode(&timeline, None, &dir.path().join("x.mp4")).is_err());
    }

    #[test]
    fn test_real_ffmpeg_encode() {
        if !check_ffmpeg_available() {
            return;
        }
        let dir = tempdir().unwrap();
        let output = dir.path().join("real.mp4");
        let encoder = Encoder::new(&VideoConfig::default());

        let encoded = encoder.encode(&timeline(2), None, &output).unwrap();
        assert!(encoded.file_size > 0);
        assert!(output.exists());
    }
}
