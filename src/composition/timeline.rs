use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{CompositionError, Result},
    video::{clip::TimedClip, types::Frame},
};

/// Edge a sliding clip enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SlideEdge {
    #[default]
    Left,
    Right,
    Top,
    Bottom,
}

/// Direction a wipe boundary travels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WipeDirection {
    #[default]
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

/// Treatment applied to the incoming clip during an overlap window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionKind {
    /// Incoming opacity ramps linearly from 0 to 1
    #[serde(alias = "fade")]
    Crossfade,
    /// Incoming clip moves from fully off-frame to its resting position
    Slide {
        #[serde(default)]
        edge: SlideEdge,
    },
    /// Hard-edged boundary reveals the incoming clip, no blending
    Wipe {
        #[serde(default)]
        direction: WipeDirection,
    },
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crossfade => write!(f, "crossfade"),
            Self::Slide { edge } => write!(f, "slide from {:?}", edge),
            Self::Wipe { direction } => write!(f, "wipe {:?}", direction),
        }
    }
}

/// How a treatment is picked for each clip boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransitionSelection {
    /// Always the first configured kind
    Fixed,
    /// Boundary `i` uses `kinds[i % kinds.len()]`
    #[default]
    Cycle,
    /// Uniformly random per boundary
    Random,
}

/// One clip placed on the timeline
#[derive(Debug, Clone)]
pub struct TimelineEntry {
    pub clip: TimedClip,
    /// Absolute start time in seconds
    pub start: f64,
    /// Treatment used while this clip overlaps the previous one
    pub transition: Option<TransitionKind>,
}

impl TimelineEntry {
    pub fn end(&self) -> f64 {
        self.start + self.clip.duration
    }
}

/// Clips arranged on a shared time axis, rendered on demand
#[derive(Debug, Clone)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
    canvas: (u32, u32),
    background: [u8; 3],
    fps: u32,
    transition_duration: f64,
    edge_fade: f64,
    duration: f64,
}

impl Timeline {
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn canvas(&self) -> (u32, u32) {
        self.canvas
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Overlap between adjacent clips, zero for straight cuts
    pub fn transition_duration(&self) -> f64 {
        self.transition_duration
    }

    /// Length of the fade from and to the background at either end
    pub fn edge_fade(&self) -> f64 {
        self.edge_fade
    }

    /// Total length in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Number of output frames, never zero
    pub fn frame_count(&self) -> usize {
        ((self.duration * self.fps as f64).round() as usize).max(1)
    }

    /// Presentation time of frame `k`
    pub fn frame_time(&self, k: usize) -> f64 {
        k as f64 / self.fps as f64
    }

    /// Resolution as `WxH`
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.canvas.0, self.canvas.1)
    }

    /// Compose the picture shown at time `t`
    ///
    /// The background is painted first, then every clip on screen at `t` in
    /// timeline order, so an incoming clip always lands on top of the outgoing one.
    pub fn render_frame(&self, t: f64) -> Frame {
        let (width, height) = self.canvas;
        let mut canvas = Frame::new_filled(width, height, self.background);
        let t = t.clamp(0.0, self.duration);
        let last = self.entries.len().saturating_sub(1);

        for (i, entry) in self.entries.iter().enumerate() {
            let on_screen = t >= entry.start && (t < entry.end() || (i == last && t <= entry.end()));
            if !on_screen {
                continue;
            }

            let local = t - entry.start;
            let picture = entry.clip.frame_at(local);
            let origin = (
                (width as i64 - picture.width() as i64) / 2,
                (height as i64 - picture.height() as i64) / 2,
            );

            let progress = match entry.transition {
                Some(kind) if self.transition_duration > 0.0 && local < self.transition_duration => {
                    Some((kind, local / self.transition_duration))
                }
                _ => None,
            };

            match progress {
                None => draw(&mut canvas, &picture, origin, 1.0, |_, _| true),
                Some((kind, p)) => apply_transition(&mut canvas, &picture, origin, kind, p),
            }
        }

        let visibility = self.edge_visibility(t);
        if visibility < 1.0 {
            fade_towards(&mut canvas, self.background, visibility as f32);
        }

        canvas
    }

    /// 0 at the very start and end, 1 once the edge fades are over
    fn edge_visibility(&self, t: f64) -> f64 {
        if self.edge_fade <= 0.0 {
            return 1.0;
        }
        (t / self.edge_fade)
            .min((self.duration - t) / self.edge_fade)
            .clamp(0.0, 1.0)
    }
}

/// Blend every pixel towards `color`, keeping `visibility` of the picture
fn fade_towards(canvas: &mut Frame, color: [u8; 3], visibility: f32) {
    let keep = visibility.clamp(0.0, 1.0);
    canvas.as_image_mut().par_chunks_mut(3).for_each(|px| {
        for c in 0..3 {
            let bg = color[c] as f32;
            px[c] = (bg + (px[c] as f32 - bg) * keep).round() as u8;
        }
    });
}

fn apply_transition(
    canvas: &mut Frame,
    picture: &Frame,
    origin: (i64, i64),
    kind: TransitionKind,
    progress: f64,
) {
    let p = progress.clamp(0.0, 1.0);
    let (width, height) = canvas.dimensions();

    match kind {
        TransitionKind::Crossfade => draw(canvas, picture, origin, p as f32, |_, _| true),
        TransitionKind::Slide { edge } => {
            let dx = ((1.0 - p) * width as f64).round() as i64;
            let dy = ((1.0 - p) * height as f64).round() as i64;
            let shifted = match edge {
                SlideEdge::Left => (origin.0 - dx, origin.1),
                SlideEdge::Right => (origin.0 + dx, origin.1),
                SlideEdge::Top => (origin.0, origin.1 - dy),
                SlideEdge::Bottom => (origin.0, origin.1 + dy),
            };
            draw(canvas, picture, shifted, 1.0, |_, _| true);
        }
        TransitionKind::Wipe { direction } => {
            let bx = (p * width as f64).round() as u32;
            let by = (p * height as f64).round() as u32;
            match direction {
                WipeDirection::LeftToRight => draw(canvas, picture, origin, 1.0, |x, _| x < bx),
                WipeDirection::RightToLeft => {
                    draw(canvas, picture, origin, 1.0, |x, _| x >= width - bx)
                }
                WipeDirection::TopToBottom => draw(canvas, picture, origin, 1.0, |_, y| y < by),
                WipeDirection::BottomToTop => {
                    draw(canvas, picture, origin, 1.0, |_, y| y >= height - by)
                }
            }
        }
    }
}

/// Paint `picture` at `origin` (canvas coordinates, may be off-frame) with
/// opacity `alpha`, only where `reveal(x, y)` holds
fn draw<F>(canvas: &mut Frame, picture: &Frame, origin: (i64, i64), alpha: f32, reveal: F)
where
    F: Fn(u32, u32) -> bool + Sync,
{
    let (cw, ch) = canvas.dimensions();
    let (pw, ph) = picture.dimensions();
    let (ox, oy) = origin;
    if cw == 0 || ch == 0 || alpha <= 0.0 {
        return;
    }

    let x0 = ox.max(0);
    let x1 = (ox + pw as i64).min(cw as i64);
    if x0 >= x1 {
        return;
    }

    let src = picture.as_rgb_bytes();
    let opaque = alpha >= 1.0;
    let row_len = cw as usize * 3;

    canvas
        .as_image_mut()
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let sy = y as i64 - oy;
            if sy < 0 || sy >= ph as i64 {
                return;
            }

            for x in x0..x1 {
                if !reveal(x as u32, y as u32) {
                    continue;
                }
                let si = (sy as usize * pw as usize + (x - ox) as usize) * 3;
                let di = x as usize * 3;
                for c in 0..3 {
                    row[di + c] = if opaque {
                        src[si + c]
                    } else {
                        (row[di + c] as f32 * (1.0 - alpha) + src[si + c] as f32 * alpha).round()
                            as u8
                    };
                }
            }
        });
}

/// Places clips on a timeline with overlapping transitions
#[derive(Debug, Clone)]
pub struct TransitionCompositor {
    duration: f64,
    kinds: Vec<TransitionKind>,
    selection: TransitionSelection,
    seed: Option<u64>,
    edge_fade: f64,
}

impl TransitionCompositor {
    pub fn new(
        duration: f64,
        kinds: Vec<TransitionKind>,
        selection: TransitionSelection,
        seed: Option<u64>,
    ) -> Self {
        Self { duration, kinds, selection, seed, edge_fade: 0.0 }
    }

    pub fn from_config(config: &crate::config::TransitionConfig) -> Self {
        Self::new(config.duration, config.kinds.clone(), config.selection, config.seed)
            .with_edge_fade(config.edge_fade)
    }

    /// Fade in from the background at the start and out to it at the end
    pub fn with_edge_fade(mut self, seconds: f64) -> Self {
        self.edge_fade = seconds.max(0.0);
        self
    }

    /// Overlap actually used: zero when no treatment is configured
    pub fn overlap(&self) -> f64 {
        if self.kinds.is_empty() {
            0.0
        } else {
            self.duration.max(0.0)
        }
    }

    /// Build the timeline: `start_i = Σ_{j<i}(d_j − overlap)`
    pub fn compose(
        &self,
        clips: Vec<TimedClip>,
        canvas: (u32, u32),
        background: [u8; 3],
    ) -> Result<Timeline> {
        let fps = match clips.first() {
            Some(clip) => clip.fps,
            None => return Err(CompositionError::NoClips { attempted: 0 }.into()),
        };
        if fps == 0 {
            return Err(CompositionError::InvalidParameters {
                details: "frame rate must be positive".to_string(),
            }
            .into());
        }

        let overlap = self.overlap();
        if clips.len() > 1 {
            if let Some(short) = clips.iter().find(|c| c.duration <= overlap) {
                return Err(CompositionError::InvalidParameters {
                    details: format!(
                        "transition of {:.2}s does not fit clip {} of {:.2}s",
                        overlap, short.index, short.duration
                    ),
                }
                .into());
            }
        }

        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let mut entries = Vec::with_capacity(clips.len());
        let mut start = 0.0;

        for (i, clip) in clips.into_iter().enumerate() {
            let transition = if i == 0 || overlap == 0.0 {
                None
            } else {
                self.pick(i - 1, &mut rng)
            };

            debug!(
                "Clip {} at {:.2}s for {:.2}s ({})",
                clip.index,
                start,
                clip.duration,
                transition.map(|t| t.to_string()).unwrap_or_else(|| "cut".to_string())
            );

            let next_start = start + clip.duration - overlap;
            entries.push(TimelineEntry { clip, start, transition });
            start = next_start;
        }

        let duration = entries.last().map(TimelineEntry::end).unwrap_or(0.0);
        // Fades never overlap each other
        let edge_fade = self.edge_fade.min(duration / 2.0);

        Ok(Timeline {
            entries,
            canvas,
            background,
            fps,
            transition_duration: overlap,
            edge_fade,
            duration,
        })
    }

    fn pick(&self, boundary: usize, rng: &mut SmallRng) -> Option<TransitionKind> {
        if self.kinds.is_empty() {
            return None;
        }
        let kind = match self.selection {
            TransitionSelection::Fixed => self.kinds[0],
            TransitionSelection::Cycle => self.kinds[boundary % self.kinds.len()],
            TransitionSelection::Random => self.kinds[rng.gen_range(0..self.kinds.len())],
        };
        Some(kind)
    }
}
