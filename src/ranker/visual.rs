//! Motion and sharpness ranking in a single streaming pass. Both metrics are
//! cheap enough to run on every frame, so unlike the text path no sampling
//! window is involved: each frame gets its own motion and blur rank.

use log::{debug, info};

use crate::context::{MediaContext, MetaKey};
use crate::core::video::source::FrameSource;

use super::{Modality, RankSequence, RankUnit};

#[derive(Debug, Clone)]
pub struct VisualRankConfig {
    /// Mean absolute grayscale difference (0-255) against the previous frame
    /// above which a frame counts as moving.
    pub motion_threshold: f64,
    /// Laplacian variance at or above which a frame counts as sharp.
    pub sharpness_threshold: f64,
    /// Rank assigned to moving frames.
    pub rank_motion: f64,
    /// Rank assigned to sharp frames (the blur modality rewards focus).
    pub rank_blur: f64,
}

impl Default for VisualRankConfig {
    fn default() -> Self {
        Self {
            motion_threshold: 10.0,
            sharpness_threshold: 150.0,
            rank_motion: 3.0,
            rank_blur: 2.0,
        }
    }
}

/// The two frame-granular sequences produced by one visual pass.
pub struct VisualRanks {
    pub motion: RankSequence,
    pub blur: RankSequence,
}

pub struct VisualRanker {
    config: VisualRankConfig,
}

impl VisualRanker {
    pub fn new() -> Self {
        Self::with_config(VisualRankConfig::default())
    }

    pub fn with_config(config: VisualRankConfig) -> Self {
        Self { config }
    }

    /// Consume the source until stopped and drained. The first frame has no
    /// predecessor and always gets motion rank zero.
    pub fn process(&self, source: &FrameSource, ctx: &MediaContext) -> VisualRanks {
        ctx.publish(MetaKey::Fps, source.fps());
        ctx.publish(MetaKey::FrameCount, source.frame_count() as f64);

        let mut motion = Vec::new();
        let mut blur = Vec::new();
        let mut previous: Option<Vec<u8>> = None;

        loop {
            let frame = match source.read() {
                Some(frame) => frame,
                None if source.stopped() => break,
                None => continue,
            };

            let gray = frame.to_grayscale();

            let sharpness = laplacian_variance(&gray, frame.width as usize, frame.height as usize);
            blur.push(if sharpness >= self.config.sharpness_threshold {
                self.config.rank_blur
            } else {
                0.0
            });

            let movement = match &previous {
                Some(prev) if prev.len() == gray.len() => mean_abs_diff(prev, &gray),
                _ => 0.0,
            };
            motion.push(if movement > self.config.motion_threshold {
                self.config.rank_motion
            } else {
                0.0
            });

            debug!(
                "frame {}: movement {:.2}, sharpness {:.2}",
                frame.frame_number, movement, sharpness
            );
            previous = Some(gray);
        }

        info!(
            "visual rank lengths: motion {}, blur {}",
            motion.len(),
            blur.len()
        );
        VisualRanks {
            motion: RankSequence::new(Modality::Motion, RankUnit::Frame, motion),
            blur: RankSequence::new(Modality::Blur, RankUnit::Frame, blur),
        }
    }
}

impl Default for VisualRanker {
    fn default() -> Self {
        Self::new()
    }
}

fn mean_abs_diff(a: &[u8], b: &[u8]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let total: u64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x as i64 - y as i64).unsigned_abs())
        .sum();
    total as f64 / a.len() as f64
}

/// Variance of the 4-neighbor Laplacian; near zero on flat or defocused
/// frames, large wherever hard edges survive.
fn laplacian_variance(gray: &[u8], width: usize, height: usize) -> f64 {
    if width < 3 || height < 3 {
        return 0.0;
    }

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut count = 0u64;

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let idx = y * width + x;
            let lap = gray[idx - 1] as f64
                + gray[idx + 1] as f64
                + gray[idx - width] as f64
                + gray[idx + width] as f64
                - 4.0 * gray[idx] as f64;
            sum += lap;
            sum_sq += lap * lap;
            count += 1;
        }
    }

    if count == 0 {
        return 0.0;
    }
    let mean = sum / count as f64;
    (sum_sq / count as f64 - mean * mean).max(0.0)
}
