//! Text-presence ranking. Frames come from a [`FrameSource`]; every
//! `round(fps × skip_seconds)` frames one of them is shown to the
//! text-detection oracle, and its verdict ranks the whole just-elapsed
//! window. Frames between sampling points are drained without ranking so a
//! slow oracle never stalls ingestion for longer than one window.

use log::{debug, info};

use crate::context::{MediaContext, MetaKey};
use crate::core::video::detector::TextDetector;
use crate::core::video::source::FrameSource;

use super::{Modality, RankSequence, RankUnit};

#[derive(Debug, Clone)]
pub struct TextRankConfig {
    /// Grid cells below this confidence are ignored.
    pub min_confidence: f32,
    /// Mean confidence the passing cells must exceed to rank the window.
    pub mean_gate: f32,
    /// Seconds between oracle invocations.
    pub skip_seconds: f64,
    /// Rank assigned to every frame of a window with detected text.
    pub rank_value: f64,
    /// Oracle input edge length; frames are resized square before detection.
    pub detector_size: u32,
}

impl Default for TextRankConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            mean_gate: 0.5,
            skip_seconds: 0.5,
            rank_value: 5.0,
            detector_size: 320,
        }
    }
}

pub struct TextRanker {
    config: TextRankConfig,
}

impl TextRanker {
    pub fn new() -> Self {
        Self::with_config(TextRankConfig::default())
    }

    pub fn with_config(config: TextRankConfig) -> Self {
        Self { config }
    }

    /// Consume the source until it is stopped and drained, producing one
    /// frame-granular rank sequence. A read timeout while the producer is
    /// still running is retried, not treated as end of stream.
    pub fn process(
        &self,
        source: &FrameSource,
        detector: &dyn TextDetector,
        ctx: &MediaContext,
    ) -> RankSequence {
        let fps = source.fps();
        ctx.publish(MetaKey::Fps, fps);
        ctx.publish(MetaKey::FrameCount, source.frame_count() as f64);

        let skip_frames = ((fps * self.config.skip_seconds).round() as u64).max(1);
        let mut ranks = Vec::new();
        let mut count = 0u64;

        loop {
            let frame = match source.read() {
                Some(frame) => frame,
                None if source.stopped() => break,
                None => continue,
            };

            count += 1;
            if count % skip_frames != 0 {
                continue;
            }

            let sized = frame.resize_to(self.config.detector_size, self.config.detector_size);
            let grid = detector.detect(&sized);

            let passing: Vec<f32> = grid
                .iter()
                .filter(|&c| c >= self.config.min_confidence)
                .collect();
            let window_rank = if passing.len() > 1 {
                let mean = passing.iter().sum::<f32>() / passing.len() as f32;
                debug!(
                    "frame {}: {} cells passing, mean confidence {:.2}",
                    frame.frame_number,
                    passing.len(),
                    mean
                );
                if mean > self.config.mean_gate {
                    self.config.rank_value
                } else {
                    0.0
                }
            } else {
                0.0
            };

            ranks.extend(std::iter::repeat(window_rank).take(skip_frames as usize));
        }

        info!("textual rank length {}", ranks.len());
        RankSequence::new(Modality::Text, RankUnit::Frame, ranks)
    }
}

impl Default for TextRanker {
    fn default() -> Self {
        Self::new()
    }
}
