//! Fusion of the normalized modality timelines into trim decisions and
//! summary statistics.

use log::{info, warn};
use serde::Serialize;

use crate::context::{MediaContext, MetaKey};

use super::timestamp::{composite_scores, derive_timestamps, output_duration, ClipSpan};
use super::{NormalizedRankSequence, RankError};

#[derive(Debug, Clone)]
pub struct FusionConfig {
    /// Composite score a second must reach to be kept.
    pub min_score: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self { min_score: 3.0 }
    }
}

/// Outcome of one fusion run, the externally consumed artifact of the whole
/// pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct FusionReport {
    pub spans: Vec<ClipSpan>,
    /// Summed per-second score the spans were derived from.
    pub composite: Vec<f64>,
    pub clip_count: usize,
    /// Seconds of media the spans retain.
    pub output_duration: f64,
    /// Percent of the original duration retained; `None` when the video
    /// metadata was never published.
    pub percent_kept: Option<f64>,
}

/// Sum the normalized sequences, extract keep-ranges and compute summary
/// statistics from the cached frame count and frame rate.
pub fn fuse(
    sequences: &[NormalizedRankSequence],
    ctx: &MediaContext,
    config: &FusionConfig,
) -> Result<FusionReport, RankError> {
    let spans = derive_timestamps(sequences, config.min_score)?;
    let composite = composite_scores(sequences);

    if spans.is_empty() {
        warn!("no portions scored {} or above; nothing to trim", config.min_score);
    }

    let duration = output_duration(&spans);
    let percent_kept = match (ctx.read(MetaKey::FrameCount), ctx.read(MetaKey::Fps)) {
        (Some(frames), Some(fps)) if fps > 0.0 => {
            let original = (frames / fps).abs();
            if original > 0.0 {
                Some(duration / original * 100.0)
            } else {
                None
            }
        }
        _ => None,
    };

    info!("clipping a total of {} sub portions", spans.len());
    info!("output video length would be approx {:.1}s", duration);
    if let Some(percent) = percent_kept {
        info!("keeping {:.1}% of the original video", percent);
    }

    Ok(FusionReport {
        clip_count: spans.len(),
        spans,
        composite,
        output_duration: duration,
        percent_kept,
    })
}
