//! Temporal normalization: every modality ranks in its own granularity
//! (per frame for the visual paths, per second for audio), so before fusion
//! each sequence is resampled onto one value per whole second of media.

use log::debug;

use super::{NormalizedRankSequence, RankSequence, RankUnit};

/// Collapse a rank sequence onto the per-second timeline.
///
/// Frame-granular sequences are averaged over non-overlapping windows of
/// `trunc(fps)` frames starting at index 0. A window is only emitted when its
/// end index is strictly below `total_units` and the sequence actually holds
/// values for the whole window; the trailing remainder is discarded, never
/// padded or guessed. Second-granular sequences are already aligned and pass
/// through unchanged.
pub fn normalize(seq: &RankSequence, fps: f64, total_units: u64) -> NormalizedRankSequence {
    match seq.unit {
        RankUnit::Second => NormalizedRankSequence {
            modality: seq.modality,
            values: seq.values.clone(),
        },
        RankUnit::Frame => {
            let values = window_means(&seq.values, fps, total_units);
            debug!(
                "{:?}: normalized {} frame ranks into {} seconds",
                seq.modality,
                seq.values.len(),
                values.len()
            );
            NormalizedRankSequence {
                modality: seq.modality,
                values,
            }
        }
    }
}

fn window_means(values: &[f64], fps: f64, total_units: u64) -> Vec<f64> {
    let window = fps as usize;
    if window == 0 {
        return Vec::new();
    }

    let total = total_units as usize;
    let mut means = Vec::new();
    let mut start = 0usize;

    while start + window < total {
        let end = start + window;
        if end > values.len() {
            break;
        }
        let sum: f64 = values[start..end].iter().sum();
        means.push(sum / window as f64);
        start = end;
    }

    means
}
