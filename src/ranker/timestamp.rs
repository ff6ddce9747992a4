//! Timestamp derivation over the fused per-second timeline.

use serde::{Deserialize, Serialize};

use super::{NormalizedRankSequence, RankError};

/// One keep-range, in seconds. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipSpan {
    pub start: f64,
    pub end: f64,
}

impl ClipSpan {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Element-wise sum of the normalized sequences, truncated to the shortest.
pub fn composite_scores(sequences: &[NormalizedRankSequence]) -> Vec<f64> {
    let len = sequences
        .iter()
        .map(|s| s.values.len())
        .min()
        .unwrap_or(0);

    (0..len)
        .map(|i| sequences.iter().map(|s| s.values[i]).sum())
        .collect()
}

/// Scan the composite score for maximal contiguous runs of seconds whose
/// score reaches `min_score`, emitting ordered, non-overlapping spans.
///
/// Every modality must have produced a non-empty normalized sequence; a
/// missing one aborts derivation so the caller can surface which feature
/// never ranked.
pub fn derive_timestamps(
    sequences: &[NormalizedRankSequence],
    min_score: f64,
) -> Result<Vec<ClipSpan>, RankError> {
    if sequences.is_empty() {
        return Err(RankError::NoSequences);
    }
    for seq in sequences {
        if seq.is_empty() {
            return Err(RankError::FeatureMissing(seq.modality));
        }
    }

    let composite = composite_scores(sequences);
    let mut spans = Vec::new();
    let mut open: Option<usize> = None;

    for (second, &score) in composite.iter().enumerate() {
        if score >= min_score {
            if open.is_none() {
                open = Some(second);
            }
        } else if let Some(start) = open.take() {
            spans.push(ClipSpan {
                start: start as f64,
                end: second as f64,
            });
        }
    }
    if let Some(start) = open {
        spans.push(ClipSpan {
            start: start as f64,
            end: composite.len() as f64,
        });
    }

    Ok(spans)
}

/// Total duration covered by a timestamp list.
pub fn output_duration(spans: &[ClipSpan]) -> f64 {
    spans.iter().map(ClipSpan::duration).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranker::Modality;

    fn seq(modality: Modality, values: Vec<f64>) -> NormalizedRankSequence {
        NormalizedRankSequence { modality, values }
    }

    #[test]
    fn test_missing_feature_aborts() {
        let sequences = vec![
            seq(Modality::Audio, vec![3.0, 3.0]),
            seq(Modality::Text, vec![]),
        ];
        let result = derive_timestamps(&sequences, 3.0);
        assert!(matches!(
            result,
            Err(RankError::FeatureMissing(Modality::Text))
        ));
    }

    #[test]
    fn test_no_sequences_aborts() {
        assert!(matches!(
            derive_timestamps(&[], 3.0),
            Err(RankError::NoSequences)
        ));
    }

    #[test]
    fn test_single_run_detected() {
        let sequences = vec![seq(
            Modality::Audio,
            vec![0.0, 0.0, 3.0, 3.0, 0.0, 0.0],
        )];
        let spans = derive_timestamps(&sequences, 3.0).unwrap();
        assert_eq!(spans, vec![ClipSpan { start: 2.0, end: 4.0 }]);
    }

    #[test]
    fn test_run_reaching_the_end_is_closed() {
        let sequences = vec![seq(Modality::Audio, vec![0.0, 3.0, 3.0])];
        let spans = derive_timestamps(&sequences, 3.0).unwrap();
        assert_eq!(spans, vec![ClipSpan { start: 1.0, end: 3.0 }]);
    }

    #[test]
    fn test_modalities_sum_before_thresholding() {
        // neither modality clears the bar alone; together they do
        let sequences = vec![
            seq(Modality::Audio, vec![0.0, 2.0, 0.0]),
            seq(Modality::Text, vec![0.0, 2.0, 2.0]),
        ];
        let spans = derive_timestamps(&sequences, 3.0).unwrap();
        assert_eq!(spans, vec![ClipSpan { start: 1.0, end: 2.0 }]);
    }

    #[test]
    fn test_lengths_truncate_to_shortest() {
        let sequences = vec![
            seq(Modality::Audio, vec![3.0; 10]),
            seq(Modality::Text, vec![0.0; 4]),
        ];
        let spans = derive_timestamps(&sequences, 3.0).unwrap();
        assert_eq!(spans, vec![ClipSpan { start: 0.0, end: 4.0 }]);
    }

    #[test]
    fn test_spans_ordered_and_non_overlapping() {
        let sequences = vec![seq(
            Modality::Audio,
            vec![3.0, 0.0, 3.0, 3.0, 0.0, 3.0, 0.0, 3.0],
        )];
        let spans = derive_timestamps(&sequences, 3.0).unwrap();
        assert_eq!(spans.len(), 4);
        for span in &spans {
            assert!(span.start < span.end);
        }
        for pair in spans.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn test_nothing_above_threshold_yields_empty_list() {
        let sequences = vec![seq(Modality::Audio, vec![0.0, 1.0, 2.0])];
        let spans = derive_timestamps(&sequences, 3.0).unwrap();
        assert!(spans.is_empty());
    }

    #[test]
    fn test_output_duration() {
        let spans = vec![
            ClipSpan { start: 1.0, end: 4.0 },
            ClipSpan { start: 7.0, end: 8.0 },
        ];
        assert_eq!(output_duration(&spans), 4.0);
        assert_eq!(output_duration(&[]), 0.0);
    }
}
