//! Rank data model and the ranking/fusion stages built on top of the core
//! audio/video primitives. Every modality produces a [`RankSequence`] in its
//! native granularity; fusion only ever sees per-second
//! [`NormalizedRankSequence`]s, so modalities stay interchangeable.

pub mod error;
pub mod fusion;
pub mod normalize;
pub mod pipeline;
pub mod store;
pub mod text;
pub mod timestamp;
pub mod visual;

pub use error::{PipelineError, RankError};
pub use fusion::{fuse, FusionConfig, FusionReport};
pub use normalize::normalize;
pub use pipeline::{PipelineConfig, TrimPipeline};
pub use store::RankStore;
pub use text::{TextRankConfig, TextRanker};
pub use timestamp::{derive_timestamps, output_duration, ClipSpan};
pub use visual::{VisualRankConfig, VisualRanker, VisualRanks};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modality {
    Motion,
    Blur,
    Text,
    Audio,
}

impl Modality {
    /// File name of the persisted rank artifact for this modality.
    pub fn artifact_name(&self) -> &'static str {
        match self {
            Modality::Motion => "motion.json",
            Modality::Blur => "blur.json",
            Modality::Text => "text.json",
            Modality::Audio => "audio.json",
        }
    }
}

/// Native sampling granularity of a rank sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankUnit {
    /// One value per video frame.
    Frame,
    /// One value per second of media.
    Second,
}

/// Ordered per-unit interestingness scores for one modality. Values are
/// non-negative; zero means "not ranked interesting".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankSequence {
    pub modality: Modality,
    pub unit: RankUnit,
    pub values: Vec<f64>,
}

impl RankSequence {
    pub fn new(modality: Modality, unit: RankUnit, values: Vec<f64>) -> Self {
        debug_assert!(values.iter().all(|&v| v >= 0.0));
        Self {
            modality,
            unit,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Per-second rank values for one modality, aligned with every other
/// normalized sequence of the same media item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedRankSequence {
    pub modality: Modality,
    pub values: Vec<f64>,
}

impl NormalizedRankSequence {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
