use thiserror::Error;

use crate::core::audio::AudioError;
use crate::core::video::VideoError;

use super::Modality;

#[derive(Debug, Error)]
pub enum RankError {
    #[error("ranking for {0:?} feature is missing or empty")]
    FeatureMissing(Modality),
    #[error("no rank sequences were provided")]
    NoSequences,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("rank serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error(transparent)]
    Video(#[from] VideoError),
    #[error(transparent)]
    Rank(#[from] RankError),
}
