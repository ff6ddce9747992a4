use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("input file {0:?} does not exist")]
    InputMissing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV format error: {0}")]
    Wav(#[from] hound::Error),
    #[error("unsupported sample format: {0} bits per sample")]
    UnsupportedFormat(u16),
}
