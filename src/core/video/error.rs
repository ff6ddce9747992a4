use thiserror::Error;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("failed to open video source: {0}")]
    Open(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
