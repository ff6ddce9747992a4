pub mod detector;
pub mod error;
pub mod frame;
pub mod source;

#[cfg(test)]
pub mod testing;

pub use detector::{EdgeTextDetector, MockTextDetector, ScoreGrid, TextDetector};
pub use error::VideoError;
pub use frame::Frame;
pub use source::{FrameSource, SourceConfig, SourceStats, VideoSource, VideoStream};
