pub mod denoiser;
pub mod error;
pub mod utils;
pub mod wavelet;

pub use denoiser::{AudioDenoiser, DenoiseConfig, DenoiseOutcome};
pub use error::AudioError;
pub use utils::{rms, WavBlockReader, WavBlockWriter};
pub use wavelet::{mad, soft_threshold, wavedec, waverec, WaveletBands};
