//! Block-wise audio denoising with adaptive wavelet thresholding, plus the
//! coarse energy ranking used by fusion.
//!
//! Each block goes through forward decomposition, a MAD noise estimate on the
//! finest detail band, the Donoho–Johnstone universal threshold and soft
//! shrinkage of every detail band, then reconstruction. The cleaned block is
//! written out immediately with the same sample count it came in with.

use std::path::Path;

use log::{debug, error, info};

use crate::context::{MediaContext, MetaKey};

use super::error::AudioError;
use super::utils::{rms, WavBlockReader, WavBlockWriter};
use super::wavelet::{mad, soft_threshold, wavedec, waverec};

/// Shortest block (frames per channel) worth running through the transform.
const MIN_DENOISE_FRAMES: usize = 8;

#[derive(Debug, Clone)]
pub struct DenoiseConfig {
    /// Decomposition depth; shallower on blocks too short to support it.
    pub wavelet_levels: usize,
    /// Block duration as a fraction of the total input duration.
    pub block_fraction: f64,
    /// RMS floor below which a block ranks as silence.
    pub silence_threshold: f64,
    /// Rank assigned to each one-second unit of a non-silent block.
    pub rank_value: f64,
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            wavelet_levels: 4,
            block_fraction: 0.1,
            silence_threshold: 0.005,
            rank_value: 3.0,
        }
    }
}

/// Result of one denoising run.
#[derive(Debug, Clone)]
pub struct DenoiseOutcome {
    /// One energy rank per one-second unit, in stream order.
    pub energy: Vec<f64>,
    /// Frames read from the input.
    pub frames_in: u64,
    /// Frames written to the output; always equals `frames_in`.
    pub frames_out: u64,
}

pub struct AudioDenoiser {
    config: DenoiseConfig,
}

impl AudioDenoiser {
    pub fn new() -> Self {
        Self::with_config(DenoiseConfig::default())
    }

    pub fn with_config(config: DenoiseConfig) -> Self {
        Self { config }
    }

    /// Denoise `input` into `output` block by block, publishing the audio
    /// metadata and collecting per-second energy ranks along the way.
    ///
    /// A missing input aborts before the output file is created.
    pub fn process(
        &self,
        input: &Path,
        output: &Path,
        ctx: &MediaContext,
    ) -> Result<DenoiseOutcome, AudioError> {
        if !input.is_file() {
            error!("file {:?} does not exist", input);
            return Err(AudioError::InputMissing(input.to_path_buf()));
        }

        let mut reader = WavBlockReader::open(input)?;
        let spec = reader.spec();
        let channels = spec.channels as usize;
        let rate = spec.sample_rate as u64;
        let total_frames = reader.total_frames();
        let duration = total_frames as f64 / rate as f64;

        ctx.publish(MetaKey::SampleRate, rate as f64);
        ctx.publish(MetaKey::Duration, duration);
        info!("audio duration is {:.2}s ({} frames)", duration, total_frames);

        let block_frames = ((total_frames as f64 * self.config.block_fraction) as usize).max(1);
        let mut writer = WavBlockWriter::create(output, spec)?;
        let mut energy = Vec::new();
        let mut frames_in = 0u64;
        let mut frames_out = 0u64;

        loop {
            let block = reader.next_block(block_frames)?;
            if block.is_empty() {
                break;
            }

            let cleaned = self.denoise_block(&block, channels);
            writer.write_block(&cleaned)?;

            let block_frame_count = (block.len() / channels.max(1)) as u64;
            frames_in += block_frame_count;
            frames_out += (cleaned.len() / channels.max(1)) as u64;

            // rank from the raw block, one unit per whole second it spans
            let units = (block_frame_count / rate.max(1)).max(1) as usize;
            let value = if rms(&block) > self.config.silence_threshold {
                self.config.rank_value
            } else {
                0.0
            };
            energy.extend(std::iter::repeat(value).take(units));
        }

        writer.finalize()?;
        info!(
            "audio denoised: {} frames written, rank length {}",
            frames_out,
            energy.len()
        );

        Ok(DenoiseOutcome {
            energy,
            frames_in,
            frames_out,
        })
    }

    /// Denoise one interleaved block, channel by channel. Degenerate blocks
    /// (ragged interleaving, too short, zero sigma) pass through unchanged.
    fn denoise_block(&self, block: &[f32], channels: usize) -> Vec<f32> {
        let mut out = block.to_vec();
        if channels == 0 || block.len() % channels != 0 {
            return out;
        }
        let frame_count = block.len() / channels;
        if frame_count < MIN_DENOISE_FRAMES {
            return out;
        }

        for ch in 0..channels {
            let channel: Vec<f64> = block
                .iter()
                .skip(ch)
                .step_by(channels)
                .map(|&s| s as f64)
                .collect();

            let mut bands = wavedec(&channel, self.config.wavelet_levels);
            if bands.levels() == 0 {
                continue;
            }

            let sigma = mad(bands.finest_detail().unwrap_or(&[]));
            if sigma <= 0.0 {
                continue;
            }

            // VisuShrink universal threshold
            let thresh = sigma * (2.0 * (frame_count as f64).ln()).sqrt();
            for band in bands.details_mut() {
                soft_threshold(band, thresh);
            }

            let cleaned = waverec(&bands);
            debug!("channel {}: sigma {:.6}, threshold {:.6}", ch, sigma, thresh);
            for (frame_idx, value) in cleaned.iter().enumerate() {
                out[frame_idx * channels + ch] = *value as f32;
            }
        }

        out
    }
}

impl Default for AudioDenoiser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec};
    use tempfile::TempDir;

    fn write_wav(path: &Path, channels: u16, rate: u32, frames: &[f32]) {
        let spec = WavSpec {
            channels,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &sample in frames {
            writer
                .write_sample((sample * i16::MAX as f32) as i16)
                .unwrap();
        }
        writer.finalize().unwrap();
    }

    // square wave keeps the RMS obvious while still exercising the transform
    fn square(amplitude: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| if i % 2 == 0 { amplitude } else { -amplitude })
            .collect()
    }

    #[test]
    fn test_missing_input_creates_no_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.wav");
        let ctx = MediaContext::new();

        let result =
            AudioDenoiser::new().process(&dir.path().join("absent.wav"), &output, &ctx);

        assert!(matches!(result, Err(AudioError::InputMissing(_))));
        assert!(!output.exists());
    }

    #[test]
    fn test_sample_count_preserved() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.wav");
        let output = dir.path().join("out.wav");

        // deliberately awkward length: 1.37s stereo
        let frames = 10_960;
        let mut samples = Vec::with_capacity(frames * 2);
        for i in 0..frames {
            samples.push(((i as f32 * 0.11).sin()) * 0.4);
            samples.push(((i as f32 * 0.07).cos()) * 0.3);
        }
        write_wav(&input, 2, 8000, &samples);

        let ctx = MediaContext::new();
        let outcome = AudioDenoiser::new().process(&input, &output, &ctx).unwrap();

        assert_eq!(outcome.frames_in, frames as u64);
        assert_eq!(outcome.frames_out, frames as u64);

        let reader = hound::WavReader::open(&output).unwrap();
        assert_eq!(reader.duration() as u64, frames as u64);
    }

    #[test]
    fn test_publishes_metadata() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.wav");
        write_wav(&input, 1, 8000, &square(0.3, 16_000));

        let ctx = MediaContext::new();
        AudioDenoiser::new()
            .process(&input, &dir.path().join("out.wav"), &ctx)
            .unwrap();

        assert_eq!(ctx.read(MetaKey::SampleRate), Some(8000.0));
        assert_eq!(ctx.read(MetaKey::Duration), Some(2.0));
    }

    #[test]
    fn test_ranks_silence_zero_and_loud_fixed() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.wav");

        // 10s mono at 8kHz: silent except [4, 6)
        let rate = 8000usize;
        let mut samples = vec![0.0f32; rate * 10];
        for (i, sample) in samples[rate * 4..rate * 6].iter_mut().enumerate() {
            *sample = if i % 2 == 0 { 0.5 } else { -0.5 };
        }
        write_wav(&input, 1, rate as u32, &samples);

        let ctx = MediaContext::new();
        let outcome = AudioDenoiser::new()
            .process(&input, &dir.path().join("out.wav"), &ctx)
            .unwrap();

        // default block fraction 0.1 -> one-second blocks -> 10 units
        assert_eq!(outcome.energy.len(), 10);
        let expected_rank = DenoiseConfig::default().rank_value;
        for (second, value) in outcome.energy.iter().enumerate() {
            if (4..6).contains(&second) {
                assert_eq!(*value, expected_rank, "second {}", second);
            } else {
                assert_eq!(*value, 0.0, "second {}", second);
            }
        }
    }

    #[test]
    fn test_sub_second_block_gets_one_unit() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.wav");
        // 0.25s total -> every block is sub-second
        write_wav(&input, 1, 8000, &square(0.4, 2000));

        let ctx = MediaContext::new();
        let outcome = AudioDenoiser::new()
            .process(&input, &dir.path().join("out.wav"), &ctx)
            .unwrap();

        assert!(!outcome.energy.is_empty());
        let rank = DenoiseConfig::default().rank_value;
        assert!(outcome.energy.iter().all(|&v| v == 0.0 || v == rank));
    }
}
