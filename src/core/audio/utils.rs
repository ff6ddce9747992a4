use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use hound::{SampleFormat, WavSpec};
use log::debug;

use super::error::AudioError;

/// Sequential block reader over a WAV file. Samples come out interleaved as
/// `f32` regardless of the on-disk format (16-bit integer or 32-bit float).
pub struct WavBlockReader {
    reader: hound::WavReader<BufReader<File>>,
    spec: WavSpec,
}

impl WavBlockReader {
    pub fn open(path: &Path) -> Result<Self, AudioError> {
        let reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 16) | (SampleFormat::Float, 32) => {}
            (_, bits) => return Err(AudioError::UnsupportedFormat(bits)),
        }
        debug!(
            "opened {:?}: {} Hz, {} channels, {} bits",
            path, spec.sample_rate, spec.channels, spec.bits_per_sample
        );
        Ok(Self { reader, spec })
    }

    pub fn spec(&self) -> WavSpec {
        self.spec
    }

    /// Total frames (samples per channel) in the file.
    pub fn total_frames(&self) -> u64 {
        self.reader.duration() as u64
    }

    /// Read up to `frames` interleaved frames. An empty result means end of
    /// stream; a short result is the final partial block.
    pub fn next_block(&mut self, frames: usize) -> Result<Vec<f32>, AudioError> {
        let wanted = frames * self.spec.channels as usize;
        let mut block = Vec::with_capacity(wanted);

        match self.spec.sample_format {
            SampleFormat::Float => {
                for sample in self.reader.samples::<f32>().take(wanted) {
                    block.push(sample?);
                }
            }
            SampleFormat::Int => {
                for sample in self.reader.samples::<i16>().take(wanted) {
                    block.push(sample? as f32 / i16::MAX as f32);
                }
            }
        }

        Ok(block)
    }
}

/// Writer counterpart of [`WavBlockReader`]; carries the input spec so the
/// output file mirrors the source format.
pub struct WavBlockWriter {
    writer: hound::WavWriter<BufWriter<File>>,
    spec: WavSpec,
}

impl WavBlockWriter {
    pub fn create(path: &Path, spec: WavSpec) -> Result<Self, AudioError> {
        let writer = hound::WavWriter::create(path, spec)?;
        Ok(Self { writer, spec })
    }

    pub fn write_block(&mut self, samples: &[f32]) -> Result<(), AudioError> {
        match self.spec.sample_format {
            SampleFormat::Float => {
                for &sample in samples {
                    self.writer.write_sample(sample)?;
                }
            }
            SampleFormat::Int => {
                for &sample in samples {
                    let scaled = (sample * i16::MAX as f32).round();
                    self.writer
                        .write_sample(scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i16)?;
                }
            }
        }
        Ok(())
    }

    pub fn finalize(self) -> Result<(), AudioError> {
        self.writer.finalize()?;
        Ok(())
    }
}

/// Root-mean-square energy of an interleaved sample block.
pub fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| s as f64 * s as f64).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn int_spec(channels: u16) -> WavSpec {
        WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    }

    #[test]
    fn test_rms() {
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(rms(&[0.0, 0.0]), 0.0);
        let energy = rms(&[0.5, -0.5, 0.5, -0.5]);
        assert!((energy - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_block_roundtrip_preserves_counts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tone.wav");

        let mut writer = WavBlockWriter::create(&path, int_spec(2)).unwrap();
        let samples: Vec<f32> = (0..2000).map(|i| ((i % 7) as f32 - 3.0) / 8.0).collect();
        writer.write_block(&samples).unwrap();
        writer.finalize().unwrap();

        let mut reader = WavBlockReader::open(&path).unwrap();
        assert_eq!(reader.total_frames(), 1000);

        let mut read_back = 0usize;
        loop {
            let block = reader.next_block(300).unwrap();
            if block.is_empty() {
                break;
            }
            read_back += block.len();
        }
        assert_eq!(read_back, 2000);
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(WavBlockReader::open(&dir.path().join("absent.wav")).is_err());
    }
}
