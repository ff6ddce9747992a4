//! End-to-end orchestration for one media item: denoise-and-rank the audio
//! track, run the visual and textual ranking passes (each over its own frame
//! stream), normalize everything onto the per-second timeline, persist the
//! rank artifacts and fuse them into trim timestamps.

use std::path::{Path, PathBuf};

use log::info;

use crate::context::{MediaContext, MetaKey};
use crate::core::audio::denoiser::{AudioDenoiser, DenoiseConfig};
use crate::core::video::detector::TextDetector;
use crate::core::video::source::{FrameSource, SourceConfig, VideoSource};

use super::fusion::{fuse, FusionConfig, FusionReport};
use super::normalize::normalize;
use super::store::RankStore;
use super::text::{TextRankConfig, TextRanker};
use super::visual::{VisualRankConfig, VisualRanker};
use super::{Modality, PipelineError, RankSequence, RankUnit};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub source: SourceConfig,
    pub denoise: DenoiseConfig,
    pub text: TextRankConfig,
    pub visual: VisualRankConfig,
    pub fusion: FusionConfig,
    /// Directory the per-modality rank artifacts are written into.
    pub rank_dir: PathBuf,
}

impl PipelineConfig {
    pub fn new(rank_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: SourceConfig::default(),
            denoise: DenoiseConfig::default(),
            text: TextRankConfig::default(),
            visual: VisualRankConfig::default(),
            fusion: FusionConfig::default(),
            rank_dir: rank_dir.into(),
        }
    }
}

pub struct TrimPipeline {
    config: PipelineConfig,
}

impl TrimPipeline {
    pub fn new(rank_dir: impl Into<PathBuf>) -> Self {
        Self::with_config(PipelineConfig::new(rank_dir))
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the full analysis. Audio is processed synchronously on this
    /// thread; each visual pass owns one background producer, stopped on
    /// every exit path before the next stage starts.
    pub fn run(
        &self,
        audio_in: &Path,
        audio_out: &Path,
        video: &dyn VideoSource,
        detector: &dyn TextDetector,
    ) -> Result<FusionReport, PipelineError> {
        let ctx = MediaContext::new();
        let store = RankStore::new(&self.config.rank_dir);

        info!("starting audio stage for {:?}", audio_in);
        let denoiser = AudioDenoiser::with_config(self.config.denoise.clone());
        let outcome = denoiser.process(audio_in, audio_out, &ctx)?;
        let audio_seq = RankSequence::new(Modality::Audio, RankUnit::Second, outcome.energy);

        info!("starting visual stage");
        let mut source = FrameSource::start(video.open_stream()?, self.config.source.clone());
        let visual_ranker = VisualRanker::with_config(self.config.visual.clone());
        let visual = visual_ranker.process(&source, &ctx);
        source.stop();

        info!("starting textual stage");
        let mut source = FrameSource::start(video.open_stream()?, self.config.source.clone());
        let text_ranker = TextRanker::with_config(self.config.text.clone());
        let text_seq = text_ranker.process(&source, detector, &ctx);
        source.stop();

        let fps = ctx.read(MetaKey::Fps).unwrap_or(0.0);
        let total_frames = ctx.read(MetaKey::FrameCount).unwrap_or(0.0) as u64;

        let normalized = [
            normalize(&visual.motion, fps, total_frames),
            normalize(&visual.blur, fps, total_frames),
            normalize(&text_seq, fps, total_frames),
            normalize(&audio_seq, fps, total_frames),
        ];
        for seq in &normalized {
            store.save(seq.modality, &seq.values)?;
        }

        let report = fuse(&normalized, &ctx, &self.config.fusion)?;
        Ok(report)
    }
}
