use rayon::prelude::*;

use super::frame::Frame;

/// Opaque confidence grid returned by a text-detection oracle. Consumers only
/// ever ask for dimensions and per-cell confidences, so oracles are free to
/// use whatever internal resolution they like.
#[derive(Debug, Clone)]
pub struct ScoreGrid {
    rows: usize,
    cols: usize,
    scores: Vec<f32>,
}

impl ScoreGrid {
    pub fn new(rows: usize, cols: usize, scores: Vec<f32>) -> Self {
        debug_assert_eq!(rows * cols, scores.len());
        Self { rows, cols, scores }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn confidence_at(&self, row: usize, col: usize) -> f32 {
        self.scores
            .get(row * self.cols + col)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.scores.iter().copied()
    }
}

/// Text-detection oracle over a single frame.
pub trait TextDetector: Send + Sync {
    fn detect(&self, frame: &Frame) -> ScoreGrid;
}

pub struct MockTextDetector {
    // 模拟在特定帧编号有文字
    text_frame_pattern: Option<Box<dyn Fn(u64) -> bool + Send + Sync>>,
    confidence: f32,
}

impl MockTextDetector {
    pub fn new() -> Self {
        Self {
            text_frame_pattern: None,
            confidence: 0.85,
        }
    }

    pub fn with_pattern<F>(pattern: F) -> Self
    where
        F: Fn(u64) -> bool + Send + Sync + 'static,
    {
        Self {
            text_frame_pattern: Some(Box::new(pattern)),
            confidence: 0.85,
        }
    }

    pub fn with_fixed_frames(frames: Vec<u64>) -> Self {
        Self::with_pattern(move |frame_num| frames.contains(&frame_num))
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }
}

impl Default for MockTextDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl TextDetector for MockTextDetector {
    fn detect(&self, frame: &Frame) -> ScoreGrid {
        let has_text = self
            .text_frame_pattern
            .as_ref()
            .map(|p| p(frame.frame_number))
            .unwrap_or(false);

        let value = if has_text { self.confidence } else { 0.0 };
        ScoreGrid::new(4, 4, vec![value; 16])
    }
}

/// 轻量文字检测器（基于边缘密度与纹理特征，无需模型文件）
///
/// Scores each cell of a fixed grid by the fraction of strong gradients plus
/// the local texture, which is high where glyph strokes are and near zero on
/// flat regions.
pub struct EdgeTextDetector {
    grid_rows: usize,
    grid_cols: usize,
    edge_threshold: f32,
}

impl EdgeTextDetector {
    pub fn new() -> Self {
        Self {
            grid_rows: 8,
            grid_cols: 8,
            edge_threshold: 0.08,
        }
    }

    pub fn with_grid(rows: usize, cols: usize) -> Self {
        Self {
            grid_rows: rows.max(1),
            grid_cols: cols.max(1),
            edge_threshold: 0.08,
        }
    }

    fn cell_confidence(
        &self,
        gray: &[u8],
        width: usize,
        height: usize,
        row: usize,
        col: usize,
    ) -> f32 {
        let y_start = height * row / self.grid_rows;
        let y_end = height * (row + 1) / self.grid_rows;
        let x_start = width * col / self.grid_cols;
        let x_end = width * (col + 1) / self.grid_cols;

        let threshold = (self.edge_threshold * 255.0) as i32;
        let threshold_sq = threshold * threshold;
        let mut edge_count = 0u32;
        let mut total = 0u32;
        let mut sum = 0u64;
        let mut sum_sq = 0u64;

        for y in y_start.max(1)..y_end.min(height.saturating_sub(1)) {
            for x in x_start.max(1)..x_end.min(width.saturating_sub(1)) {
                let idx = y * width + x;
                let gx = gray[idx + 1] as i32 - gray[idx - 1] as i32;
                let gy = gray[idx + width] as i32 - gray[idx - width] as i32;
                if gx * gx + gy * gy > threshold_sq {
                    edge_count += 1;
                }
                let v = gray[idx] as u64;
                sum += v;
                sum_sq += v * v;
                total += 1;
            }
        }

        if total == 0 {
            return 0.0;
        }

        let edge_density = edge_count as f32 / total as f32;
        let mean = sum as f64 / total as f64;
        let variance = (sum_sq as f64 / total as f64 - mean * mean).max(0.0);
        let texture = (variance.sqrt() / 255.0) as f32;

        (edge_density + texture).min(1.0)
    }
}

impl Default for EdgeTextDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl TextDetector for EdgeTextDetector {
    fn detect(&self, frame: &Frame) -> ScoreGrid {
        let gray = frame.to_grayscale();
        let width = frame.width as usize;
        let height = frame.height as usize;

        let scores: Vec<f32> = (0..self.grid_rows)
            .into_par_iter()
            .flat_map_iter(|row| {
                let mut row_scores = Vec::with_capacity(self.grid_cols);
                for col in 0..self.grid_cols {
                    row_scores.push(self.cell_confidence(&gray, width, height, row, col));
                }
                row_scores
            })
            .collect();

        ScoreGrid::new(self.grid_rows, self.grid_cols, scores)
    }
}
