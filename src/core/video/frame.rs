use std::time::Duration;

/// 帧数据结构
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGBA 格式
    pub timestamp: Duration,
    pub frame_number: u64,
}

impl Frame {
    pub fn new(
        width: u32,
        height: u32,
        data: Vec<u8>,
        timestamp_ms: u64,
        frame_number: u64,
    ) -> Self {
        Self {
            width,
            height,
            data,
            timestamp: Duration::from_millis(timestamp_ms),
            frame_number,
        }
    }

    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Luma plane of the frame, one byte per pixel.
    pub fn to_grayscale(&self) -> Vec<u8> {
        self.data
            .chunks_exact(4)
            .map(|rgba| {
                let r = rgba[0] as u32;
                let g = rgba[1] as u32;
                let b = rgba[2] as u32;
                ((r * 299 + g * 587 + b * 114) / 1000) as u8
            })
            .collect()
    }

    pub fn resize_to(&self, target_width: u32, target_height: u32) -> Frame {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .expect("Invalid frame data");
        let resized = image::imageops::resize(
            &img,
            target_width,
            target_height,
            image::imageops::FilterType::Triangle,
        );

        Frame {
            width: target_width,
            height: target_height,
            data: resized.into_raw(),
            timestamp: self.timestamp,
            frame_number: self.frame_number,
        }
    }

    /// Resize to `target_width` keeping the aspect ratio. Frames already at
    /// the target width are returned as-is.
    pub fn resize_to_width(&self, target_width: u32) -> Frame {
        if self.width == target_width || self.width == 0 {
            return self.clone();
        }
        let scale = target_width as f64 / self.width as f64;
        let target_height = ((self.height as f64 * scale).round() as u32).max(1);
        self.resize_to(target_width, target_height)
    }
}
