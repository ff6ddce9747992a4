//! Deterministic in-memory streams for exercising the ingestion and ranking
//! stages without a real decoder.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::error::VideoError;
use super::frame::Frame;
use super::source::{VideoSource, VideoStream};

pub type Painter = Arc<dyn Fn(u64, u32, u32) -> Vec<u8> + Send + Sync>;

pub fn uniform_rgba(width: u32, height: u32, value: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..(width * height) {
        data.extend_from_slice(&[value, value, value, 255]);
    }
    data
}

/// Frame supplier that plays a scripted sequence: a fixed frame count (or
/// endless), an optional per-frame painter, and a release counter so tests
/// can assert exactly-once cleanup.
pub struct ScriptedStream {
    next: u64,
    count: Option<u64>,
    width: u32,
    height: u32,
    fps: f64,
    painter: Option<Painter>,
    grab_delay: Option<Duration>,
    released: Arc<AtomicUsize>,
}

impl ScriptedStream {
    pub fn new(count: u64, width: u32, height: u32, fps: f64) -> Self {
        Self {
            next: 0,
            count: Some(count),
            width,
            height,
            fps,
            painter: None,
            grab_delay: None,
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn endless(width: u32, height: u32, fps: f64) -> Self {
        Self {
            count: None,
            ..Self::new(0, width, height, fps)
        }
    }

    pub fn with_painter(mut self, painter: Painter) -> Self {
        self.painter = Some(painter);
        self
    }

    /// Simulate slow decode I/O.
    pub fn with_grab_delay(mut self, delay: Duration) -> Self {
        self.grab_delay = Some(delay);
        self
    }

    pub fn release_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.released)
    }
}

impl VideoStream for ScriptedStream {
    fn grab(&mut self) -> Option<Frame> {
        if let Some(count) = self.count {
            if self.next >= count {
                return None;
            }
        }
        if let Some(delay) = self.grab_delay {
            std::thread::sleep(delay);
        }

        let number = self.next;
        self.next += 1;
        let data = match &self.painter {
            Some(painter) => painter(number, self.width, self.height),
            None => uniform_rgba(self.width, self.height, 128),
        };
        let timestamp_ms = if self.fps > 0.0 {
            (number as f64 / self.fps * 1000.0) as u64
        } else {
            0
        };
        Some(Frame::new(self.width, self.height, data, timestamp_ms, number))
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn frame_count(&self) -> u64 {
        self.count.unwrap_or(0)
    }

    fn release(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// [`VideoSource`] that opens a fresh [`ScriptedStream`] per ranking pass.
pub struct ScriptedSource {
    pub count: u64,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub painter: Option<Painter>,
}

impl VideoSource for ScriptedSource {
    fn open_stream(&self) -> Result<Box<dyn VideoStream>, VideoError> {
        let mut stream = ScriptedStream::new(self.count, self.width, self.height, self.fps);
        if let Some(painter) = &self.painter {
            stream = stream.with_painter(Arc::clone(painter));
        }
        Ok(Box::new(stream))
    }
}
