//! Threaded frame ingestion. A single producer thread pulls sequential
//! frames from a [`VideoStream`] into a bounded queue so slow decode I/O
//! never paces the analysis side, and a full queue never drops a frame.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::debug;

use super::error::VideoError;
use super::frame::Frame;

/// Sequential frame supplier, typically backed by a container decoder.
/// `grab` returning `None` signals end of stream.
pub trait VideoStream: Send {
    fn grab(&mut self) -> Option<Frame>;
    fn fps(&self) -> f64;
    fn frame_count(&self) -> u64;
    /// Release the underlying handle. Invoked exactly once, from the
    /// producer thread, after the last grab.
    fn release(&mut self) {}
}

/// Factory for [`VideoStream`]s. Rankers that must each see every frame open
/// their own stream; consumers sharing one [`FrameSource`] compete for
/// frames instead.
pub trait VideoSource {
    fn open_stream(&self) -> Result<Box<dyn VideoStream>, VideoError>;
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Bounded queue capacity; the producer blocks when it is reached.
    pub capacity: usize,
    /// Frames are resized to this width (aspect preserved) before queueing.
    pub target_width: u32,
    /// How long a `read` waits on an empty queue before reporting "no frame".
    pub read_timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            target_width: 480,
            read_timeout: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SourceStats {
    pub produced: u64,
    pub delivered: u64,
}

/// Owned handle over the producer thread and its queue. The caller is
/// responsible for `stop()` on every exit path; drop stops and joins as a
/// backstop.
pub struct FrameSource {
    receiver: Mutex<Receiver<Frame>>,
    stopped: Arc<AtomicBool>,
    produced: Arc<AtomicU64>,
    delivered: AtomicU64,
    handle: Option<JoinHandle<()>>,
    fps: f64,
    frame_count: u64,
    read_timeout: Duration,
}

impl FrameSource {
    /// Capture the stream's metadata and spawn the producer thread.
    pub fn start(stream: Box<dyn VideoStream>, config: SourceConfig) -> Self {
        let fps = stream.fps();
        let frame_count = stream.frame_count();
        let (sender, receiver) = mpsc::sync_channel(config.capacity);
        let stopped = Arc::new(AtomicBool::new(false));
        let produced = Arc::new(AtomicU64::new(0));

        let handle = {
            let stopped = Arc::clone(&stopped);
            let produced = Arc::clone(&produced);
            let target_width = config.target_width;
            thread::spawn(move || {
                producer_loop(stream, sender, stopped, produced, target_width);
            })
        };

        Self {
            receiver: Mutex::new(receiver),
            stopped,
            produced,
            delivered: AtomicU64::new(0),
            handle: Some(handle),
            fps,
            frame_count,
            read_timeout: config.read_timeout,
        }
    }

    /// Pop the next frame in stream order. `None` means either a read
    /// timeout (queue empty, producer possibly stalled) or a finished,
    /// drained source; check [`FrameSource::stopped`] to tell them apart.
    pub fn read(&self) -> Option<Frame> {
        let receiver = match self.receiver.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match receiver.recv_timeout(self.read_timeout) {
            Ok(frame) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                Some(frame)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Whether the producer has finished or been asked to finish. Frames
    /// already queued remain readable.
    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Request a cooperative stop and wait for the producer to exit.
    /// Idempotent; the underlying stream is released exactly once no matter
    /// who initiates the stop.
    pub fn stop(&mut self) {
        self.stopped.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn stats(&self) -> SourceStats {
        SourceStats {
            produced: self.produced.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
        }
    }
}

impl Drop for FrameSource {
    fn drop(&mut self) {
        self.stop();
    }
}

fn producer_loop(
    mut stream: Box<dyn VideoStream>,
    sender: SyncSender<Frame>,
    stopped: Arc<AtomicBool>,
    produced: Arc<AtomicU64>,
    target_width: u32,
) {
    'producing: loop {
        if stopped.load(Ordering::Acquire) {
            break;
        }

        let frame = match stream.grab() {
            Some(frame) => frame,
            None => break, // end of stream
        };

        let mut pending = frame.resize_to_width(target_width);
        // bounded send: hold the frame under backpressure, but keep
        // observing the stop flag so a full queue cannot wedge shutdown
        loop {
            match sender.try_send(pending) {
                Ok(()) => {
                    produced.fetch_add(1, Ordering::Relaxed);
                    break;
                }
                Err(TrySendError::Full(frame)) => {
                    if stopped.load(Ordering::Acquire) {
                        break 'producing;
                    }
                    pending = frame;
                    thread::sleep(Duration::from_millis(2));
                }
                Err(TrySendError::Disconnected(_)) => break 'producing,
            }
        }
    }

    stopped.store(true, Ordering::Release);
    stream.release();
    debug!("frame producer exited after {} frames", produced.load(Ordering::Relaxed));
}
