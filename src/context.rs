//! Shared media metadata, published once by the stage that discovers it and
//! read later by fusion/analytics. Passed explicitly to each stage instead of
//! living in a process-wide singleton.

use std::collections::HashMap;
use std::sync::Mutex;

use log::warn;

/// Well-known metadata keys. Each is written by exactly one producing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKey {
    /// Audio sample rate in Hz, published by the audio stage.
    SampleRate,
    /// Media duration in seconds, published by the audio stage.
    Duration,
    /// Video frame rate, published by the first video pass.
    Fps,
    /// Total video frame count, published by the first video pass.
    FrameCount,
}

/// Write-once-then-read-many key/value store for cross-stage metadata.
pub struct MediaContext {
    values: Mutex<HashMap<MetaKey, f64>>,
}

impl MediaContext {
    pub fn new() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
        }
    }

    /// Publish a value for `key`. The first write wins; a later write to the
    /// same key is ignored so published metadata stays immutable.
    pub fn publish(&self, key: MetaKey, value: f64) {
        let mut values = match self.values.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(existing) = values.get(&key) {
            if (existing - value).abs() > f64::EPSILON {
                warn!(
                    "ignoring rewrite of {:?} to {}: already published as {}",
                    key, value, existing
                );
            }
            return;
        }
        values.insert(key, value);
    }

    pub fn read(&self, key: MetaKey) -> Option<f64> {
        let values = match self.values.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        values.get(&key).copied()
    }
}

impl Default for MediaContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_read() {
        let ctx = MediaContext::new();
        ctx.publish(MetaKey::Fps, 30.0);
        assert_eq!(ctx.read(MetaKey::Fps), Some(30.0));
        assert_eq!(ctx.read(MetaKey::SampleRate), None);
    }

    #[test]
    fn test_first_write_wins() {
        let ctx = MediaContext::new();
        ctx.publish(MetaKey::FrameCount, 300.0);
        ctx.publish(MetaKey::FrameCount, 999.0);
        assert_eq!(ctx.read(MetaKey::FrameCount), Some(300.0));
    }

    #[test]
    fn test_shared_across_threads() {
        use std::sync::Arc;

        let ctx = Arc::new(MediaContext::new());
        let writer = Arc::clone(&ctx);
        let handle = std::thread::spawn(move || {
            writer.publish(MetaKey::SampleRate, 44100.0);
        });
        handle.join().unwrap();
        assert_eq!(ctx.read(MetaKey::SampleRate), Some(44100.0));
    }
}
