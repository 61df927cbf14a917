//! Tone emission devices
//!
//! A [`ToneDevice`] produces an audible tone at a given level and only returns
//! once the tone has finished. Failures are reported to the caller, which is
//! expected to fall back to a silent wait of the same length.
//!
//! Two memory-backed devices are provided for hosts without audio output and
//! for tests: [`LoggingToneDevice`] and [`RecordingToneDevice`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::{Instant, sleep};
use tracing::trace;

use crate::error::{Error, Result};

/// Device able to emit a tone
#[async_trait]
pub trait ToneDevice: Send + Sync {
    /// Emit a tone at `level` percent for `duration`, returning when it ends
    async fn emit(&self, level: u8, duration: Duration) -> Result<()>;
}

/// Device that only logs each tone and waits for its duration
#[derive(Debug, Default, Clone)]
pub struct LoggingToneDevice;

#[async_trait]
impl ToneDevice for LoggingToneDevice {
    async fn emit(&self, level: u8, duration: Duration) -> Result<()> {
        trace!(level, duration_ms = duration.as_millis() as u64, "tone");
        sleep(duration).await;
        Ok(())
    }
}

/// A tone produced through a [`RecordingToneDevice`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Emission {
    /// Output level in percent
    pub level: u8,
    /// Tone length
    pub duration: Duration,
    /// When the tone started
    pub started_at: Instant,
}

/// Memory-backed device that records every emission
///
/// Clones share the same recording, so a test can keep one handle while the
/// engine owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingToneDevice {
    emissions: Arc<Mutex<Vec<Emission>>>,
    failing: Arc<AtomicBool>,
    failed_attempts: Arc<Mutex<usize>>,
}

impl RecordingToneDevice {
    /// Create a working recording device
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent emissions fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All successful emissions so far
    pub fn emissions(&self) -> Vec<Emission> {
        self.emissions.lock().clone()
    }

    /// Number of successful emissions so far
    pub fn emission_count(&self) -> usize {
        self.emissions.lock().len()
    }

    /// Number of emissions rejected while failing
    pub fn failed_attempts(&self) -> usize {
        *self.failed_attempts.lock()
    }
}

#[async_trait]
impl ToneDevice for RecordingToneDevice {
    async fn emit(&self, level: u8, duration: Duration) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            *self.failed_attempts.lock() += 1;
            return Err(Error::tone_device("recording device set to fail"));
        }

        self.emissions.lock().push(Emission {
            level,
            duration,
            started_at: Instant::now(),
        });
        sleep(duration).await;
        Ok(())
    }
}
