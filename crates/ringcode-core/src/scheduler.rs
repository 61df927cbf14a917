//! Pulse scheduler
//!
//! Turns encoded symbols into timed tone/silence intervals on a
//! [`ToneDevice`]. Every tone and every silence is raced against a
//! [`CancellationToken`], so playback stops as soon as the token fires.
//!
//! When the device fails to emit a pulse the scheduler waits out the rest of
//! the pulse in silence, keeping the rhythm of the pattern intact.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use crate::device::ToneDevice;
use crate::morse::{EncodedSymbol, Pulse};
use crate::timing::TimingProfile;

/// How a playback ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Every pulse and gap was played
    Completed,
    /// The cancellation token fired first
    Cancelled,
}

/// Wait for `duration` unless the token fires first.
///
/// Returns `false` when cancelled.
pub async fn wait_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = sleep(duration) => true,
    }
}

/// Drives a tone device through Morse patterns
#[derive(Clone)]
pub struct PulseScheduler {
    device: Arc<dyn ToneDevice>,
}

impl PulseScheduler {
    /// Create a scheduler emitting on `device`
    pub fn new(device: Arc<dyn ToneDevice>) -> Self {
        Self { device }
    }

    /// Play every symbol once.
    ///
    /// Blocks (asynchronously) for the real length of the message.
    pub async fn play(
        &self,
        symbols: &[EncodedSymbol],
        profile: &TimingProfile,
        cancel: &CancellationToken,
    ) -> PlayOutcome {
        for symbol in symbols {
            trace!(character = %symbol.character, pattern = %symbol.pattern, "playing symbol");
            for pulse in symbol.pattern.pulses() {
                if !self.pulse(pulse, profile, cancel).await {
                    return PlayOutcome::Cancelled;
                }
                if !wait_or_cancel(profile.gap_after(pulse), cancel).await {
                    return PlayOutcome::Cancelled;
                }
            }
            if !wait_or_cancel(profile.char_gap(), cancel).await {
                return PlayOutcome::Cancelled;
            }
        }
        PlayOutcome::Completed
    }

    /// Emit one pulse, falling back to silence if the device fails
    async fn pulse(
        &self,
        pulse: Pulse,
        profile: &TimingProfile,
        cancel: &CancellationToken,
    ) -> bool {
        if cancel.is_cancelled() {
            return false;
        }

        let duration = profile.pulse_duration(pulse);
        let started = Instant::now();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return false,
            result = self.device.emit(profile.level(), duration) => result,
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "tone emission failed, keeping rhythm with silence");
                let remaining = duration.saturating_sub(started.elapsed());
                wait_or_cancel(remaining, cancel).await
            }
        }
    }
}

impl std::fmt::Debug for PulseScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PulseScheduler").finish_non_exhaustive()
    }
}
