//! Notification session
//!
//! A [`NotificationSession`] owns the single slot for a repeating Morse
//! notification. Starting a notification while another one plays first stops
//! the old one and waits for its task to end, so two tone streams never
//! overlap.
//!
//! ```text
//!            start(code)                      stop() / start(other)
//!   Idle ─────────────────────▶ Playing ──────────────────────────▶ Idle
//!                                  │
//!                                  ▼
//!            settle delay ─▶ play code ─▶ repeat pause ─┐
//!                              ▲                        │
//!                              └────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::device::ToneDevice;
use crate::morse::{EncodedSymbol, encode};
use crate::scheduler::{PlayOutcome, PulseScheduler, wait_or_cancel};
use crate::timing::TimingProfile;

/// Wait before the first repetition, keeps clear of the ringtone onset
pub const SETTLE_DELAY: Duration = Duration::from_millis(2000);

/// Pause between two repetitions of the code
pub const REPEAT_PAUSE: Duration = Duration::from_millis(5000);

/// Externally visible session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No notification is playing
    Idle,
    /// A notification task is running
    Playing {
        /// Session identifier used in logs
        session_id: Uuid,
        /// Code being played
        code: String,
    },
}

struct ActiveSession {
    id: Uuid,
    code: String,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ActiveSession {
    async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            if e.is_panic() {
                warn!(session_id = %self.id, "notification task panicked");
            }
        }
        debug!(session_id = %self.id, "notification task ended");
    }
}

/// Process-wide owner of the repeating notification
pub struct NotificationSession {
    scheduler: PulseScheduler,
    slot: Mutex<Option<ActiveSession>>,
    settle_delay: Duration,
    repeat_pause: Duration,
    /// Parent of every session token; cancelled when the session is dropped
    root: CancellationToken,
}

impl NotificationSession {
    /// Create an idle session emitting on `device`
    pub fn new(device: Arc<dyn ToneDevice>) -> Self {
        Self {
            scheduler: PulseScheduler::new(device),
            slot: Mutex::new(None),
            settle_delay: SETTLE_DELAY,
            repeat_pause: REPEAT_PAUSE,
            root: CancellationToken::new(),
        }
    }

    /// Override the settle delay and repeat pause
    pub fn with_pacing(mut self, settle_delay: Duration, repeat_pause: Duration) -> Self {
        self.settle_delay = settle_delay;
        self.repeat_pause = repeat_pause;
        self
    }

    /// Start playing `code` repeatedly, replacing any running notification.
    ///
    /// Returns as soon as the background task is spawned. Returns `None`
    /// without starting anything when the code has no playable symbol.
    pub async fn start(&self, code: &str, profile: TimingProfile) -> Option<Uuid> {
        let symbols = encode(code);

        let mut slot = self.slot.lock().await;
        if let Some(previous) = slot.take() {
            debug!(session_id = %previous.id, "replacing running notification");
            previous.shutdown().await;
        }

        if symbols.is_empty() {
            debug!(code, "code has no playable symbols");
            return None;
        }

        let id = Uuid::new_v4();
        let cancel = self.root.child_token();
        let handle = tokio::spawn(run_notification(
            id,
            self.scheduler.clone(),
            symbols,
            profile,
            self.settle_delay,
            self.repeat_pause,
            cancel.clone(),
        ));

        info!(
            session_id = %id,
            code,
            unit_ms = profile.unit().as_millis() as u64,
            level = profile.level(),
            "notification started"
        );
        *slot = Some(ActiveSession {
            id,
            code: code.to_string(),
            cancel,
            handle,
        });
        Some(id)
    }

    /// Stop the running notification and wait for its task to end.
    ///
    /// Stopping an idle session does nothing. Returns whether a notification
    /// was still playing.
    pub async fn stop(&self) -> bool {
        let mut slot = self.slot.lock().await;
        match slot.take() {
            Some(active) => {
                let running = !active.handle.is_finished();
                if running {
                    info!(session_id = %active.id, "notification stopped");
                }
                active.shutdown().await;
                running
            }
            None => false,
        }
    }

    /// Play `code` once, without settle delay or repetition.
    ///
    /// Any running notification is stopped first. The preview occupies the
    /// session slot while it plays, so `stop` or `start` cancel it, and so
    /// does dropping the returned future.
    pub async fn preview(&self, code: &str, profile: TimingProfile) -> PlayOutcome {
        let symbols = encode(code);
        let (done_tx, done_rx) = oneshot::channel();

        let id = Uuid::new_v4();
        let _cancel_on_drop = {
            let mut slot = self.slot.lock().await;
            if let Some(previous) = slot.take() {
                previous.shutdown().await;
            }

            let cancel = self.root.child_token();
            let token = cancel.clone();
            let scheduler = self.scheduler.clone();
            let handle = tokio::spawn(async move {
                let outcome = scheduler.play(&symbols, &profile, &token).await;
                let _ = done_tx.send(outcome);
            });

            debug!(session_id = %id, code, "preview started");
            let guard = cancel.clone().drop_guard();
            *slot = Some(ActiveSession {
                id,
                code: code.to_string(),
                cancel,
                handle,
            });
            guard
        };

        let outcome = done_rx.await.unwrap_or(PlayOutcome::Cancelled);

        let mut slot = self.slot.lock().await;
        if slot.as_ref().is_some_and(|active| active.id == id) {
            if let Some(active) = slot.take() {
                active.shutdown().await;
            }
        }
        outcome
    }

    /// Current state
    pub async fn state(&self) -> SessionState {
        match self.slot.lock().await.as_ref() {
            Some(active) if !active.handle.is_finished() => SessionState::Playing {
                session_id: active.id,
                code: active.code.clone(),
            },
            _ => SessionState::Idle,
        }
    }

    /// Whether a notification is currently playing
    pub async fn is_playing(&self) -> bool {
        matches!(self.state().await, SessionState::Playing { .. })
    }
}

impl Drop for NotificationSession {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

impl std::fmt::Debug for NotificationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationSession")
            .field("settle_delay", &self.settle_delay)
            .field("repeat_pause", &self.repeat_pause)
            .finish_non_exhaustive()
    }
}

async fn run_notification(
    id: Uuid,
    scheduler: PulseScheduler,
    symbols: Vec<EncodedSymbol>,
    profile: TimingProfile,
    settle_delay: Duration,
    repeat_pause: Duration,
    cancel: CancellationToken,
) {
    if !wait_or_cancel(settle_delay, &cancel).await {
        return;
    }

    let mut repetitions: u64 = 0;
    loop {
        if scheduler.play(&symbols, &profile, &cancel).await == PlayOutcome::Cancelled {
            break;
        }
        repetitions += 1;
        debug!(session_id = %id, repetitions, "notification repetition finished");
        if !wait_or_cancel(repeat_pause, &cancel).await {
            break;
        }
    }
}
