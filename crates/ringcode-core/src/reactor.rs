//! Call state reactor
//!
//! Top-level state machine of the engine. Each call lifecycle event is gated
//! and dispatched in arrival order:
//!
//! ```text
//!   RINGING ──▶ ringer audible? ──yes──▶ ignore
//!                   │ no
//!                   ▼
//!               enabled? ──no──▶ ignore
//!                   │ yes
//!                   ▼
//!               assignment for caller? ──no──▶ ignore
//!                   │ yes
//!                   ▼
//!               start notification
//!
//!   anything else ──▶ stop notification
//! ```
//!
//! The reactor never fails. Every miss or error resolves to silence and is
//! only visible in the returned [`ReactorOutcome`] and in the logs.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{ConfigStore, NotifierConfig};
use crate::device::{LoggingToneDevice, ToneDevice};
use crate::error::{Error, Result};
use crate::events::{CallEvent, CallState};
use crate::lookup::AssignmentLookup;
use crate::morse::ALERT_SYMBOL;
use crate::registry::AssignmentRegistry;
use crate::ringer::{RingerMode, RingerModeSource};
use crate::scheduler::PlayOutcome;
use crate::session::{NotificationSession, REPEAT_PAUSE, SETTLE_DELAY, SessionState};

/// Why an event required no action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The ringtone is audible
    RingerAudible,
    /// Morse notifications are disabled
    Disabled,
    /// The event carried no caller identifier
    NoCaller,
    /// No active assignment matches the caller
    NoAssignment,
    /// The assigned code contains no playable symbol
    NothingToPlay,
    /// A call ended or was answered while nothing was playing
    NotPlaying,
}

/// What the reactor did with an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactorOutcome {
    /// A notification was started
    Started { session_id: Uuid, code: String },
    /// A running notification was stopped
    Stopped,
    /// The event required no action
    Ignored(IgnoreReason),
}

/// Reacts to call lifecycle events by starting and stopping notifications
pub struct CallStateReactor {
    config: Arc<dyn ConfigStore>,
    ringer: Arc<dyn RingerModeSource>,
    lookup: AssignmentLookup,
    session: NotificationSession,
}

impl CallStateReactor {
    /// Create a reactor from its collaborators
    pub fn new(
        config: Arc<dyn ConfigStore>,
        ringer: Arc<dyn RingerModeSource>,
        registry: Arc<dyn AssignmentRegistry>,
        session: NotificationSession,
    ) -> Self {
        Self {
            config,
            ringer,
            lookup: AssignmentLookup::new(registry),
            session,
        }
    }

    /// Start building a reactor
    pub fn builder() -> CallStateReactorBuilder {
        CallStateReactorBuilder::new()
    }

    /// Handle one call lifecycle event
    pub async fn handle_event(&self, event: CallEvent) -> ReactorOutcome {
        debug!(state = %event.state, caller = ?event.caller, "call event");
        match event.state {
            CallState::Ringing => self.on_ringing(event.caller.as_deref()).await,
            _ => {
                if self.session.stop().await {
                    ReactorOutcome::Stopped
                } else {
                    ReactorOutcome::Ignored(IgnoreReason::NotPlaying)
                }
            }
        }
    }

    async fn on_ringing(&self, caller: Option<&str>) -> ReactorOutcome {
        let mode = self.ringer.ringer_mode();
        if mode.is_audible() {
            debug!(%mode, "ringer audible, no notification");
            return ReactorOutcome::Ignored(IgnoreReason::RingerAudible);
        }

        let config = self.config.snapshot();
        if !config.enabled {
            debug!("morse notifications disabled");
            return ReactorOutcome::Ignored(IgnoreReason::Disabled);
        }

        let Some(caller) = caller else {
            debug!("ringing without caller identifier");
            return ReactorOutcome::Ignored(IgnoreReason::NoCaller);
        };

        let Some(record) = self.lookup.resolve_record(caller).await else {
            return ReactorOutcome::Ignored(IgnoreReason::NoAssignment);
        };

        match self.session.start(&record.code, config.timing_profile()).await {
            Some(session_id) => {
                info!(
                    %session_id,
                    caller,
                    name = record.name.as_deref().unwrap_or(""),
                    code = %record.code,
                    "announcing caller"
                );
                ReactorOutcome::Started {
                    session_id,
                    code: record.code,
                }
            }
            None => ReactorOutcome::Ignored(IgnoreReason::NothingToPlay),
        }
    }

    /// Play the alert symbol once with the current settings
    pub async fn preview_alert(&self) -> PlayOutcome {
        let config = self.config.snapshot();
        self.session
            .preview(&ALERT_SYMBOL.to_string(), config.timing_profile())
            .await
    }

    /// State of the notification session
    pub async fn session_state(&self) -> SessionState {
        self.session.state().await
    }

    /// Consume events in arrival order until the sender side closes, then
    /// shut down
    pub async fn run(&self, mut events: mpsc::Receiver<CallEvent>) {
        info!("call state reactor running");
        while let Some(event) = events.recv().await {
            let outcome = self.handle_event(event).await;
            debug!(?outcome, "event handled");
        }
        self.shutdown().await;
    }

    /// Stop any running notification and wait for its task to end
    pub async fn shutdown(&self) {
        if self.session.stop().await {
            info!("notification stopped on shutdown");
        }
        info!("call state reactor stopped");
    }
}

impl std::fmt::Debug for CallStateReactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallStateReactor")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Builder for [`CallStateReactor`]
///
/// Only the registry is mandatory. Defaults: configuration
/// [`NotifierConfig::default`], ringer [`RingerMode::Normal`], a
/// [`LoggingToneDevice`], and the standard settle delay and repeat pause.
pub struct CallStateReactorBuilder {
    config: Option<Arc<dyn ConfigStore>>,
    ringer: Option<Arc<dyn RingerModeSource>>,
    registry: Option<Arc<dyn AssignmentRegistry>>,
    device: Option<Arc<dyn ToneDevice>>,
    settle_delay: Duration,
    repeat_pause: Duration,
}

impl CallStateReactorBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: None,
            ringer: None,
            registry: None,
            device: None,
            settle_delay: SETTLE_DELAY,
            repeat_pause: REPEAT_PAUSE,
        }
    }

    /// Set the configuration store
    pub fn with_config(mut self, config: Arc<dyn ConfigStore>) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the ringer mode source
    pub fn with_ringer(mut self, ringer: Arc<dyn RingerModeSource>) -> Self {
        self.ringer = Some(ringer);
        self
    }

    /// Set the assignment registry
    pub fn with_registry(mut self, registry: Arc<dyn AssignmentRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the tone device
    pub fn with_device(mut self, device: Arc<dyn ToneDevice>) -> Self {
        self.device = Some(device);
        self
    }

    /// Override the settle delay and repeat pause of notifications
    pub fn with_pacing(mut self, settle_delay: Duration, repeat_pause: Duration) -> Self {
        self.settle_delay = settle_delay;
        self.repeat_pause = repeat_pause;
        self
    }

    /// Build the reactor
    pub fn build(self) -> Result<CallStateReactor> {
        let registry = self
            .registry
            .ok_or_else(|| Error::config("Assignment registry not provided"))?;
        let config = self.config.unwrap_or_else(|| Arc::new(NotifierConfig::default()));
        let ringer = self.ringer.unwrap_or_else(|| Arc::new(RingerMode::Normal));
        let device = self.device.unwrap_or_else(|| Arc::new(LoggingToneDevice));

        let session = NotificationSession::new(device)
            .with_pacing(self.settle_delay, self.repeat_pause);
        Ok(CallStateReactor::new(config, ringer, registry, session))
    }
}

impl Default for CallStateReactorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
