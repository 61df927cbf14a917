//! # Ringcode - Morse Code Caller Notification
//!
//! This crate announces incoming calls with a per-caller Morse code pattern
//! while the device ringer is silenced. It provides:
//! - **morse / timing**: the code table and the fixed pulse/gap ratios
//! - **scheduler**: cancellable timed playback on a tone device
//! - **number / lookup**: caller identifier normalization and assignment matching
//! - **session**: the single repeating notification task
//! - **reactor**: the call state machine tying it all together
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ringcode_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let registry = MemoryRegistry::from_records([
//!         AssignmentRecord::new("+15551234567", "SOS").with_name("Bob"),
//!     ]);
//!     let config = NotifierConfig { enabled: true, ..NotifierConfig::default() };
//!
//!     let reactor = CallStateReactor::builder()
//!         .with_registry(Arc::new(registry))
//!         .with_config(Arc::new(config))
//!         .with_ringer(Arc::new(RingerMode::Silent))
//!         .build()?;
//!
//!     // Bob calls: "... --- ..." repeats until the call is answered
//!     reactor.handle_event(CallEvent::ringing("5551234567")).await;
//!     tokio::time::sleep(std::time::Duration::from_secs(10)).await;
//!     reactor.handle_event(CallEvent::off_hook()).await;
//!
//!     reactor.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Failure handling
//!
//! The engine never reports an error for a call. A missing assignment, an
//! unreadable registry or disabled notifications all mean "stay silent"; a
//! failing tone device is replaced by silence of the same length so the
//! rhythm of the pattern is preserved.

pub mod config;
pub mod device;
pub mod error;
pub mod events;
pub mod lookup;
pub mod morse;
pub mod number;
pub mod reactor;
pub mod registry;
pub mod ringer;
pub mod scheduler;
pub mod session;
pub mod timing;

// Re-export main types
pub use config::{ConfigStore, NotifierConfig, SharedConfig};
pub use device::{Emission, LoggingToneDevice, RecordingToneDevice, ToneDevice};
pub use error::{Error, Result};
pub use events::{CallEvent, CallState};
pub use lookup::AssignmentLookup;
pub use morse::{ALERT_SYMBOL, EncodedSymbol, Pulse, PulsePattern, encode};
pub use number::{normalize, same_target};
pub use reactor::{CallStateReactor, CallStateReactorBuilder, IgnoreReason, ReactorOutcome};
pub use registry::{AssignmentRecord, AssignmentRegistry, MemoryRegistry};
pub use ringer::{RingerMode, RingerModeSource, SharedRingerMode};
pub use scheduler::{PlayOutcome, PulseScheduler};
pub use session::{NotificationSession, SessionState};
pub use timing::TimingProfile;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export of common types and functions
pub mod prelude {
    pub use super::{
        AssignmentRecord, AssignmentRegistry, CallEvent, CallState, CallStateReactor,
        ConfigStore, Error, MemoryRegistry, NotificationSession, NotifierConfig,
        ReactorOutcome, Result, RingerMode, RingerModeSource, SharedConfig,
        SharedRingerMode, TimingProfile, ToneDevice,
    };
}
