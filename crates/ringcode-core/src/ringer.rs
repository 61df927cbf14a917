//! Device ringer mode

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Audible output mode of the device ringer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RingerMode {
    /// Ringtone is audible; Morse notifications are not played
    Normal,
    /// Ringer silenced, vibration only
    Vibrate,
    /// Ringer fully silenced
    Silent,
}

impl RingerMode {
    /// Whether the regular ringtone is audible
    pub fn is_audible(self) -> bool {
        self == Self::Normal
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Vibrate => 1,
            Self::Silent => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Normal,
            1 => Self::Vibrate,
            _ => Self::Silent,
        }
    }
}

impl fmt::Display for RingerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Vibrate => write!(f, "vibrate"),
            Self::Silent => write!(f, "silent"),
        }
    }
}

impl FromStr for RingerMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "vibrate" => Ok(Self::Vibrate),
            "silent" => Ok(Self::Silent),
            other => Err(Error::config(format!("unknown ringer mode '{other}'"))),
        }
    }
}

/// Query for the ringer mode at the moment a call rings
pub trait RingerModeSource: Send + Sync {
    fn ringer_mode(&self) -> RingerMode;
}

impl RingerModeSource for RingerMode {
    fn ringer_mode(&self) -> RingerMode {
        *self
    }
}

/// Ringer mode settable by the host
#[derive(Debug, Clone)]
pub struct SharedRingerMode {
    mode: Arc<AtomicU8>,
}

impl SharedRingerMode {
    pub fn new(mode: RingerMode) -> Self {
        Self {
            mode: Arc::new(AtomicU8::new(mode.as_u8())),
        }
    }

    pub fn set(&self, mode: RingerMode) {
        self.mode.store(mode.as_u8(), Ordering::SeqCst);
    }
}

impl RingerModeSource for SharedRingerMode {
    fn ringer_mode(&self) -> RingerMode {
        RingerMode::from_u8(self.mode.load(Ordering::SeqCst))
    }
}
