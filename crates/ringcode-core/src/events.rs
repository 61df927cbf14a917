//! Call lifecycle events delivered by the telephony stack

use std::fmt;

use serde::{Deserialize, Serialize};

/// Call state carried by a lifecycle event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallState {
    /// An incoming call is ringing
    Ringing,
    /// A call is active (answered or dialing)
    OffHook,
    /// No call
    Idle,
    /// Any other state tag reported by the host
    Other(String),
}

impl CallState {
    /// Interpret a host state tag (case-insensitive)
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        match tag.to_ascii_uppercase().as_str() {
            "RINGING" => Self::Ringing,
            "OFFHOOK" | "OFF_HOOK" => Self::OffHook,
            "IDLE" => Self::Idle,
            _ => Self::Other(tag.to_string()),
        }
    }

    pub fn is_ringing(&self) -> bool {
        matches!(self, Self::Ringing)
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ringing => write!(f, "RINGING"),
            Self::OffHook => write!(f, "OFFHOOK"),
            Self::Idle => write!(f, "IDLE"),
            Self::Other(tag) => write!(f, "{tag}"),
        }
    }
}

/// A call lifecycle event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEvent {
    /// New call state
    pub state: CallState,
    /// Caller identifier as delivered by the host, if any
    pub caller: Option<String>,
}

impl CallEvent {
    /// Event from a raw state tag and caller identifier
    pub fn new(tag: &str, caller: Option<&str>) -> Self {
        Self {
            state: CallState::from_tag(tag),
            caller: caller.map(str::to_string),
        }
    }

    /// Incoming call from `caller`
    pub fn ringing(caller: impl Into<String>) -> Self {
        Self {
            state: CallState::Ringing,
            caller: Some(caller.into()),
        }
    }

    /// Call answered
    pub fn off_hook() -> Self {
        Self {
            state: CallState::OffHook,
            caller: None,
        }
    }

    /// Call ended or rejected
    pub fn idle() -> Self {
        Self {
            state: CallState::Idle,
            caller: None,
        }
    }
}
