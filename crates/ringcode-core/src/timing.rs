//! Timing profile for Morse playback
//!
//! All pulse and gap lengths derive from a single unit (the length of a
//! short pulse). The ratios are fixed:
//!
//! | Interval                      | Length   |
//! |-------------------------------|----------|
//! | short pulse                   | 1 unit   |
//! | long pulse                    | 3 units  |
//! | silence after a short pulse   | 2 units  |
//! | silence after a long pulse    | 4 units  |
//! | silence after each character  | 4 units  |

use std::time::Duration;

use crate::morse::{EncodedSymbol, Pulse};

/// Long pulse length in units
pub const LONG_PULSE_UNITS: u32 = 3;
/// Silence after a short pulse, in units
pub const SHORT_GAP_UNITS: u32 = 2;
/// Silence after a long pulse, in units
pub const LONG_GAP_UNITS: u32 = 4;
/// Silence after the last pulse of a character, in units
pub const CHAR_GAP_UNITS: u32 = 4;

/// Shortest permitted unit in milliseconds
pub const MIN_UNIT_MS: u64 = 1;
/// Longest permitted unit in milliseconds
pub const MAX_UNIT_MS: u64 = 250;
/// Highest output level
pub const MAX_LEVEL: u8 = 100;

/// Unit duration and output level for one playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingProfile {
    unit: Duration,
    level: u8,
}

impl TimingProfile {
    /// Create a profile, clamping the unit to 1–250 ms and the level to 0–100
    pub fn new(unit_ms: u64, level: u8) -> Self {
        Self {
            unit: Duration::from_millis(unit_ms.clamp(MIN_UNIT_MS, MAX_UNIT_MS)),
            level: level.min(MAX_LEVEL),
        }
    }

    /// Length of a short pulse
    pub fn unit(&self) -> Duration {
        self.unit
    }

    /// Output level in percent
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Tone length of a pulse
    pub fn pulse_duration(&self, pulse: Pulse) -> Duration {
        match pulse {
            Pulse::Short => self.unit,
            Pulse::Long => self.unit * LONG_PULSE_UNITS,
        }
    }

    /// Silence following a pulse
    pub fn gap_after(&self, pulse: Pulse) -> Duration {
        match pulse {
            Pulse::Short => self.unit * SHORT_GAP_UNITS,
            Pulse::Long => self.unit * LONG_GAP_UNITS,
        }
    }

    /// Silence following a character
    pub fn char_gap(&self) -> Duration {
        self.unit * CHAR_GAP_UNITS
    }

    /// Wall-clock length of one full playback of the given symbols
    pub fn playback_duration(&self, symbols: &[EncodedSymbol]) -> Duration {
        symbols
            .iter()
            .map(|symbol| {
                symbol
                    .pattern
                    .pulses()
                    .map(|p| self.pulse_duration(p) + self.gap_after(p))
                    .sum::<Duration>()
                    + self.char_gap()
            })
            .sum()
    }
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self::new(100, MAX_LEVEL)
    }
}
