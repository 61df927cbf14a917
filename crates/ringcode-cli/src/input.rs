//! Line protocol read by `ringcode run`
//!
//! ```text
//! RINGING +15551234567
//! OFFHOOK
//! IDLE
//! ringer normal
//! # comment
//! ```

use anyhow::{Context, Result};
use ringcode_core::{CallEvent, RingerMode};

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLine {
    /// A call state change
    Event(CallEvent),
    /// The host ringer mode changed
    Ringer(RingerMode),
    /// Blank line or comment
    Skip,
}

pub fn parse_line(line: &str) -> Result<InputLine> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(InputLine::Skip);
    }

    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(InputLine::Skip);
    };
    let rest = parts.next();

    if head.eq_ignore_ascii_case("ringer") {
        let mode = rest.context("ringer line needs a mode (normal, vibrate, silent)")?;
        let mode = mode
            .parse::<RingerMode>()
            .with_context(|| format!("unknown ringer mode '{mode}'"))?;
        return Ok(InputLine::Ringer(mode));
    }

    Ok(InputLine::Event(CallEvent::new(head, rest)))
}
