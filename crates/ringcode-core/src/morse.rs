//! Morse code table and symbol encoder
//!
//! Every supported character maps to a fixed, non-empty [`PulsePattern`].
//! Characters without a mapping are skipped when a text is encoded.

use std::fmt;

/// Character used to audition the current volume and speed settings.
pub const ALERT_SYMBOL: char = '!';

/// A single tone-on interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pulse {
    /// Dot (one unit)
    Short,
    /// Dash (three units)
    Long,
}

impl Pulse {
    /// Conventional rendering of the pulse
    pub fn to_char(self) -> char {
        match self {
            Self::Short => '.',
            Self::Long => '-',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Self::Short),
            '-' => Some(Self::Long),
            _ => None,
        }
    }
}

/// Ordered pulses encoding one character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PulsePattern(&'static str);

impl PulsePattern {
    /// Iterate over the pulses of this pattern
    pub fn pulses(&self) -> impl Iterator<Item = Pulse> + Clone + '_ {
        self.0.chars().filter_map(Pulse::from_char)
    }

    /// Number of pulses in the pattern
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for patterns taken from the code table
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Dot/dash rendering, e.g. `"...-."`
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for PulsePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// One encoded character of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedSymbol {
    /// The (uppercased) character
    pub character: char,
    /// Its pulse pattern
    pub pattern: PulsePattern,
}

/// Look up the pattern for a character.
///
/// Letters are matched case-insensitively. Returns `None` for characters
/// outside the table.
pub fn pattern_for(c: char) -> Option<PulsePattern> {
    let code = match c.to_ascii_uppercase() {
        '0' => "-----",
        '1' => ".----",
        '2' => "..---",
        '3' => "...--",
        '4' => "....-",
        '5' => ".....",
        '6' => "-....",
        '7' => "--...",
        '8' => "---..",
        '9' => "----.",
        'A' => ".-",
        'B' => "-...",
        'C' => "-.-.",
        'D' => "-..",
        'E' => ".",
        'F' => "..-.",
        'G' => "--.",
        'H' => "....",
        'I' => "..",
        'J' => ".---",
        'K' => "-.-",
        'L' => ".-..",
        'M' => "--",
        'N' => "-.",
        'O' => "---",
        'P' => ".--.",
        'Q' => "--.-",
        'R' => ".-.",
        'S' => "...",
        'T' => "-",
        'U' => "..-",
        'V' => "...-",
        'W' => ".--",
        'X' => "-..-",
        'Y' => "-.--",
        'Z' => "--..",
        ALERT_SYMBOL => "...-.",
        _ => return None,
    };
    Some(PulsePattern(code))
}

/// Whether a character has a Morse pattern
pub fn is_supported(c: char) -> bool {
    pattern_for(c).is_some()
}

/// Lazily encode a text, skipping unsupported characters.
///
/// The iterator is `Clone`, so a message can be replayed without encoding it
/// again.
pub fn symbols(text: &str) -> impl Iterator<Item = EncodedSymbol> + Clone + '_ {
    text.chars().filter_map(|c| {
        pattern_for(c).map(|pattern| EncodedSymbol {
            character: c.to_ascii_uppercase(),
            pattern,
        })
    })
}

/// Encode a text into its sequence of symbols
pub fn encode(text: &str) -> Vec<EncodedSymbol> {
    symbols(text).collect()
}

/// Render a text as space separated dot/dash groups, e.g. `"... --- ..."`
pub fn render(text: &str) -> String {
    symbols(text)
        .map(|s| s.pattern.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
