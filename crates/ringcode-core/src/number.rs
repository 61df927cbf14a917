//! Caller identifier normalization and matching
//!
//! Phone numbers reach the engine in whatever form the telephony stack
//! delivers them (`+41 79 123 45 67`, `0041791234567`, `079 123 45 67`, ...).
//! They are reduced to a digit string without international or trunk prefix
//! and then compared by suffix, so that the same subscriber matches across
//! those formats.
//!
//! The suffix rule is deliberately loose: a short number such as a local
//! extension matches every longer number ending in the same digits.

/// Reduce a raw caller identifier to its comparable digit string.
///
/// Exactly one leading prefix is removed (`00`, `+` or a single `0`), then all
/// non-digit characters are dropped together with any leading zeros that
/// remain. Input without digits yields an empty string.
pub fn normalize(raw: &str) -> String {
    let raw = raw.trim();
    let rest = raw
        .strip_prefix("00")
        .or_else(|| raw.strip_prefix('+'))
        .or_else(|| raw.strip_prefix('0'))
        .unwrap_or(raw);

    rest.chars()
        .filter(|c| c.is_ascii_digit())
        .skip_while(|&c| c == '0')
        .collect()
}

/// Whether two normalized identifiers designate the same assignment target.
///
/// True when either is a suffix of the other. Empty identifiers never match.
pub fn same_target(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.ends_with(b) || b.ends_with(a)
}

/// Normalize two raw identifiers and compare them
pub fn raw_same_target(a: &str, b: &str) -> bool {
    same_target(&normalize(a), &normalize(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_collapse_to_the_same_digits() {
        let expected = "41791234567";
        assert_eq!(normalize("0041791234567"), expected);
        assert_eq!(normalize("+41791234567"), expected);
        assert_eq!(normalize("041791234567"), expected);
    }

    #[test]
    fn formatting_is_stripped() {
        assert_eq!(normalize("+1 (555) 123-4567"), "15551234567");
        assert_eq!(normalize("  079 123 45 67 "), "791234567");
        // zeros after the first digit are kept
        assert_eq!(normalize("+41 (0)79 123"), "41079123");
    }

    #[test]
    fn only_one_prefix_is_stripped_but_leading_zeros_go() {
        assert_eq!(normalize("000041"), "41");
        assert_eq!(normalize("+0041"), "41");
        assert_eq!(normalize("0"), "");
    }

    #[test]
    fn malformed_input_is_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("anonymous"), "");
        assert_eq!(normalize("+"), "");
        assert_eq!(normalize("00"), "");
    }

    #[test]
    fn suffix_matching() {
        assert!(same_target(&normalize("791234567"), &normalize("41791234567")));
        assert!(same_target(&normalize("41791234567"), &normalize("791234567")));
        assert!(same_target("5551234567", "5551234567"));
        assert!(!same_target("5551234567", "5551234568"));
        assert!(raw_same_target("+15551234567", "5551234567"));
    }

    #[test]
    fn empty_never_matches() {
        assert!(!same_target("", ""));
        assert!(!same_target("", "123"));
        assert!(!same_target("123", ""));
        assert!(!raw_same_target("private", "unknown"));
    }

    #[test]
    fn short_numbers_match_loosely() {
        // known false positive of the suffix rule
        assert!(same_target("67", "41791234567"));
    }
}
