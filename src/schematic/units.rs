//! Unit-suffixed value parsing for schematic attributes.
//!
//! Attribute values arrive as free text like `10k`, `4.7nF`, `1µF`, or
//! `9V`. Parsing splits the leading numeric prefix from the trailing
//! suffix and applies the SI multiplier table. Unit letters (`V`, `F`,
//! `H`, `A`, `Ω`) and unknown suffixes are identity, so `"9V"` is `9.0`
//! and `"10000"` stays `10000.0`.

/// Normalize the micro and ohm glyphs, including the mojibake byte
/// sequences the authoring tool's exporter produces when a schematic
/// round-trips through a non-UTF-8 editor.
pub fn sanitize(text: &str) -> String {
    text.replace("Âµ", "u")
        .replace("Î¼", "u")
        .replace('µ', "u")
        .replace('μ', "u")
        .replace("â„¦", "")
        .replace("Î©", "")
        .replace('Ω', "")
}

/// SI multiplier for a unit suffix. The suffix is inspected by its first
/// character only, so `kΩ`, `kOhm`, and `k` all scale by 1e3 and current
/// suffixes `fA` through `mA` follow the same prefixes.
fn multiplier(suffix: &str) -> f64 {
    match suffix.chars().next() {
        None => 1.0,
        Some('f') => 1e-15,
        Some('p') => 1e-12,
        Some('n') => 1e-9,
        Some('u') => 1e-6,
        Some('m') => 1e-3,
        Some('k') | Some('K') => 1e3,
        Some('M') => 1e6,
        Some('G') => 1e9,
        // Unit letters and anything unrecognized leave the bare number
        Some(_) => 1.0,
    }
}

/// Parse a unit-suffixed value. Returns `None` when no numeric prefix is
/// present; callers fall back to their schema defaults.
pub fn parse_value(text: &str) -> Option<f64> {
    let cleaned = sanitize(text.trim());
    let bytes = cleaned.as_bytes();
    if bytes.is_empty() {
        return None;
    }

    // Scan the numeric prefix: sign, digits, decimal point, and an
    // exponent only when it is actually followed by digits ("10e3" is
    // exponential notation, "10EL34" is a number with a suffix).
    let mut end = 0usize;
    let mut seen_digit = false;
    while end < bytes.len() {
        let c = bytes[end] as char;
        match c {
            '0'..='9' => {
                seen_digit = true;
                end += 1;
            }
            '+' | '-' if end == 0 => end += 1,
            '.' => end += 1,
            'e' | 'E' if seen_digit => {
                let mut probe = end + 1;
                if probe < bytes.len() && (bytes[probe] == b'+' || bytes[probe] == b'-') {
                    probe += 1;
                }
                if probe < bytes.len() && bytes[probe].is_ascii_digit() {
                    end = probe + 1;
                    while end < bytes.len() && bytes[end].is_ascii_digit() {
                        end += 1;
                    }
                } else {
                    break;
                }
            }
            _ => break,
        }
    }

    if !seen_digit {
        return None;
    }

    let number: f64 = cleaned[..end].parse().ok()?;
    let suffix = cleaned[end..].trim();
    Some(number * multiplier(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_multiplier_table() {
        let cases = [
            ("1p", 1e-12),
            ("1n", 1e-9),
            ("1u", 1e-6),
            ("1m", 1e-3),
            ("1k", 1e3),
            ("1K", 1e3),
            ("1M", 1e6),
            ("1G", 1e9),
        ];
        for (text, expected) in cases {
            let v = parse_value(text).unwrap();
            assert_relative_eq!(v, expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_resistance_synonyms() {
        for text in ["10k", "10kΩ", "10kOhm", "10e3", "10000"] {
            assert_relative_eq!(parse_value(text).unwrap(), 10_000.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_capacitance_synonyms() {
        for text in ["1µF", "1uF", "1000nF", "1μF"] {
            assert_relative_eq!(parse_value(text).unwrap(), 1e-6, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_mojibake_micro() {
        assert_relative_eq!(parse_value("4.7ÂµF").unwrap(), 4.7e-6, max_relative = 1e-12);
    }

    #[test]
    fn test_identity_units() {
        assert_relative_eq!(parse_value("9V").unwrap(), 9.0, max_relative = 1e-12);
        assert_relative_eq!(parse_value("470Ω").unwrap(), 470.0, max_relative = 1e-12);
        assert_relative_eq!(parse_value("2.2F").unwrap(), 2.2, max_relative = 1e-12);
    }

    #[test]
    fn test_current_units() {
        assert_relative_eq!(parse_value("1fA").unwrap(), 1e-15, max_relative = 1e-12);
        assert_relative_eq!(parse_value("25nA").unwrap(), 25e-9, max_relative = 1e-12);
        assert_relative_eq!(parse_value("3mA").unwrap(), 3e-3, max_relative = 1e-12);
    }

    #[test]
    fn test_non_numeric_is_none() {
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("TL072"), None);
        assert_eq!(parse_value("-"), None);
    }

    #[test]
    fn test_negative_and_decimal() {
        assert_relative_eq!(parse_value("-0.5").unwrap(), -0.5, max_relative = 1e-12);
        assert_relative_eq!(parse_value("4.7k").unwrap(), 4700.0, max_relative = 1e-12);
    }
}
