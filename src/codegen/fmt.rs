//! Deterministic text formatting for emitted code.
//!
//! Floating-point printing is the portability hazard in byte-stable
//! output, so every number goes through one fixed-precision,
//! locale-independent formatter.

/// Fixed decimal precision for emitted numeric literals.
pub const FLOAT_PRECISION: usize = 6;

/// Format a float with a fixed six-digit, period-separated rendering.
/// Magnitudes below 1e-3 switch to scientific notation so component
/// values like nanofarads survive the fixed precision.
pub fn float_literal(value: f64) -> String {
    if value != 0.0 && value.abs() < 1e-3 {
        format!("{value:.6e}")
    } else {
        format!("{value:.6}")
    }
}

/// Format a float as a C++ `float` literal.
pub fn float_literal_f(value: f64) -> String {
    format!("{}f", float_literal(value))
}

/// Sanitize a source name into a C++ identifier: ASCII alphanumerics
/// survive, everything else becomes `_`, and a leading digit gets a `_`
/// prefix. Returns `None` when nothing identifier-like remains.
pub fn identifier(name: &str) -> Option<String> {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    if out.trim_matches('_').is_empty() {
        return None;
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    Some(out)
}

/// Replace filename characters the common filesystems reject.
pub fn filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect()
}

/// CMake target names: alphanumerics and underscores only.
pub fn cmake_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_literal_fixed_precision() {
        assert_eq!(float_literal(1591.5494309), "1591.549431");
        assert_eq!(float_literal(0.5), "0.500000");
        assert_eq!(float_literal_f(1.0), "1.000000f");
    }

    #[test]
    fn test_float_literal_small_magnitudes() {
        assert_eq!(float_literal(1e-8), "1.000000e-8");
        assert_eq!(float_literal(1e-6), "1.000000e-6");
        assert_eq!(float_literal(0.0), "0.000000");
        assert_eq!(float_literal(-4.7e-9), "-4.700000e-9");
    }

    #[test]
    fn test_identifier() {
        assert_eq!(identifier("D1").as_deref(), Some("D1"));
        assert_eq!(identifier("Drive Pot").as_deref(), Some("Drive_Pot"));
        assert_eq!(identifier("2N3904").as_deref(), Some("_2N3904"));
        assert_eq!(identifier("***"), None);
        assert_eq!(identifier(""), None);
    }

    #[test]
    fn test_filename() {
        assert_eq!(filename("Boss SD-1: Clone?"), "Boss SD-1_ Clone_");
    }

    #[test]
    fn test_cmake_name() {
        assert_eq!(cmake_name("Boss SD-1"), "Boss_SD_1");
    }
}
