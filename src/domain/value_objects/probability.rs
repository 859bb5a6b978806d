//! Probability normalization shared by effects and provenance

/// Default extraction confidence when the draft has none
pub const DEFAULT_CONFIDENCE: f64 = 0.7;

/// Normalize a raw chance into [0, 1].
///
/// Values in (1, 100] are read as percentages. Anything else is clamped.
pub fn normalize_chance(raw: f64) -> Option<f64> {
    if !raw.is_finite() {
        return None;
    }
    let value = if raw > 1.0 && raw <= 100.0 { raw / 100.0 } else { raw };
    Some(value.clamp(0.0, 1.0))
}

/// Parse a textual chance such as `"75%"`, `"0.25"` or `"40"`
pub fn parse_chance(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if let Some(percent) = trimmed.strip_suffix('%') {
        let value: f64 = percent.trim().parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        return Some((value / 100.0).clamp(0.0, 1.0));
    }
    normalize_chance(trimmed.parse().ok()?)
}

/// Clamp a confidence score, defaulting when absent or non-finite
pub fn clamp_confidence(raw: Option<f64>) -> f64 {
    match raw {
        Some(value) if value.is_finite() => value.clamp(0.0, 1.0),
        _ => DEFAULT_CONFIDENCE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentages_are_scaled() {
        assert_eq!(parse_chance("75%"), Some(0.75));
        assert_eq!(normalize_chance(75.0), Some(0.75));
        assert_eq!(normalize_chance(100.0), Some(1.0));
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(normalize_chance(150.0), Some(1.0));
        assert_eq!(normalize_chance(-0.2), Some(0.0));
        assert_eq!(parse_chance("250%"), Some(1.0));
    }

    #[test]
    fn test_percent_strings_are_scaled_once() {
        assert_eq!(parse_chance("150%"), Some(1.0));
        assert_eq!(parse_chance("100 %"), Some(1.0));
        assert_eq!(parse_chance("1.5%"), Some(0.015));
        assert_eq!(parse_chance("-20%"), Some(0.0));
        assert_eq!(parse_chance("inf%"), None);
    }

    #[test]
    fn test_fractions_pass_through() {
        assert_eq!(normalize_chance(0.3), Some(0.3));
        assert_eq!(normalize_chance(1.0), Some(1.0));
        assert_eq!(parse_chance(" 0.5 "), Some(0.5));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert_eq!(parse_chance("often"), None);
        assert_eq!(normalize_chance(f64::NAN), None);
    }

    #[test]
    fn test_confidence_clamp() {
        assert_eq!(clamp_confidence(None), DEFAULT_CONFIDENCE);
        assert_eq!(clamp_confidence(Some(3.0)), 1.0);
        assert_eq!(clamp_confidence(Some(-1.0)), 0.0);
        assert_eq!(clamp_confidence(Some(0.42)), 0.42);
    }
}
