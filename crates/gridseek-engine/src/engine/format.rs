/// Round to the three decimal places shown in the status bar.
///
/// `f64::round` rounds half away from zero, matching spreadsheet display.
/// Magnitudes of 2^52 / 1000 and above have no fractional digits left to
/// round and are returned unchanged, so large finite values stay finite.
pub fn round_display(n: f64) -> f64 {
    const EXACT: f64 = 4_503_599_627_370.496; // 2^52 / 1000
    if !n.is_finite() || n.abs() >= EXACT {
        return n;
    }
    (n * 1000.0).round() / 1000.0
}

/// Format a number for display.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e10 {
        format!("{:.0}", n)
    } else {
        // Shortest round-trip form of the already-rounded value: 8.5, 4.25, 0.333
        round_display(n).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_display_half_away_from_zero() {
        assert_eq!(round_display(0.0005), 0.001);
        assert_eq!(round_display(-0.0005), -0.001);
        assert_eq!(round_display(0.9999999), 1.0);
        assert_eq!(round_display(4.25), 4.25);
    }

    #[test]
    fn test_round_display_keeps_huge_values_finite() {
        assert_eq!(round_display(1e306), 1e306);
        assert_eq!(round_display(-f64::MAX), -f64::MAX);
        assert_eq!(round_display(5e12 + 0.5), 5e12 + 0.5);
        assert!(round_display(f64::NAN).is_nan());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(8.0), "8");
        assert_eq!(format_number(8.5), "8.5");
        assert_eq!(format_number(1.0 / 3.0), "0.333");
        assert_eq!(format_number(-2.0), "-2");
        assert_eq!(format_number(f64::NAN), "#NAN!");
        assert_eq!(format_number(f64::INFINITY), "#INF!");
    }
}
