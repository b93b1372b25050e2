// Number formatting for metrics, tables and insight sentences.
use num_format::{Locale, ToFormattedString};

/// Shown wherever a value is undefined (zero or missing divisor).
pub const UNDEFINED: &str = "NaN";

/// Format a floating-point value with:
/// - a fixed number of decimal places, and
/// - locale-aware thousands separators (e.g., `1,234,567.89`).
pub fn format_number(n: f64, decimals: usize) -> String {
    if !n.is_finite() {
        return UNDEFINED.to_string();
    }
    let neg = n < 0.0;
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Beyond u128 the digits are kept ungrouped rather than lost.
    let mut res = match int_part.parse::<u128>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Counts in console and UI messages (e.g., `9,855 projects`).
pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Like [`format_number`] but renders `None` as [`UNDEFINED`].
pub fn format_optional(v: Option<f64>, decimals: usize) -> String {
    v.map(|n| format_number(n, decimals))
        .unwrap_or_else(|| UNDEFINED.to_string())
}

/// Integral values print without a fraction (`150`, not `150.0`); others
/// use the shortest round-trip form.
pub fn format_plain(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separators_and_rounding() {
        assert_eq!(format_number(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(format_number(1_234_567.6, 0), "1,234,568");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(-12_500.0, 0), "-12,500");
    }

    #[test]
    fn totals_past_i64_keep_their_digits() {
        assert_eq!(format_number(1e19, 0), "10,000,000,000,000,000,000");
        assert_eq!(
            format_number(1.5e20, 2),
            "150,000,000,000,000,000,000.00"
        );
        assert!(format_number(1e300, 0).starts_with("1000000"));
    }

    #[test]
    fn undefined_values_render_as_nan() {
        assert_eq!(format_optional(None, 2), "NaN");
        assert_eq!(format_number(f64::NAN, 0), "NaN");
        assert_eq!(format_optional(Some(0.5), 2), "0.50");
    }

    #[test]
    fn plain_numbers_drop_integral_fraction() {
        assert_eq!(format_plain(150.0), "150");
        assert_eq!(format_plain(12.5), "12.5");
        assert_eq!(format_int(9_855usize), "9,855");
    }
}
