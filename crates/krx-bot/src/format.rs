//! Korean-locale number formatting for report text
//!
//! Absent values render as a fixed sentinel rather than `0`, so the model is
//! never fed fabricated figures.

/// Sentinel for figures the exchange did not publish
pub const NO_DATA: &str = "정보없음";

/// Sentinel for a price that could not be confirmed
pub const PRICE_UNAVAILABLE: &str = "확인불가";

/// Format an optional figure: grouped integer when whole, otherwise two
/// decimal places. `None` and non-finite values become the sentinel.
pub fn format_number(value: Option<f64>) -> String {
    let Some(v) = value else {
        return NO_DATA.to_string();
    };
    if !v.is_finite() {
        return NO_DATA.to_string();
    }
    if v.fract() == 0.0 && v.abs() < 9e15 {
        return group_signed(v as i64);
    }
    let formatted = format!("{v:.2}");
    match formatted.split_once('.') {
        Some((int_part, frac)) => format!("{}.{frac}", group_digits(int_part)),
        None => group_digits(&formatted),
    }
}

/// Format an optional percentage through [`format_number`] with a `%`
/// suffix; the sentinel passes through unsuffixed.
pub fn format_percent(value: Option<f64>) -> String {
    let formatted = format_number(value);
    if formatted == NO_DATA {
        return formatted;
    }
    format!("{formatted}%")
}

/// Format an optional whole-won price with digit grouping
pub fn format_price(value: Option<i64>) -> String {
    match value {
        Some(v) => group_signed(v),
        None => PRICE_UNAVAILABLE.to_string(),
    }
}

fn group_signed(value: i64) -> String {
    let grouped = group_digits(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Insert a comma every three digits from the right. Accepts an optional
/// leading sign.
fn group_digits(raw: &str) -> String {
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_values_use_sentinel() {
        assert_eq!(format_number(None), NO_DATA);
        assert_eq!(format_number(Some(f64::NAN)), NO_DATA);
        assert_eq!(format_percent(None), NO_DATA);
    }

    #[test]
    fn test_whole_values_grouped_without_decimals() {
        assert_eq!(format_number(Some(71500.0)), "71,500");
        assert_eq!(format_number(Some(1234567.0)), "1,234,567");
        assert_eq!(format_number(Some(42.0)), "42");
    }

    #[test]
    fn test_fractional_values_keep_two_decimals() {
        assert_eq!(format_number(Some(12.3456)), "12.35");
        assert_eq!(format_number(Some(1234.5)), "1,234.50");
    }

    #[test]
    fn test_negative_values() {
        assert_eq!(format_number(Some(-1234.0)), "-1,234");
        assert_eq!(format_number(Some(-0.5)), "-0.50");
    }

    #[test]
    fn test_percent_follows_number_rules() {
        assert_eq!(format_percent(Some(2.5)), "2.50%");
        // Whole-valued yields drop the decimals, same as format_number
        assert_eq!(format_percent(Some(2.0)), "2%");
        assert_eq!(format_percent(Some(0.0)), "0%");
    }

    #[test]
    fn test_percent_sentinel_unsuffixed() {
        assert_eq!(format_percent(None), NO_DATA);
        assert_eq!(format_percent(Some(f64::NAN)), NO_DATA);
    }

    #[test]
    fn test_price() {
        assert_eq!(format_price(Some(71_500)), "71,500");
        assert_eq!(format_price(None), PRICE_UNAVAILABLE);
    }
}
