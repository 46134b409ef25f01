//! Number formatting utilities.
//!
//! Report tables render counts the way the existing customer decks show them,
//! with comma thousands separators and half-to-even rounding of rates.

/// Formats a number with comma separators for thousands.
///
/// # Examples
///
/// ```
/// use lr_report_tools::utils::format::format_number;
///
/// assert_eq!(format_number(1234), "1,234");
/// assert_eq!(format_number(1234567), "1,234,567");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Integer division rounded to the nearest integer, ties to even.
///
/// # Examples
///
/// ```
/// use lr_report_tools::utils::format::round_half_even;
///
/// assert_eq!(round_half_even(70_000, 7), 10_000);
/// assert_eq!(round_half_even(5, 2), 2);
/// assert_eq!(round_half_even(7, 2), 4);
/// ```
pub fn round_half_even(numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    let quotient = numerator / denominator;
    let twice_remainder = u128::from(numerator % denominator) * 2;
    let denominator = u128::from(denominator);

    if twice_remainder > denominator || (twice_remainder == denominator && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(1), "1");
        assert_eq!(format_number(12), "12");
        assert_eq!(format_number(123), "123");
        assert_eq!(format_number(1234), "1,234");
        assert_eq!(format_number(12345), "12,345");
        assert_eq!(format_number(123_456), "123,456");
        assert_eq!(format_number(1_234_567), "1,234,567");
        assert_eq!(format_number(1_000_000_000), "1,000,000,000");
    }

    #[test]
    fn test_format_number_max() {
        assert_eq!(format_number(u64::MAX), "18,446,744,073,709,551,615");
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_half_even(0, 7), 0);
        assert_eq!(round_half_even(10, 7), 1);
        assert_eq!(round_half_even(11, 7), 2);
        assert_eq!(round_half_even(1, 2), 0);
        assert_eq!(round_half_even(3, 2), 2);
        assert_eq!(round_half_even(70_000, 604_800), 0);
        assert_eq!(round_half_even(302_400, 604_800), 0);
        assert_eq!(round_half_even(302_401, 604_800), 1);
        assert_eq!(round_half_even(u64::MAX, 1), u64::MAX);
        assert_eq!(round_half_even(9, 0), 0);
    }
}
