//! Numeric helpers

/// Round to two decimal places, taking the exact binary value of `value`
/// into account.
///
/// `0.015` is stored as slightly less than 0.015 and therefore rounds down to
/// `0.01`. Scaling by 100 first would round the product up instead.
pub fn round_to_cents(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.2}", value).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_cents() {
        assert_eq!(round_to_cents(1.6500000000000001), 1.65);
        assert_eq!(round_to_cents(0.004), 0.0);
        assert_eq!(round_to_cents(2.0), 2.0);
        assert_eq!(round_to_cents(-1.234), -1.23);
    }

    #[test]
    fn test_rounds_on_exact_binary_value() {
        assert_eq!(round_to_cents(0.015), 0.01);
        assert_eq!(round_to_cents(3.0 * 0.015), 0.04);
        assert_eq!(round_to_cents(7.0 * 0.015), 0.1);
        assert_eq!(round_to_cents(33.0 * 0.015), 0.49);
    }

    #[test]
    fn test_non_finite_passes_through() {
        assert!(round_to_cents(f64::NAN).is_nan());
        assert_eq!(round_to_cents(f64::INFINITY), f64::INFINITY);
    }
}
