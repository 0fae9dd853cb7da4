use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Human readable notional: "2.50B", "750.00M", "12,000"
pub fn format_notional(value: Decimal) -> String {
    let magnitude = value.abs();
    if magnitude >= dec!(1_000_000_000) {
        format!("{:.2}B", value / dec!(1_000_000_000))
    } else if magnitude >= dec!(1_000_000) {
        format!("{:.2}M", value / dec!(1_000_000))
    } else {
        group_thousands(value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
    }
}

fn group_thousands(value: Decimal) -> String {
    let digits = value.abs().trunc().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value.is_sign_negative() && !value.is_zero() {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_notional_scales() {
        assert_eq!(format_notional(dec!(2_500_000_000)), "2.50B");
        assert_eq!(format_notional(dec!(750_000_000)), "750.00M");
        assert_eq!(format_notional(dec!(1_000_000)), "1.00M");
        assert_eq!(format_notional(dec!(12_000)), "12,000");
        assert_eq!(format_notional(dec!(999)), "999");
        assert_eq!(format_notional(dec!(0)), "0");
    }

    #[test]
    fn test_format_notional_groups_and_rounds() {
        assert_eq!(format_notional(dec!(123_456.5)), "123,457");
        assert_eq!(format_notional(dec!(-45_000)), "-45,000");
    }
}
