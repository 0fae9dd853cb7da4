//! Decimal statistics helpers
//!
//! Every helper is defined for empty and single-element input.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::error::{AnalyticsError, Result};

/// Sum with overflow reported against `section`
pub fn checked_sum<I>(values: I, section: &'static str) -> Result<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(v).ok_or(AnalyticsError::Overflow(section))
    })
}

pub fn checked_mul(a: Decimal, b: Decimal, section: &'static str) -> Result<Decimal> {
    a.checked_mul(b).ok_or(AnalyticsError::Overflow(section))
}

/// Arithmetic mean, `None` for empty input
pub fn mean(values: &[Decimal], section: &'static str) -> Result<Option<Decimal>> {
    if values.is_empty() {
        return Ok(None);
    }
    let sum = checked_sum(values.iter().copied(), section)?;
    Ok(Some(sum / Decimal::from(values.len())))
}

/// Sample standard deviation, `None` below two values
pub fn sample_std_dev(values: &[Decimal], section: &'static str) -> Result<Option<Decimal>> {
    if values.len() < 2 {
        return Ok(None);
    }
    let Some(avg) = mean(values, section)? else {
        return Ok(None);
    };
    let squares = values
        .iter()
        .map(|v| {
            let diff = v.checked_sub(avg).ok_or(AnalyticsError::Overflow(section))?;
            checked_mul(diff, diff, section)
        })
        .collect::<Result<Vec<_>>>()?;
    let variance = checked_sum(squares, section)? / Decimal::from(values.len() - 1);
    Ok(variance.sqrt())
}

/// `numerator / denominator`, zero when the denominator is zero
pub fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// `part` as a percentage of `total`, zero when the total is zero
pub fn percent(part: Decimal, total: Decimal) -> Decimal {
    ratio(part, total) * dec!(100)
}

/// Nearest-rank quantile of ascending `sorted` at `q` in [0, 1]
///
/// Index is `floor(n * q)`, clamped to the last element.
pub fn nearest_rank(sorted: &[Decimal], q: Decimal) -> Option<Decimal> {
    let last = sorted.len().checked_sub(1)?;
    let idx = (Decimal::from(sorted.len()) * q)
        .floor()
        .to_usize()
        .unwrap_or(last);
    sorted.get(idx.min(last)).copied()
}

/// Share of `values` strictly below `x`, as 0-100. 50 when empty.
pub fn percentile_rank(values: &[Decimal], x: Decimal) -> Decimal {
    if values.is_empty() {
        return dec!(50);
    }
    let below = values.iter().filter(|v| **v < x).count();
    Decimal::from(below) / Decimal::from(values.len()) * dec!(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std_dev() {
        let values = [dec!(2), dec!(4), dec!(4), dec!(4), dec!(5), dec!(5), dec!(7), dec!(9)];
        assert_eq!(mean(&values, "test"), Ok(Some(dec!(5))));

        let sd = sample_std_dev(&values, "test").unwrap().unwrap();
        // sqrt(32 / 7)
        assert!((sd - dec!(2.1380899352993950)).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(mean(&[], "test"), Ok(None));
        assert_eq!(sample_std_dev(&[dec!(1)], "test"), Ok(None));
        assert_eq!(sample_std_dev(&[dec!(3), dec!(3)], "test"), Ok(Some(Decimal::ZERO)));
        assert_eq!(ratio(dec!(1), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(nearest_rank(&[], dec!(0.5)), None);
        assert_eq!(percentile_rank(&[], dec!(1)), dec!(50));
    }

    #[test]
    fn test_nearest_rank() {
        let sorted: Vec<Decimal> = (1..=10).map(Decimal::from).collect();
        assert_eq!(nearest_rank(&sorted, dec!(0.5)), Some(dec!(6)));
        assert_eq!(nearest_rank(&sorted, dec!(0.99)), Some(dec!(10)));
        assert_eq!(nearest_rank(&sorted, dec!(1)), Some(dec!(10)));
        assert_eq!(nearest_rank(&[dec!(7)], dec!(0.99)), Some(dec!(7)));
    }

    #[test]
    fn test_checked_sum_overflow() {
        let result = checked_sum([Decimal::MAX, Decimal::ONE], "test");
        assert_eq!(result, Err(AnalyticsError::Overflow("test")));
    }

    #[test]
    fn test_mean_overflow_is_reported() {
        let values = [Decimal::MAX, Decimal::MAX];
        assert_eq!(mean(&values, "test"), Err(AnalyticsError::Overflow("test")));
        assert_eq!(
            sample_std_dev(&values, "test"),
            Err(AnalyticsError::Overflow("test"))
        );

        // deviations overflow even though the sum does not
        let spread = [Decimal::MAX, Decimal::MIN];
        assert_eq!(
            sample_std_dev(&spread, "test"),
            Err(AnalyticsError::Overflow("test"))
        );
    }

    #[test]
    fn test_percentile_rank() {
        let values = [dec!(1), dec!(2), dec!(3), dec!(4)];
        assert_eq!(percentile_rank(&values, dec!(3)), dec!(50));
        assert_eq!(percentile_rank(&values, dec!(5)), dec!(100));
    }
}
