//! Tenor ordering and duration estimates shared by the classifier and analytics.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Canonical tenor order used for every tenor-sorted output
pub const CANONICAL_TENORS: [&str; 11] = [
    "3M", "6M", "1Y", "2Y", "3Y", "5Y", "7Y", "10Y", "15Y", "20Y", "30Y",
];

/// Duration used for unknown tenors
pub const DEFAULT_DURATION: Decimal = dec!(5.0);

/// Position in the canonical order, `None` for unknown tenors
pub fn tenor_rank(tenor: &str) -> Option<usize> {
    CANONICAL_TENORS.iter().position(|t| *t == tenor)
}

/// Known tenors in canonical order, unknown tenors last and alphabetically
pub fn compare_tenors(a: &str, b: &str) -> Ordering {
    match (tenor_rank(a), tenor_rank(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Deduplicate and sort tenors canonically
pub fn sort_tenors<I, S>(tenors: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tenor in tenors {
        let tenor = tenor.as_ref();
        if !tenor.is_empty() && !out.iter().any(|t| t == tenor) {
            out.push(tenor.to_string());
        }
    }
    out.sort_by(|a, b| compare_tenors(a, b));
    out
}

/// Approximate modified duration of a par swap with the given tenor
pub fn duration_estimate(tenor: &str) -> Decimal {
    match tenor {
        "3M" => dec!(0.25),
        "6M" => dec!(0.5),
        "1Y" => dec!(0.95),
        "2Y" => dec!(1.9),
        "3Y" => dec!(2.85),
        "5Y" => dec!(4.5),
        "7Y" => dec!(6.2),
        "10Y" => dec!(8.0),
        "15Y" => dec!(11.5),
        "20Y" => dec!(14.5),
        "30Y" => dec!(18.0),
        _ => DEFAULT_DURATION,
    }
}
