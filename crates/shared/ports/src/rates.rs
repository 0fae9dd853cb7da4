use rust_decimal::Decimal;

/// Port for currency to EUR conversion
///
/// A rate `r` for currency `C` means `1 C = r EUR`. EUR itself is always 1.
pub trait RateLookup: Send + Sync {
    /// Multiplier converting an amount in `currency` into EUR
    fn rate_to_eur(&self, currency: &str) -> Option<Decimal>;
}
