use std::sync::Arc;

use rust_decimal::Decimal;
use swapflow_core::{Notional, Trade};
use swapflow_ports::{PortError, PortResult, RateLookup};

/// Converts a trade's leg notional into EUR
///
/// Leg 1 is used when it carries an amount, a currency and a known rate;
/// otherwise leg 2 is tried.
pub struct EurNormalizer {
    rates: Arc<dyn RateLookup>,
}

impl EurNormalizer {
    pub fn new(rates: Arc<dyn RateLookup>) -> Self {
        Self { rates }
    }

    pub fn to_eur(&self, trade: &Trade) -> PortResult<Notional> {
        let legs = [
            (trade.notional_leg1_amount, trade.notional_leg1_currency.as_str()),
            (trade.notional_leg2_amount, trade.notional_leg2_currency.as_str()),
        ];

        let mut missing_rate: Option<&str> = None;
        for (amount, currency) in legs {
            if amount.is_zero() || currency.is_empty() {
                continue;
            }
            match self.rate(currency) {
                Some(rate) => return Ok(amount * rate),
                None => {
                    missing_rate.get_or_insert(currency);
                }
            }
        }

        Err(match missing_rate {
            Some(currency) => PortError::RateUnavailable(currency.to_string()),
            None => PortError::NoNotional(trade.id.clone()),
        })
    }

    fn rate(&self, currency: &str) -> Option<Decimal> {
        if currency.eq_ignore_ascii_case("EUR") {
            Some(Decimal::ONE)
        } else {
            self.rates.rate_to_eur(currency)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use swapflow_core::TradeAction;

    struct UsdOnly;

    impl RateLookup for UsdOnly {
        fn rate_to_eur(&self, currency: &str) -> Option<Decimal> {
            (currency == "USD").then_some(dec!(0.9))
        }
    }

    fn normalizer() -> EurNormalizer {
        EurNormalizer::new(Arc::new(UsdOnly))
    }

    #[test]
    fn test_eur_needs_no_rate() {
        let trade = Trade::new("T1", TradeAction::New, Utc::now(), "EUR-ESTR")
            .with_leg1(dec!(100_000_000), "EUR");
        assert_eq!(normalizer().to_eur(&trade), Ok(dec!(100_000_000)));
    }

    #[test]
    fn test_converts_leg1() {
        let trade = Trade::new("T1", TradeAction::New, Utc::now(), "USD-SOFR")
            .with_leg1(dec!(100_000_000), "USD");
        assert_eq!(normalizer().to_eur(&trade), Ok(dec!(90_000_000)));
    }

    #[test]
    fn test_falls_back_to_leg2() {
        let trade = Trade::new("T1", TradeAction::New, Utc::now(), "JPY-TONA")
            .with_leg1(dec!(10_000_000_000), "JPY")
            .with_leg2(dec!(70_000_000), "USD");
        assert_eq!(normalizer().to_eur(&trade), Ok(dec!(63_000_000)));
    }

    #[test]
    fn test_missing_rate_is_an_error() {
        let trade = Trade::new("T1", TradeAction::New, Utc::now(), "JPY-TONA")
            .with_leg1(dec!(10_000_000_000), "JPY");
        assert_eq!(
            normalizer().to_eur(&trade),
            Err(PortError::RateUnavailable("JPY".into()))
        );
    }

    #[test]
    fn test_no_notional_is_an_error() {
        let trade = Trade::new("T1", TradeAction::New, Utc::now(), "JPY-TONA");
        assert_eq!(
            normalizer().to_eur(&trade),
            Err(PortError::NoNotional("T1".into()))
        );
    }
}
