//! Decimal claim amounts
//!
//! Damage estimates are computed in `f64`; payouts are not. [`Money::from_f64`]
//! is where an estimate becomes an amount, and everything after it is exact
//! until [`Money::round_to`] fixes the presentation precision.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// ISO 4217 settlement currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    INR,
    AUD,
}

impl Currency {
    const ALL: [Currency; 6] = [
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::JPY,
        Currency::INR,
        Currency::AUD,
    ];

    /// Minor-unit digits used when presenting an amount
    pub fn decimal_places(&self) -> u32 {
        if *self == Currency::JPY { 0 } else { 2 }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
            Currency::INR => "₹",
            Currency::AUD => "A$",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::INR => "INR",
            Currency::AUD => "AUD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Currency::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| MoneyError::UnknownCurrency(code.to_string()))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot combine {0} with {1}")]
    CurrencyMismatch(Currency, Currency),

    #[error("Amount is not representable: {0}")]
    InvalidAmount(String),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
}

/// An amount in a single currency
///
/// The amount is held exactly as given. Rounding happens once, in
/// [`Money::round_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Widest precision the claim store keeps (`NUMERIC(18, 4)`)
    pub const STORAGE_DP: u32 = 4;

    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Converts a floating-point estimate; NaN and out-of-range values are errors
    pub fn from_f64(amount: f64, currency: Currency) -> Result<Self, MoneyError> {
        amount
            .is_finite()
            .then(|| Decimal::from_f64(amount))
            .flatten()
            .map(|decimal| Self::new(decimal, currency))
            .ok_or_else(|| MoneyError::InvalidAmount(amount.to_string()))
    }

    pub fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Half away from zero, so 0.005 becomes 0.01
    pub fn round_to(&self, dp: u32) -> Self {
        let amount = self
            .amount
            .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
        Self { amount, currency: self.currency }
    }

    pub fn round_to_currency(&self) -> Self {
        self.round_to(self.currency.decimal_places())
    }

    /// Scales by a decimal factor such as a per-square-metre rate
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self::new(self.amount * factor, self.currency)
    }

    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(self.currency, other.currency));
        }
        Ok(Self::new(self.amount + other.amount, self.currency))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = self.currency.decimal_places() as usize;
        let shown = self.round_to_currency();
        write!(f, "{} {:.dp$}", self.currency.symbol(), shown.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_keeps_amount_exact() {
        let m = Money::new(dec!(12.00495), Currency::USD);
        assert_eq!(m.amount(), dec!(12.00495));
        assert_eq!(m.round_to(2).amount(), dec!(12.00));
    }

    #[test]
    fn test_from_f64_rejects_non_finite() {
        assert!(Money::from_f64(f64::NAN, Currency::USD).is_err());
        assert!(Money::from_f64(f64::NEG_INFINITY, Currency::USD).is_err());
    }

    #[test]
    fn test_round_to_half_away_from_zero() {
        let m = Money::new(dec!(366666.665), Currency::USD);
        assert_eq!(m.round_to(2).amount(), dec!(366666.67));
    }

    #[test]
    fn test_mismatch_names_both_currencies() {
        let usd = Money::new(dec!(100.00), Currency::USD);
        let eur = Money::new(dec!(100.00), Currency::EUR);

        assert_eq!(
            usd.checked_add(&eur),
            Err(MoneyError::CurrencyMismatch(Currency::USD, Currency::EUR))
        );
    }

    #[test]
    fn test_currency_parse_ignores_case_and_whitespace() {
        assert_eq!(" usd ".parse::<Currency>().unwrap(), Currency::USD);
        assert_eq!("Jpy".parse::<Currency>().unwrap(), Currency::JPY);
        assert!("xyz".parse::<Currency>().is_err());
    }

    #[test]
    fn test_display_uses_currency_precision() {
        assert_eq!(Money::new(dec!(1.005), Currency::USD).to_string(), "$ 1.01");
        assert_eq!(Money::new(dec!(1500.4), Currency::JPY).to_string(), "¥ 1500");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn round_to_is_idempotent(cents in 0i64..10_000_000_000i64, dp in 0u32..=4) {
            let once = Money::new(Decimal::new(cents, 6), Currency::USD).round_to(dp);
            prop_assert_eq!(once.round_to(dp), once);
            prop_assert!(once.amount().scale() <= dp);
        }
    }
}
