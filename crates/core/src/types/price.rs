//! Decimal price representation.
//!
//! Prices arrive from the remote service as decimal strings (`"499.00"`) and
//! sometimes as bare JSON numbers; `rust_decimal` accepts both. All arithmetic
//! the client does (line totals, cart totals, payment amounts) stays in
//! decimal so no float rounding leaks into what the customer is charged.

use core::fmt;
use core::iter::Sum;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A unit or total price in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest representable amount. Totals saturate here.
    pub const MAX: Self = Self(Decimal::MAX);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units at this unit price, saturating at
    /// [`Price::MAX`].
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Price of `quantity` units, or `None` if it does not fit.
    #[must_use]
    pub fn checked_times(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    /// Format with a currency symbol prefix, e.g. `₹499.00`.
    #[must_use]
    pub fn with_symbol(&self, symbol: &str) -> String {
        format!("{symbol}{self}")
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.fold(Decimal::ZERO, |total, p| total.saturating_add(p.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(s: &str) -> Price {
        Price::new(s.parse().expect("valid decimal"))
    }

    #[test]
    fn test_times_multiplies_exactly() {
        assert_eq!(price("19.99").times(3), price("59.97"));
        assert_eq!(price("0.10").times(3), price("0.30"));
    }

    #[test]
    fn test_overflow_saturates() {
        let huge = price("100000000000000000000");

        assert_eq!(huge.times(u32::MAX), Price::MAX);
        assert_eq!(huge.checked_times(u32::MAX), None);
        assert_eq!(huge.checked_times(2), Some(price("200000000000000000000")));

        let total: Price = [Price::MAX, price("1.00")].into_iter().sum();
        assert_eq!(total, Price::MAX);
        assert!(!Price::MAX.to_string().is_empty());
    }

    #[test]
    fn test_display_has_two_places() {
        assert_eq!(price("5").to_string(), "5.00");
        assert_eq!(price("12.5").to_string(), "12.50");
        assert_eq!(price("499.00").with_symbol("₹"), "₹499.00");
    }

    #[test]
    fn test_sum() {
        let total: Price = [price("1.25"), price("2.50"), price("0.25")].into_iter().sum();
        assert_eq!(total, price("4.00"));
    }

    #[test]
    fn test_deserialize_string_and_number() {
        let from_str: Price = serde_json::from_str("\"10.50\"").expect("string price");
        let from_num: Price = serde_json::from_str("10.5").expect("numeric price");
        assert_eq!(from_str, from_num);
    }
}
