//! Type-safe price representation using decimal arithmetic.
//!
//! The catalogue encodes prices as strings (`"45000"`, `"12 990 ₽"`), and a
//! few hand-edited records use bare numbers. Both parse into a [`Price`];
//! serialization always produces a plain decimal string.

use core::fmt;
use core::iter::Sum;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Currency sign appended when formatting prices for display.
pub const CURRENCY_SIGN: &str = "₽";

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Nothing left after stripping separators and the currency sign.
    #[error("price cannot be empty")]
    Empty,
    /// The remaining text is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// Prices cannot be negative.
    #[error("price cannot be negative: {0}")]
    Negative(String),
    /// Above [`Price::MAX_AMOUNT`].
    #[error("price is implausibly large: {0}")]
    TooLarge(String),
}

/// A non-negative price in roubles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest accepted unit price, one trillion roubles.
    pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] for amounts below zero and
    /// [`PriceError::TooLarge`] above [`Price::MAX_AMOUNT`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount.to_string()));
        }
        if amount > Self::MAX_AMOUNT {
            return Err(PriceError::TooLarge(amount.to_string()));
        }
        Ok(Self(amount.normalize()))
    }

    /// Parse a price from catalogue text.
    ///
    /// Whitespace (including the non-breaking spaces used as thousands
    /// separators) and a trailing currency sign are ignored; a comma is
    /// accepted as the decimal separator.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing numeric remains or the number is negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let cleaned: String = s
            .trim()
            .trim_end_matches(CURRENCY_SIGN)
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == ',' { '.' } else { c })
            .collect();

        if cleaned.is_empty() {
            return Err(PriceError::Empty);
        }

        let amount =
            Decimal::from_str(&cleaned).map_err(|_| PriceError::Invalid(s.to_owned()))?;
        Self::new(amount)
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units. Saturates at `Decimal::MAX`.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(
            self.0
                .checked_mul(Decimal::from(quantity))
                .unwrap_or(Decimal::MAX),
        )
    }

    /// Sum of two prices. Saturates at `Decimal::MAX`.
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.checked_add(other.0).unwrap_or(Decimal::MAX))
    }

    /// Format for display, e.g. `45000 ₽`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{} {CURRENCY_SIGN}", self.0.round_dp(2).normalize())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawPrice {
            Text(String),
            Number(serde_json::Number),
        }

        let text = match RawPrice::deserialize(deserializer)? {
            RawPrice::Text(s) => s,
            RawPrice::Number(n) => n.to_string(),
        };
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        assert_eq!(Price::parse("45000").unwrap().amount(), Decimal::from(45000));
    }

    #[test]
    fn test_parse_with_separators_and_sign() {
        let price = Price::parse("12\u{a0}990 ₽").unwrap();
        assert_eq!(price.amount(), Decimal::from(12990));

        let price = Price::parse(" 1 500,50 ").unwrap();
        assert_eq!(price.amount(), Decimal::new(150_050, 2));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(Price::parse(""), Err(PriceError::Empty)));
        assert!(matches!(Price::parse(" ₽"), Err(PriceError::Empty)));
        assert!(matches!(Price::parse("free"), Err(PriceError::Invalid(_))));
        assert!(matches!(Price::parse("-5"), Err(PriceError::Negative(_))));
    }

    #[test]
    fn test_deserialize_string_or_number() {
        let from_text: Price = serde_json::from_str("\"19990\"").unwrap();
        let from_number: Price = serde_json::from_str("19990").unwrap();
        assert_eq!(from_text, from_number);
    }

    #[test]
    fn test_serializes_as_string() {
        let price = Price::parse("19990.00").unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"19990\"");
    }

    #[test]
    fn test_times_and_sum() {
        let a = Price::parse("100").unwrap();
        let b = Price::parse("2.5").unwrap();
        let total: Price = [a.times(3), b.times(2)].into_iter().sum();
        assert_eq!(total.amount(), Decimal::from(305));
    }

    #[test]
    fn test_rejects_prices_above_ceiling() {
        assert_eq!(Price::MAX_AMOUNT, Decimal::from(1_000_000_000_000_u64));
        assert!(Price::parse("1000000000000").is_ok());
        assert!(matches!(
            Price::parse("1000000000001"),
            Err(PriceError::TooLarge(_))
        ));
        assert!(serde_json::from_str::<Price>("\"79228162514264337593543950335\"").is_err());
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_panicking() {
        let huge = Price(Decimal::MAX);
        assert_eq!(huge.times(2).amount(), Decimal::MAX);
        assert_eq!(huge.saturating_add(huge).amount(), Decimal::MAX);

        let total: Price = [huge, huge, Price::ZERO].into_iter().sum();
        assert_eq!(total.amount(), Decimal::MAX);

        let ceiling = Price::new(Price::MAX_AMOUNT).unwrap();
        assert_eq!(
            ceiling.times(u32::MAX).amount(),
            Price::MAX_AMOUNT * Decimal::from(u32::MAX)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::parse("45000").unwrap().display(), "45000 ₽");
    }
}
