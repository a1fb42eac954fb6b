//! Decimal monetary amount.
//!
//! Transaction sources carry amounts as JSON numbers or CSV cells. Both are
//! converted into `rust_decimal` at full precision so sums and averages don't
//! accumulate floating-point error. Rounding to 4 places happens only when an
//! amount is displayed.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A signed transaction amount.
///
/// No currency is attached; amounts from different currencies are summed
/// as plain numbers. Values must fit `Decimal` (about ±7.9e28); larger
/// source values are rejected on load.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use transaction_analyzer::Amount;
///
/// let amount = Amount::from_str("10.5").unwrap();
/// assert_eq!(amount.to_string(), "10.5000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// Decimal places shown by `Display`.
    pub const DISPLAY_SCALE: usize = 4;

    /// Zero value.
    pub const ZERO: Self = Amount(Decimal::ZERO);

    /// Adds two amounts. `None` if the result leaves the `Decimal` range.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Sums amounts, stopping at the first overflow.
    pub fn checked_sum<I>(amounts: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |acc, amount| acc.checked_add(amount))
    }

    /// Divides by a record count. `None` when `count` is zero.
    pub fn divide_by_count(self, count: usize) -> Option<Self> {
        if count == 0 {
            return None;
        }
        self.0.checked_div(Decimal::from(count)).map(Amount)
    }

    /// The amount as a float, for serialization into JSON numbers.
    pub fn to_f64(&self) -> Option<f64> {
        self.0.to_f64()
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount(Decimal::from(value))
    }
}

impl TryFrom<f64> for Amount {
    type Error = rust_decimal::Error;

    /// Converts through the float's shortest decimal form, so `0.1` becomes
    /// exactly `0.1`.
    fn try_from(value: f64) -> std::result::Result<Self, Self::Error> {
        Decimal::from_str(&value.to_string())
            .ok()
            .or_else(|| Decimal::from_f64(value))
            .map(Amount)
            .ok_or(rust_decimal::Error::ConversionTo("Decimal".to_string()))
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*}", Self::DISPLAY_SCALE, self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.to_f64() {
            Some(value) => serializer.serialize_f64(value),
            None => serializer.serialize_str(&self.0.to_string()),
        }
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Amount, E> {
        Ok(Amount::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Amount, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Amount, E> {
        Amount::try_from(v).map_err(|_| E::custom(format!("amount {v} is out of range")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Amount, E> {
        Amount::from_str(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rounds_to_four_places() {
        let a = Amount::from_str("1.0").unwrap();
        assert_eq!(a.to_string(), "1.0000");

        let a = Amount::from_str("  2.5  ").unwrap();
        assert_eq!(a.to_string(), "2.5000");

        let a = Amount::from_str("0.123456").unwrap();
        assert_eq!(a.to_string(), "0.1235");
    }

    #[test]
    fn test_full_precision_is_kept() {
        let precise = Amount::from_str("0.123456").unwrap();
        assert_ne!(precise, Amount::from_str("0.1235").unwrap());

        let tiny = Amount::from_str("0.00004").unwrap();
        assert!(tiny > Amount::ZERO);
        assert_eq!(tiny.to_string(), "0.0000");
    }

    #[test]
    fn test_checked_sum_with_negative_values() {
        let amounts = [
            Amount::from(100),
            Amount::from_str("-30.25").unwrap(),
            Amount::from_str("0.25").unwrap(),
        ];

        assert_eq!(Amount::checked_sum(amounts), Some(Amount::from(70)));
        assert_eq!(Amount::checked_sum([]), Some(Amount::ZERO));
    }

    #[test]
    fn test_checked_sum_overflow() {
        let big = Amount(Decimal::MAX);
        assert_eq!(big.checked_add(Amount::from(1)), None);
        assert_eq!(Amount::checked_sum([big, big]), None);
    }

    #[test]
    fn test_divide_by_count() {
        let total = Amount::from(350);
        let average = total.divide_by_count(3).unwrap();
        assert_eq!(average.to_string(), "116.6667");
        assert_ne!(average, Amount::from_str("116.6667").unwrap());
        assert_eq!(total.divide_by_count(0), None);
    }

    #[test]
    fn test_deserialize_json_number_and_string() {
        let a: Amount = serde_json::from_str("1245.39").unwrap();
        assert_eq!(a, Amount::from_str("1245.39").unwrap());

        let a: Amount = serde_json::from_str("0.1").unwrap();
        assert_eq!(a, Amount::from_str("0.1").unwrap());

        let a: Amount = serde_json::from_str("-12").unwrap();
        assert_eq!(a, Amount::from(-12));

        let a: Amount = serde_json::from_str("\"7.5\"").unwrap();
        assert_eq!(a.to_string(), "7.5000");

        assert!(serde_json::from_str::<Amount>("\"seven\"").is_err());
        assert!(serde_json::from_str::<Amount>("true").is_err());
    }

    #[test]
    fn test_deserialize_out_of_range() {
        assert!(serde_json::from_str::<Amount>("5e28").is_ok());
        assert!(serde_json::from_str::<Amount>("1e30").is_err());
    }

    #[test]
    fn test_serializes_as_json_number() {
        let a = Amount::from_str("42.5").unwrap();
        assert_eq!(serde_json::to_string(&a).unwrap(), "42.5");
    }
}
