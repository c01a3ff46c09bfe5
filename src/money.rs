//! Fixed-point money values.
//!
//! Amounts are held as integer cents so that arithmetic is exact, and are
//! exchanged with clients as decimal numbers with two fraction digits. Values
//! read from JSON go through serde_json's arbitrary precision numbers and
//! [rust_decimal], never through `f64`.

use std::fmt::Display;

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// The number of fraction digits used for money.
pub const MONEY_SCALE: u32 = 2;

/// Errors that occur when converting a decimal number into [Money].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    /// The number has more than two significant fraction digits.
    #[error("amounts must not have more than two decimal places")]
    TooPrecise,

    /// The number does not fit in the range of representable amounts.
    #[error("amount is out of range")]
    OutOfRange,
}

/// An exact amount of money with a granularity of one cent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Zero dollars and zero cents.
    pub const ZERO: Money = Money(0);

    /// Create an amount from a number of cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Convert a decimal number into money.
    ///
    /// Trailing zeros are ignored, so `12.500` is accepted as `12.50`.
    ///
    /// # Errors
    ///
    /// Returns [MoneyError::TooPrecise] if `amount` has more than two
    /// significant fraction digits, or [MoneyError::OutOfRange] if it cannot
    /// be represented as a whole number of cents.
    pub fn from_decimal(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.normalize().scale() > MONEY_SCALE {
            return Err(MoneyError::TooPrecise);
        }

        amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Self)
            .ok_or(MoneyError::OutOfRange)
    }

    /// The amount as a number of cents.
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// The amount as a decimal number with exactly two fraction digits.
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, MONEY_SCALE)
    }

    /// Whether the amount is strictly greater than zero.
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Add two amounts, returning `None` on overflow.
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.to_decimal().fmt(f)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        rust_decimal::serde::arbitrary_precision::serialize(&self.to_decimal(), serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let amount = rust_decimal::serde::arbitrary_precision::deserialize(deserializer)?;

        Money::from_decimal(amount).map_err(de::Error::custom)
    }
}

impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self)
    }
}

/// A decimal number as sent by a client, before it has been checked to be a
/// valid amount of [Money].
///
/// Keeping the raw value lets request handlers report precision and range
/// problems against the field that caused them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalInput(pub Decimal);

impl<'de> Deserialize<'de> for DecimalInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        rust_decimal::serde::arbitrary_precision::deserialize(deserializer).map(Self)
    }
}


#[cfg(test)]
mod serde_tests {
    use serde_json::json;

    use super::{DecimalInput, Money};

    #[test]
    fn serializes_as_number_with_two_fraction_digits() {
        let text = serde_json::to_string(&Money::from_cents(80_000)).unwrap();

        assert_eq!(text, "800.00");
    }

    #[test]
    fn deserializes_numbers_without_losing_precision() {
        // Too many significant digits for an f64.
        let money: Money = serde_json::from_str("92233720368547758.07").unwrap();

        assert_eq!(money, Money::from_cents(i64::MAX));
    }

    #[test]
    fn deserializes_integers_and_strings() {
        let from_integer: Money = serde_json::from_value(json!(1000)).unwrap();
        let from_string: Money = serde_json::from_value(json!("12.50")).unwrap();

        assert_eq!(from_integer, Money::from_cents(100_000));
        assert_eq!(from_string, Money::from_cents(1250));
    }

    #[test]
    fn decimal_input_keeps_extra_precision_for_validation() {
        let input: DecimalInput = serde_json::from_str("12.345").unwrap();

        assert_eq!(input.0.to_string(), "12.345");
    }
}
