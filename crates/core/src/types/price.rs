//! Non-negative money amounts using decimal arithmetic.
//!
//! Amounts are exact decimals internally and travel as plain JSON numbers on
//! the wire. Deserialization also accepts numeric strings, since form input
//! arrives as text.

use core::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::validation::NumericInput;

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price must not be negative")]
    Negative,
    /// The input could not be read as a number.
    #[error("price must be a number")]
    NotANumber,
    /// More than two decimal places.
    #[error("price must have at most 2 decimal places")]
    TooPrecise,
    /// Above [`Price::MAX`].
    #[error("price must not exceed 9999999999.99")]
    TooLarge,
}

impl PriceError {
    /// Short reason for a field-level validation message.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Negative => "must not be negative",
            Self::NotANumber => "must be a number",
            Self::TooPrecise => "must have at most 2 decimal places",
            Self::TooLarge => "must not exceed 9999999999.99",
        }
    }
}

/// A non-negative amount of money.
///
/// Amounts are limited to what a `NUMERIC(12, 2)` column holds, so every
/// backend stores exactly what was validated.
///
/// ```
/// use bookstore_core::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::try_new(Decimal::new(1999, 2)).unwrap();
/// assert_eq!(price.to_string(), "19.99");
/// assert!(Price::try_new(Decimal::new(-1, 0)).is_err());
/// assert!(Price::try_new(Decimal::new(3333, 4)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest accepted amount, `9999999999.99`.
    pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

    /// Decimal places kept by storage.
    pub const SCALE: u32 = 2;

    /// Create a price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount < 0`, `TooPrecise` for more
    /// than two decimal places and `TooLarge` above [`Price::MAX_AMOUNT`].
    pub fn try_new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        if amount.normalize().scale() > Self::SCALE {
            return Err(PriceError::TooPrecise);
        }
        if amount > Self::MAX_AMOUNT {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(amount))
    }

    /// Parse a price from lenient numeric input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not numeric or is negative.
    pub fn from_input(input: &NumericInput) -> Result<Self, PriceError> {
        let amount = input.to_decimal().ok_or(PriceError::NotANumber)?;
        Self::try_new(amount)
    }

    /// The exact amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Amount multiplied by a quantity, or `None` on overflow.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Option<Decimal> {
        self.0.checked_mul(Decimal::from(quantity))
    }

    /// Approximate floating point value, for display and JSON.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::try_new(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let input = NumericInput::deserialize(deserializer)?;
        Self::from_input(&input).map_err(serde::de::Error::custom)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::try_new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_valid() {
        assert_eq!(Price::try_new(Decimal::ZERO).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_negative_rejected() {
        assert_eq!(
            Price::try_new(Decimal::new(-1, 2)),
            Err(PriceError::Negative)
        );
    }

    #[test]
    fn test_serializes_as_number() {
        let price = Price::try_new(Decimal::new(1999, 2)).unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "19.99");
    }

    #[test]
    fn test_deserializes_from_string_or_number() {
        let from_text: Price = serde_json::from_str("\"12.50\"").unwrap();
        let from_number: Price = serde_json::from_str("12.5").unwrap();
        assert_eq!(from_text, from_number);
        assert!(serde_json::from_str::<Price>("-3").is_err());
        assert!(serde_json::from_str::<Price>("\"abc\"").is_err());
    }

    #[test]
    fn test_times_quantity() {
        let price = Price::try_new(Decimal::new(50, 0)).unwrap();
        assert_eq!(price.times(3), Some(Decimal::new(150, 0)));
    }

    #[test]
    fn test_column_limits() {
        assert!(Price::try_new(Price::MAX_AMOUNT).is_ok());
        assert_eq!(
            Price::try_new(Price::MAX_AMOUNT + Decimal::new(1, 2)),
            Err(PriceError::TooLarge)
        );
        assert_eq!(
            Price::try_new(Decimal::new(333, 3)),
            Err(PriceError::TooPrecise)
        );
        // Trailing zeros are not extra precision
        assert!(Price::try_new(Decimal::new(12_500, 3)).is_ok());
    }

    #[test]
    fn test_huge_input_rejected_not_panicking() {
        let input = NumericInput::from("79228162514264337593543950335");
        assert_eq!(Price::from_input(&input), Err(PriceError::TooLarge));
        let max = Price::try_new(Price::MAX_AMOUNT).unwrap();
        assert!(max.times(u32::MAX).is_some());
    }
}
