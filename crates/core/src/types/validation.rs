//! Field-level validation errors and lenient numeric input.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name as it appears on the wire (e.g. `price`, `customer.phone`).
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every field that failed validation, in the order it was checked.
///
/// Validators collect all problems before returning so that a form can
/// highlight each bad field at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    fields: Vec<FieldError>,
}

impl ValidationErrors {
    /// An empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// A collection holding exactly one error.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    /// Record a rejected field.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push(FieldError::new(field, message));
    }

    /// Returns true if no field has been rejected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Rejected fields.
    #[must_use]
    pub fn fields(&self) -> &[FieldError] {
        &self.fields
    }

    /// Consume into the list of rejected fields.
    #[must_use]
    pub fn into_fields(self) -> Vec<FieldError> {
        self.fields
    }

    /// Returns true if the given field was rejected.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }

    /// `Ok(value)` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field was rejected.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return write!(f, "validation failed");
        }
        for (i, err) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", err.field, err.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// A numeric field that may arrive as a JSON number or as text.
///
/// Forms submit everything as strings, so `"19.99"` and `19.99` must be
/// treated alike. Blank text counts as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    /// A JSON number.
    Number(serde_json::Number),
    /// A string that should hold a number.
    Text(String),
}

impl NumericInput {
    /// Returns true for text that is empty after trimming.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }

    /// Exact decimal value, or `None` if the input is not numeric.
    #[must_use]
    pub fn to_decimal(&self) -> Option<Decimal> {
        let raw = match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.trim().to_owned(),
        };
        if raw.is_empty() {
            return None;
        }
        Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .ok()
    }

    /// Floating point value, or `None` if the input is not a finite number.
    #[must_use]
    pub fn to_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
        }?;
        value.is_finite().then_some(value)
    }

    /// Whole-number value, or `None` if the input has a fractional part.
    #[must_use]
    pub fn to_integer(&self) -> Option<i64> {
        let value = self.to_decimal()?;
        if value.fract().is_zero() {
            value.to_i64()
        } else {
            None
        }
    }
}

impl From<&str> for NumericInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<i64> for NumericInput {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<u32> for NumericInput {
    fn from(n: u32) -> Self {
        Self::Number(n.into())
    }
}

impl From<Decimal> for NumericInput {
    fn from(d: Decimal) -> Self {
        Self::Text(d.normalize().to_string())
    }
}
