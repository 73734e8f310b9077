//! Catalog books and their input drafts.

use serde::{Deserialize, Serialize};

use super::id::BookId;
use super::price::Price;
use super::validation::{NumericInput, ValidationErrors};

/// Highest allowed rating.
pub const MAX_RATING: f64 = 5.0;

/// Largest stock count a book may hold (fits a 32-bit signed column).
pub const MAX_STOCK: i64 = 2_147_483_647;

/// A persisted catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    #[serde(alias = "name")]
    pub author: String,
    pub price: Price,
    pub genre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image: String,
}

impl Book {
    /// Attach a store-assigned id to a validated book.
    #[must_use]
    pub fn from_new(id: BookId, book: NewBook) -> Self {
        Self {
            id,
            title: book.title,
            author: book.author,
            price: book.price,
            genre: book.genre,
            rating: book.rating,
            stock: book.stock,
            description: book.description,
            image: book.image,
        }
    }
}

/// A validated book that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub price: Price,
    pub genre: String,
    pub rating: Option<f64>,
    pub stock: u32,
    pub description: Option<String>,
    pub image: String,
}

/// Raw book input from an admin form or a seed file.
///
/// Every field is optional at this stage so that [`BookDraft::validate`] can
/// report all missing fields together. Numeric fields accept numbers or text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookDraft {
    pub title: Option<String>,
    #[serde(alias = "name")]
    pub author: Option<String>,
    pub price: Option<NumericInput>,
    pub genre: Option<String>,
    pub rating: Option<NumericInput>,
    pub stock: Option<NumericInput>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl BookDraft {
    /// Check every field and coerce numerics.
    ///
    /// # Errors
    ///
    /// Returns every offending field if any check fails.
    pub fn validate(&self) -> Result<NewBook, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = required_text(&mut errors, "title", self.title.as_deref());
        let author = required_text(&mut errors, "author", self.author.as_deref());
        let genre = required_text(&mut errors, "genre", self.genre.as_deref());
        let image = required_text(&mut errors, "image", self.image.as_deref());

        let price = match self.price.as_ref().filter(|p| !p.is_blank()) {
            None => {
                errors.push("price", "is required");
                Price::ZERO
            }
            Some(input) => Price::from_input(input).unwrap_or_else(|e| {
                errors.push("price", e.reason());
                Price::ZERO
            }),
        };

        let stock = match self.stock.as_ref().filter(|s| !s.is_blank()) {
            None => {
                errors.push("stock", "is required");
                0
            }
            Some(input) => match input.to_integer() {
                None => {
                    errors.push("stock", "must be a whole number");
                    0
                }
                Some(n) if n < 0 => {
                    errors.push("stock", "must not be negative");
                    0
                }
                Some(n) if n > MAX_STOCK => {
                    errors.push("stock", "is too large");
                    0
                }
                Some(n) => u32::try_from(n).unwrap_or_default(),
            },
        };

        let rating = match self.rating.as_ref().filter(|r| !r.is_blank()) {
            None => None,
            Some(input) => match input.to_f64() {
                None => {
                    errors.push("rating", "must be a number");
                    None
                }
                Some(r) if !(0.0..=MAX_RATING).contains(&r) => {
                    errors.push("rating", "must be between 0 and 5");
                    None
                }
                Some(r) => Some(r),
            },
        };

        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_owned);

        errors.into_result(NewBook {
            title,
            author,
            price,
            genre,
            rating,
            stock,
            description,
            image,
        })
    }
}

fn required_text(errors: &mut ValidationErrors, field: &str, value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_owned(),
        _ => {
            errors.push(field, "is required");
            String::new()
        }
    }
}
