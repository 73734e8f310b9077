//! The cart aggregate.
//!
//! A cart is a list of book snapshots with quantities. It is owned by the
//! client and only reaches the server as the line items of an order. Every
//! line has a quantity of at least 1.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bookstore_core::{Book, BookId, LineItemDraft, Price};

/// Whether the cart holds anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartState {
    Empty,
    Populated,
}

/// One cart line: the book as it looked when added, plus a quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "id")]
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub price: Price,
    pub image: String,
    pub quantity: u32,
}

impl CartItem {
    /// A fresh line for `book` with quantity 1.
    #[must_use]
    pub fn from_book(book: &Book) -> Self {
        Self {
            book_id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            price: book.price,
            image: book.image.clone(),
            quantity: 1,
        }
    }

    /// Price times quantity, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.times(self.quantity).unwrap_or(Decimal::MAX)
    }
}

/// The cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn state(&self) -> CartState {
        if self.items.is_empty() {
            CartState::Empty
        } else {
            CartState::Populated
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: BookId) -> bool {
        self.items.iter().any(|item| item.book_id == id)
    }

    #[must_use]
    pub fn get(&self, id: BookId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.book_id == id)
    }

    fn get_mut(&mut self, id: BookId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.book_id == id)
    }

    /// Add one copy of `book`: bump the existing line or append a new one.
    pub fn add(&mut self, book: &Book) {
        match self.get_mut(book.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => self.items.push(CartItem::from_book(book)),
        }
    }

    /// Add `book` only if it is not already in the cart. Returns true if a
    /// line was added.
    pub fn add_if_absent(&mut self, book: &Book) -> bool {
        if self.contains(book.id) {
            return false;
        }
        self.items.push(CartItem::from_book(book));
        true
    }

    /// Returns false if the book is not in the cart.
    pub fn increment(&mut self, id: BookId) -> bool {
        self.get_mut(id).is_some_and(|item| {
            item.quantity = item.quantity.saturating_add(1);
            true
        })
    }

    /// Decrease quantity, stopping at 1. Use [`Cart::remove`] to drop a line.
    pub fn decrement(&mut self, id: BookId) -> bool {
        self.get_mut(id).is_some_and(|item| {
            item.quantity = item.quantity.saturating_sub(1).max(1);
            true
        })
    }

    /// Drop a line whatever its quantity. Returns false if it was not there.
    pub fn remove(&mut self, id: BookId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.book_id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replace the whole cart, e.g. after bulk edits in a UI.
    ///
    /// Zero quantities are raised to 1 and repeated books are merged.
    pub fn replace_items(&mut self, items: Vec<CartItem>) {
        self.items.clear();
        for mut item in items {
            item.quantity = item.quantity.max(1);
            match self.get_mut(item.book_id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => self.items.push(item),
            }
        }
    }

    /// Sum of price times quantity, saturating at `Decimal::MAX`. A
    /// saturated subtotal fails checkout validation.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .fold(Decimal::ZERO, |sum, item| sum.saturating_add(item.line_total()))
    }

    /// Total number of copies across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Order line items for checkout.
    #[must_use]
    pub fn to_line_items(&self) -> Vec<LineItemDraft> {
        self.items
            .iter()
            .map(|item| {
                LineItemDraft::new(item.book_id, item.title.clone(), item.quantity, item.price)
            })
            .collect()
    }
}
