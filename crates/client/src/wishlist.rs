//! Saved-for-later books. Set semantics keyed by book id.

use serde::{Deserialize, Serialize};

use bookstore_core::{Book, BookId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist {
    books: Vec<Book>,
}

impl Wishlist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: BookId) -> bool {
        self.books.iter().any(|b| b.id == id)
    }

    /// Returns false if the book was already saved.
    pub fn add(&mut self, book: &Book) -> bool {
        if self.contains(book.id) {
            return false;
        }
        self.books.push(book.clone());
        true
    }

    /// Returns false if the book was not saved.
    pub fn remove(&mut self, id: BookId) -> bool {
        let before = self.books.len();
        self.books.retain(|b| b.id != id);
        self.books.len() != before
    }

    /// Add if absent, remove if present. Returns whether it is now saved.
    pub fn toggle(&mut self, book: &Book) -> bool {
        if self.remove(book.id) {
            false
        } else {
            self.books.push(book.clone());
            true
        }
    }
}
