//! The client-side session: who is logged in, their cart and their wishlist.
//!
//! Every mutation is written through to the [`LocalStore`] before returning,
//! so a reload picks up exactly where the user left off. Logging out wipes
//! the auth document and the cart; the wishlist stays.

use serde::Serialize;
use serde::de::DeserializeOwned;

use bookstore_core::{
    AuthResponse, Book, BookId, CustomerDraft, OrderDraft, PaymentMethod, UserProfile,
};

use crate::cart::{Cart, CartItem};
use crate::error::ClientError;
use crate::storage::LocalStore;
use crate::wishlist::Wishlist;

const USER_KEY: &str = "user";
const CART_KEY: &str = "cartItems";
const WISHLIST_KEY: &str = "wishlist";

/// Customer and payment details entered at checkout.
#[derive(Debug, Clone)]
pub struct CheckoutDetails {
    pub customer: CustomerDraft,
    pub payment_method: PaymentMethod,
    pub upi_id: Option<String>,
}

/// Auth, cart and wishlist for one user of one device.
pub struct ClientSession<S: LocalStore> {
    store: S,
    auth: Option<AuthResponse>,
    cart: Cart,
    wishlist: Wishlist,
}

impl<S: LocalStore> ClientSession<S> {
    /// Restore a session from `store`.
    ///
    /// Documents that fail to parse are discarded with a warning, leaving
    /// that part of the session empty.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Io` if the store cannot be read.
    pub fn open(store: S) -> Result<Self, ClientError> {
        let auth = load(&store, USER_KEY)?;
        let cart = load(&store, CART_KEY)?.unwrap_or_default();
        let wishlist = load(&store, WISHLIST_KEY)?.unwrap_or_default();

        Ok(Self {
            store,
            auth,
            cart,
            wishlist,
        })
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.auth.as_ref().map(|a| &a.user)
    }

    /// Session token for the `x-auth-token` header.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.auth.as_ref().map(|a| a.token.as_str())
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(|u| u.is_admin)
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn wishlist(&self) -> &Wishlist {
        &self.wishlist
    }

    /// Remember a signup or login response.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be persisted.
    pub fn sign_in(&mut self, auth: AuthResponse) -> Result<(), ClientError> {
        save(&self.store, USER_KEY, &auth)?;
        tracing::debug!(user_id = %auth.user.id, "signed in");
        self.auth = Some(auth);
        Ok(())
    }

    /// Forget the user and empty the cart. The wishlist is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be updated.
    pub fn logout(&mut self) -> Result<(), ClientError> {
        // Cart first: a failure between the two removals leaves the user
        // signed in with an empty cart, which is still a consistent state.
        self.store.remove(CART_KEY)?;
        self.cart.clear();
        self.store.remove(USER_KEY)?;
        self.auth = None;
        tracing::debug!("logged out");
        Ok(())
    }

    /// Add one copy of `book` to the cart.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthenticated` without touching the cart if
    /// nobody is logged in.
    pub fn add_to_cart(&mut self, book: &Book) -> Result<(), ClientError> {
        self.require_auth()?;
        self.update_cart(|cart| cart.add(book))
    }

    /// Put `book` in the cart for immediate checkout, without changing the
    /// quantity if it is already there. `Ok` means checkout may proceed;
    /// the flag says whether a line was added.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unauthenticated` if nobody is logged in.
    pub fn buy_now(&mut self, book: &Book) -> Result<bool, ClientError> {
        self.require_auth()?;
        if self.cart.contains(book.id) {
            return Ok(false);
        }
        self.update_cart(|cart| cart.add_if_absent(book))
    }

    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn increment(&mut self, id: BookId) -> Result<bool, ClientError> {
        self.update_cart(|cart| cart.increment(id))
    }

    /// Quantity never drops below 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn decrement(&mut self, id: BookId) -> Result<bool, ClientError> {
        self.update_cart(|cart| cart.decrement(id))
    }

    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn remove_from_cart(&mut self, id: BookId) -> Result<bool, ClientError> {
        self.update_cart(|cart| cart.remove(id))
    }

    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn replace_cart(&mut self, items: Vec<CartItem>) -> Result<(), ClientError> {
        self.update_cart(|cart| cart.replace_items(items))
    }

    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn clear_cart(&mut self) -> Result<(), ClientError> {
        self.update_cart(Cart::clear)
    }

    /// Toggle a wishlist entry. Returns whether the book is now saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the wishlist cannot be persisted.
    pub fn toggle_wishlist(&mut self, book: &Book) -> Result<bool, ClientError> {
        self.update_wishlist(|wishlist| wishlist.toggle(book))
    }

    /// Returns false if the book was already saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the wishlist cannot be persisted.
    pub fn add_to_wishlist(&mut self, book: &Book) -> Result<bool, ClientError> {
        self.update_wishlist(|wishlist| wishlist.add(book))
    }

    /// # Errors
    ///
    /// Returns an error if the wishlist cannot be persisted.
    pub fn remove_from_wishlist(&mut self, id: BookId) -> Result<bool, ClientError> {
        self.update_wishlist(|wishlist| wishlist.remove(id))
    }

    /// Build the order for the current cart and check it with the same rules
    /// the server applies. The cart is not modified.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` listing every problem, including an
    /// empty cart.
    pub fn checkout_draft(&self, details: &CheckoutDetails) -> Result<OrderDraft, ClientError> {
        let draft = OrderDraft {
            customer: details.customer.clone(),
            items: self.cart.to_line_items(),
            payment_method: details.payment_method.as_str().to_owned(),
            upi_id: details.upi_id.clone(),
            total: Some(self.cart.subtotal().into()),
        };
        draft.validate()?;
        Ok(draft)
    }

    /// Empty the cart once the server has acknowledged the order.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn order_acknowledged(&mut self) -> Result<(), ClientError> {
        self.clear_cart()
    }

    fn require_auth(&self) -> Result<(), ClientError> {
        if self.auth.is_none() {
            return Err(ClientError::Unauthenticated);
        }
        Ok(())
    }

    /// Apply `change` to a copy of the cart and keep it only once it is
    /// persisted.
    fn update_cart<R>(&mut self, change: impl FnOnce(&mut Cart) -> R) -> Result<R, ClientError> {
        let mut cart = self.cart.clone();
        let outcome = change(&mut cart);
        save(&self.store, CART_KEY, &cart)?;
        self.cart = cart;
        Ok(outcome)
    }

    fn update_wishlist<R>(
        &mut self,
        change: impl FnOnce(&mut Wishlist) -> R,
    ) -> Result<R, ClientError> {
        let mut wishlist = self.wishlist.clone();
        let outcome = change(&mut wishlist);
        save(&self.store, WISHLIST_KEY, &wishlist)?;
        self.wishlist = wishlist;
        Ok(outcome)
    }
}

fn load<T: DeserializeOwned>(store: &impl LocalStore, key: &str) -> Result<Option<T>, ClientError> {
    let Some(doc) = store.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_str(&doc) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding unreadable local document");
            Ok(None)
        }
    }
}

fn save<T: Serialize>(store: &impl LocalStore, key: &str, value: &T) -> Result<(), ClientError> {
    store.set(key, &serde_json::to_string(value)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use bookstore_core::{Email, Role, UserId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::cart::tests::book;
    use crate::storage::MemoryStore;

    fn auth() -> AuthResponse {
        AuthResponse {
            token: "token".to_owned(),
            user: UserProfile::new(
                UserId::new(1),
                "Reader".to_owned(),
                Email::parse("reader@example.com").unwrap(),
                Role::User,
            ),
        }
    }

    /// Memory store whose writes to the listed keys fail.
    #[derive(Default)]
    struct FailingStore {
        inner: MemoryStore,
        broken: Mutex<Vec<&'static str>>,
    }

    impl FailingStore {
        fn break_key(&self, key: &'static str) {
            self.broken.lock().unwrap().push(key);
        }

        fn check(&self, key: &str) -> Result<(), ClientError> {
            if self.broken.lock().unwrap().iter().any(|broken| *broken == key) {
                return Err(std::io::Error::other("disk full").into());
            }
            Ok(())
        }
    }

    impl LocalStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
            self.check(key)?;
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), ClientError> {
            self.check(key)?;
            self.inner.remove(key)
        }
    }

    fn details() -> CheckoutDetails {
        CheckoutDetails {
            customer: CustomerDraft {
                name: "Asha".to_owned(),
                email: "asha@example.com".to_owned(),
                phone: "9876543210".to_owned(),
                address: "12 MG Road".to_owned(),
            },
            payment_method: PaymentMethod::CashOnDelivery,
            upi_id: None,
        }
    }

    #[test]
    fn test_add_requires_login() {
        let mut session = ClientSession::open(MemoryStore::new()).unwrap();

        let err = session.add_to_cart(&book(1, 100)).unwrap_err();
        assert!(matches!(err, ClientError::Unauthenticated));
        assert!(session.cart().is_empty());
        assert!(matches!(
            session.buy_now(&book(1, 100)),
            Err(ClientError::Unauthenticated)
        ));
    }

    #[test]
    fn test_state_survives_reopen() {
        let store = Arc::new(MemoryStore::new());
        {
            let mut session = ClientSession::open(Arc::clone(&store)).unwrap();
            session.sign_in(auth()).unwrap();
            session.add_to_cart(&book(1, 100)).unwrap();
            session.add_to_cart(&book(1, 100)).unwrap();
            session.toggle_wishlist(&book(2, 50)).unwrap();
        }

        let session = ClientSession::open(store).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.cart().item_count(), 2);
        assert!(session.wishlist().contains(BookId::new(2)));
    }

    #[test]
    fn test_logout_wipes_cart_keeps_wishlist() {
        let store = Arc::new(MemoryStore::new());
        let mut session = ClientSession::open(Arc::clone(&store)).unwrap();
        session.sign_in(auth()).unwrap();
        session.add_to_cart(&book(1, 100)).unwrap();
        session.add_to_wishlist(&book(2, 50)).unwrap();

        session.logout().unwrap();
        assert!(!session.is_authenticated());
        assert!(session.cart().is_empty());

        let reopened = ClientSession::open(store).unwrap();
        assert!(reopened.token().is_none());
        assert!(reopened.cart().is_empty());
        assert_eq!(reopened.wishlist().len(), 1);
    }

    #[test]
    fn test_corrupt_cart_is_discarded() {
        let store = MemoryStore::new();
        store.set(CART_KEY, "{not json").unwrap();

        let session = ClientSession::open(store).unwrap();
        assert!(session.cart().is_empty());
    }

    #[test]
    fn test_buy_now_does_not_bump_quantity() {
        let mut session = ClientSession::open(MemoryStore::new()).unwrap();
        session.sign_in(auth()).unwrap();

        assert!(session.buy_now(&book(1, 100)).unwrap());
        assert!(!session.buy_now(&book(1, 100)).unwrap());
        assert_eq!(session.cart().item_count(), 1);
    }

    #[test]
    fn test_checkout_draft_prices_cart() {
        let mut session = ClientSession::open(MemoryStore::new()).unwrap();
        session.sign_in(auth()).unwrap();
        session.add_to_cart(&book(1, 100)).unwrap();
        session.add_to_cart(&book(1, 100)).unwrap();
        session.add_to_cart(&book(2, 50)).unwrap();

        let draft = session.checkout_draft(&details()).unwrap();
        assert_eq!(draft.items.len(), 2);
        assert_eq!(draft.validate().unwrap().total.amount(), Decimal::from(250));
        // Building the draft leaves the cart alone
        assert_eq!(session.cart().item_count(), 3);
    }

    #[test]
    fn test_checkout_draft_rejects_empty_cart() {
        let session = ClientSession::open(MemoryStore::new()).unwrap();
        let err = session.checkout_draft(&details()).unwrap_err();
        let ClientError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert!(errors.contains("items"));
    }

    #[test]
    fn test_failed_write_leaves_session_unchanged() {
        let store = Arc::new(FailingStore::default());
        let mut session = ClientSession::open(Arc::clone(&store)).unwrap();
        session.sign_in(auth()).unwrap();
        session.add_to_cart(&book(1, 100)).unwrap();

        store.break_key(CART_KEY);
        store.break_key(WISHLIST_KEY);

        assert!(session.increment(BookId::new(1)).is_err());
        assert!(session.add_to_cart(&book(2, 50)).is_err());
        assert!(session.remove_from_cart(BookId::new(1)).is_err());
        assert!(session.toggle_wishlist(&book(3, 10)).is_err());

        assert_eq!(session.cart().item_count(), 1);
        assert!(session.wishlist().is_empty());

        let reopened = ClientSession::open(Arc::clone(&store)).unwrap();
        assert_eq!(reopened.cart(), session.cart());
    }

    #[test]
    fn test_interrupted_logout_stays_consistent() {
        let store = Arc::new(FailingStore::default());
        let mut session = ClientSession::open(Arc::clone(&store)).unwrap();
        session.sign_in(auth()).unwrap();
        session.add_to_cart(&book(1, 100)).unwrap();

        store.break_key(USER_KEY);
        assert!(session.logout().is_err());

        let reopened = ClientSession::open(Arc::clone(&store)).unwrap();
        assert_eq!(session.is_authenticated(), reopened.is_authenticated());
        assert_eq!(session.cart(), reopened.cart());
        assert!(session.is_authenticated());
        assert!(session.cart().is_empty());
    }
}
