//! Orders, line items, and checkout validation.
//!
//! An [`OrderDraft`] is the cart snapshot a client submits at checkout. It is
//! validated and priced into a [`NewOrder`]; the store then assigns an id,
//! a `Pending` status and a creation timestamp to produce an [`Order`].

use core::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::{BookId, OrderId};
use super::price::{Price, PriceError};
use super::status::{OrderStatus, UnknownVariant};
use super::validation::{NumericInput, ValidationErrors};

static UPI_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9.\-_]{2,256}@[a-zA-Z]{2,64}$").expect("Invalid regex")
});

/// Largest accepted gap between a client-supplied total and the derived one.
pub const TOTAL_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Required length of a customer phone number.
pub const PHONE_DIGITS: usize = 10;

/// How the customer intends to pay. Recorded as a label, never processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "payment_method"))]
pub enum PaymentMethod {
    #[serde(rename = "Credit Card")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "Credit Card"))]
    CreditCard,
    #[serde(rename = "UPI")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "UPI"))]
    Upi,
    #[serde(rename = "Cash on Delivery")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "Cash on Delivery"))]
    CashOnDelivery,
}

impl PaymentMethod {
    /// Every accepted method.
    pub const ALL: [Self; 3] = [Self::CreditCard, Self::Upi, Self::CashOnDelivery];

    /// Wire label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreditCard => "Credit Card",
            Self::Upi => "UPI",
            Self::CashOnDelivery => "Cash on Delivery",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s.trim())
            .ok_or_else(|| UnknownVariant {
                kind: "payment method",
                value: s.to_owned(),
            })
    }
}

/// Customer contact block as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Validated customer contact block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
}

/// A cart line as submitted at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemDraft {
    pub book_id: BookId,
    #[serde(default)]
    pub title: String,
    pub quantity: NumericInput,
    pub price: NumericInput,
}

impl LineItemDraft {
    /// Build a draft line from already-typed values.
    pub fn new(book_id: BookId, title: impl Into<String>, quantity: u32, price: Price) -> Self {
        Self {
            book_id,
            title: title.into(),
            quantity: quantity.into(),
            price: price.amount().into(),
        }
    }
}

/// A line item snapshot: book fields copied at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub book_id: BookId,
    pub title: String,
    pub quantity: u32,
    pub price: Price,
}

impl LineItem {
    /// Unit price times quantity, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.times(self.quantity)
    }
}

/// Sum of price times quantity over every line, or `None` on overflow.
#[must_use]
pub fn order_total(items: &[LineItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.line_total()?))
}

/// Checkout payload: cart snapshot, customer and payment details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderDraft {
    pub customer: CustomerDraft,
    pub items: Vec<LineItemDraft>,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<NumericInput>,
}

/// A validated, priced order ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer: Customer,
    pub items: Vec<LineItem>,
    pub total: Price,
    pub payment_method: PaymentMethod,
}

impl OrderDraft {
    /// Validate the snapshot and derive the total from its lines.
    ///
    /// # Errors
    ///
    /// Returns every offending field. An empty cart is always rejected.
    pub fn validate(&self) -> Result<NewOrder, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let customer = self.validate_customer(&mut errors);
        let items = self.validate_items(&mut errors);

        let payment_method = match self.payment_method.parse::<PaymentMethod>() {
            Ok(method) => Some(method),
            Err(_) => {
                errors.push(
                    "paymentMethod",
                    "must be one of Credit Card, UPI, Cash on Delivery",
                );
                None
            }
        };

        if payment_method == Some(PaymentMethod::Upi) {
            match self.upi_id.as_deref().map(str::trim) {
                Some(id) if UPI_ID_RE.is_match(id) => {}
                Some(id) if !id.is_empty() => errors.push("upiId", "is not a valid UPI id"),
                _ => errors.push("upiId", "is required for UPI payments"),
            }
        }

        let total = match order_total(&items).map(Price::try_new) {
            Some(Ok(total)) => Some(total),
            _ => {
                errors.push("total", PriceError::TooLarge.reason());
                None
            }
        };

        if let (Some(input), Some(total)) = (self.total.as_ref().filter(|t| !t.is_blank()), total)
        {
            let derived = total.amount();
            match input.to_decimal() {
                None => errors.push("total", "must be a number"),
                Some(claimed)
                    if claimed
                        .checked_sub(derived)
                        .is_none_or(|gap| gap.abs() > TOTAL_TOLERANCE) =>
                {
                    errors.push("total", format!("does not match items (expected {derived:.2})"));
                }
                Some(_) => {}
            }
        }

        match (customer, payment_method, total) {
            (Some(customer), Some(payment_method), Some(total)) if errors.is_empty() => Ok(NewOrder {
                customer,
                items,
                total,
                payment_method,
            }),
            _ => Err(errors),
        }
    }

    fn validate_customer(&self, errors: &mut ValidationErrors) -> Option<Customer> {
        let c = &self.customer;
        let name = c.name.trim();
        let address = c.address.trim();
        let phone = c.phone.trim();

        if name.is_empty() {
            errors.push("customer.name", "is required");
        }

        let email = match Email::parse(&c.email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.push("customer.email", e.to_string());
                None
            }
        };

        if phone.len() != PHONE_DIGITS || !phone.bytes().all(|b| b.is_ascii_digit()) {
            errors.push("customer.phone", "must be exactly 10 digits");
        }

        if address.is_empty() {
            errors.push("customer.address", "is required");
        }

        Some(Customer {
            name: name.to_owned(),
            email: email?,
            phone: phone.to_owned(),
            address: address.to_owned(),
        })
    }

    fn validate_items(&self, errors: &mut ValidationErrors) -> Vec<LineItem> {
        if self.items.is_empty() {
            errors.push("items", "cart is empty");
            return Vec::new();
        }

        let mut items = Vec::with_capacity(self.items.len());
        for (i, draft) in self.items.iter().enumerate() {
            let title = draft.title.trim();
            if title.is_empty() {
                errors.push(format!("items[{i}].title"), "is required");
            }

            let quantity = match draft.quantity.to_integer().map(u32::try_from) {
                Some(Ok(q)) if q >= 1 => q,
                _ => {
                    errors.push(format!("items[{i}].quantity"), "must be a positive whole number");
                    0
                }
            };

            let price = Price::from_input(&draft.price).unwrap_or_else(|e| {
                errors.push(format!("items[{i}].price"), e.reason());
                Price::ZERO
            });

            items.push(LineItem {
                book_id: draft.book_id,
                title: title.to_owned(),
                quantity,
                price,
            });
        }
        items
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer: Customer,
    pub items: Vec<LineItem>,
    pub total: Price,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Attach store-assigned fields to a validated order.
    #[must_use]
    pub fn from_new(id: OrderId, order: NewOrder, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            customer: order.customer,
            items: order.items,
            total: order.total,
            payment_method: order.payment_method,
            status: OrderStatus::Pending,
            created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn customer() -> CustomerDraft {
        CustomerDraft {
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "9876543210".into(),
            address: "12 Analytical Row".into(),
        }
    }

    fn line(id: i32, price: i64, quantity: u32) -> LineItemDraft {
        LineItemDraft::new(
            BookId::new(id),
            format!("Book {id}"),
            quantity,
            Price::try_new(Decimal::from(price)).unwrap(),
        )
    }

    fn draft() -> OrderDraft {
        OrderDraft {
            customer: customer(),
            items: vec![line(1, 100, 2), line(2, 50, 1)],
            payment_method: "Cash on Delivery".into(),
            upi_id: None,
            total: None,
        }
    }

    #[test]
    fn test_total_is_derived_from_lines() {
        let order = draft().validate().unwrap();
        assert_eq!(order.total.amount(), Decimal::from(250));
        assert_eq!(order.payment_method, PaymentMethod::CashOnDelivery);
    }

    #[test]
    fn test_client_total_within_tolerance() {
        let mut d = draft();
        d.total = Some("250.004".into());
        assert!(d.validate().is_ok());

        d.total = Some("249".into());
        assert!(d.validate().unwrap_err().contains("total"));
    }

    #[test]
    fn test_empty_cart_rejected() {
        let mut d = draft();
        d.items.clear();
        assert!(d.validate().unwrap_err().contains("items"));
    }

    #[test]
    fn test_phone_must_be_ten_digits() {
        for bad in ["12345", "98765432101", "98765-4321", ""] {
            let mut d = draft();
            d.customer.phone = bad.into();
            assert!(
                d.validate().unwrap_err().contains("customer.phone"),
                "phone {bad:?} accepted"
            );
        }
    }

    #[test]
    fn test_upi_requires_valid_id() {
        let mut d = draft();
        d.payment_method = "UPI".into();
        assert!(d.validate().unwrap_err().contains("upiId"));

        d.upi_id = Some("not-an-upi".into());
        assert!(d.validate().unwrap_err().contains("upiId"));

        d.upi_id = Some("ada.l@okbank".into());
        assert_eq!(d.validate().unwrap().payment_method, PaymentMethod::Upi);
    }

    #[test]
    fn test_unknown_payment_method() {
        let mut d = draft();
        d.payment_method = "Bitcoin".into();
        assert!(d.validate().unwrap_err().contains("paymentMethod"));
    }

    #[test]
    fn test_bad_lines_reported_by_index() {
        let mut d = draft();
        d.items.push(LineItemDraft {
            book_id: BookId::new(3),
            title: String::new(),
            quantity: 0_i64.into(),
            price: "-4".into(),
        });
        let errors = d.validate().unwrap_err();
        assert!(errors.contains("items[2].title"));
        assert!(errors.contains("items[2].quantity"));
        assert!(errors.contains("items[2].price"));
        assert!(!errors.contains("items[0].price"));
    }

    #[test]
    fn test_overflowing_amounts_are_validation_errors() {
        let mut d = draft();
        d.items[0].price = "79228162514264337593543950335".into();
        d.items[0].quantity = 2_i64.into();
        assert!(d.validate().unwrap_err().contains("items[0].price"));

        let mut d = draft();
        d.total = Some("-79228162514264337593543950335".into());
        assert!(d.validate().unwrap_err().contains("total"));
    }

    #[test]
    fn test_total_beyond_column_range_rejected() {
        let mut d = draft();
        d.items = vec![LineItemDraft {
            book_id: BookId::new(1),
            title: "Atlas".into(),
            quantity: 2_i64.into(),
            price: "9999999999.99".into(),
        }];
        let errors = d.validate().unwrap_err();
        assert!(errors.contains("total"));
        assert!(!errors.contains("items[0].price"));
    }

    #[test]
    fn test_sub_cent_line_prices_rejected() {
        let mut d = draft();
        d.items[0].price = "0.333".into();
        assert!(d.validate().unwrap_err().contains("items[0].price"));
    }

    #[test]
    fn test_draft_from_json() {
        let json = r#"{
            "customer": {"name": "Bo", "email": "BO@Example.com", "phone": "0123456789", "address": "1 Lane"},
            "items": [{"bookId": 4, "title": "Emma", "quantity": "2", "price": "7.50"}],
            "paymentMethod": "Credit Card",
            "total": 15
        }"#;
        let draft: OrderDraft = serde_json::from_str(json).unwrap();
        let order = draft.validate().unwrap();
        assert_eq!(order.customer.email.as_str(), "bo@example.com");
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.total.amount(), Decimal::new(15, 0));
    }

    #[test]
    fn test_payment_method_labels() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap(),
            "\"Cash on Delivery\""
        );
        assert_eq!("UPI".parse::<PaymentMethod>().unwrap(), PaymentMethod::Upi);
    }
}
