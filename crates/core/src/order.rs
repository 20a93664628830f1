//! Order records.
//!
//! An order is written once at checkout together with its items. Items copy
//! the product's title and unit price at that moment, so later catalog edits
//! or deletions never change a historical order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::MAX_LINE_QUANTITY;

use crate::types::{OrderId, OrderItemId, OrderStatus, Price, ProductId};

/// Validation failure for a submitted form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// One or more required fields were blank.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// An optional email address was given but is malformed.
    #[error("invalid email address: {0}")]
    InvalidEmail(#[from] crate::types::EmailError),
}

/// Raw checkout form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub note: String,
}

/// Validated delivery details for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub note: Option<String>,
}

impl CustomerInfo {
    /// Trim and validate checkout input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] naming every blank
    /// required field (`name`, `phone`, `address`).
    pub fn parse(form: &CheckoutForm) -> Result<Self, ValidationError> {
        let name = form.name.trim();
        let phone = form.phone.trim();
        let address = form.address.trim();

        let missing: Vec<&'static str> = [("name", name), ("phone", phone), ("address", address)]
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(field, _)| field)
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let note = form.note.trim();
        Ok(Self {
            name: name.to_owned(),
            phone: phone.to_owned(),
            address: address.to_owned(),
            note: (!note.is_empty()).then(|| note.to_owned()),
        })
    }
}

/// One line of an order about to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Price,
    pub title_snapshot: String,
}

impl NewOrderItem {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// An order header plus items, ready to be persisted in one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer: CustomerInfo,
    pub items: Vec<NewOrderItem>,
    /// Always the sum of the item subtotals.
    pub total: Price,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
}

/// Largest order total in cents; totals are stored as `NUMERIC(10,2)`.
pub const MAX_ORDER_TOTAL_CENTS: i64 = 9_999_999_999;

impl NewOrder {
    /// Whether every line quantity and the total fit what an order can
    /// store.
    #[must_use]
    pub fn within_limits(&self) -> bool {
        self.total.amount() <= Decimal::new(MAX_ORDER_TOTAL_CENTS, 2)
            && self.items.iter().all(|item| item.quantity <= MAX_LINE_QUANTITY)
    }

    /// Build an order whose total is derived from `items`.
    #[must_use]
    pub fn new(customer: CustomerInfo, items: Vec<NewOrderItem>, placed_at: DateTime<Utc>) -> Self {
        let total = items.iter().map(NewOrderItem::subtotal).sum();
        Self {
            customer,
            items,
            total,
            status: OrderStatus::Pending,
            placed_at,
        }
    }
}

/// A persisted order header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub note: Option<String>,
    pub total_price: Price,
    /// Free text in storage; see [`OrderStatus`] for the values the shop writes.
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// A persisted order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Price,
    pub title_snapshot: String,
}

impl OrderItem {
    /// `unit_price × quantity`; negative quantities never occur but count as 0.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price
            .times(u32::try_from(self.quantity).unwrap_or(0))
    }
}

/// An order with all of its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// An order row for the admin list, with its lines flattened into one
/// string such as `"Abetare x2 | Leximi 3 x1"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order: Order,
    pub items_summary: String,
}

/// Format the admin item summary for a set of lines.
#[must_use]
pub fn summarize_items<'a>(items: impl IntoIterator<Item = (&'a str, i64)>) -> String {
    items
        .into_iter()
        .map(|(title, quantity)| format!("{title} x{quantity}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn form(name: &str, phone: &str, address: &str, note: &str) -> CheckoutForm {
        CheckoutForm {
            name: name.to_owned(),
            phone: phone.to_owned(),
            address: address.to_owned(),
            note: note.to_owned(),
        }
    }

    #[test]
    fn test_customer_info_trims_and_drops_blank_note() {
        let info = CustomerInfo::parse(&form(" Arta ", "044 123 456", "Rr. Nëna Terezë 5", "  "))
            .unwrap();
        assert_eq!(info.name, "Arta");
        assert_eq!(info.note, None);
    }

    #[test]
    fn test_customer_info_names_every_missing_field() {
        let err = CustomerInfo::parse(&form("  ", "", "Prishtinë", "")).unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["name", "phone"]));
        assert_eq!(err.to_string(), "missing required fields: name, phone");
    }

    #[test]
    fn test_new_order_total_is_sum_of_subtotals() {
        let customer = CustomerInfo::parse(&form("Arta", "044", "Prishtinë", "")).unwrap();
        let order = NewOrder::new(
            customer,
            vec![
                NewOrderItem {
                    product_id: ProductId::new(2),
                    quantity: 3,
                    unit_price: Price::new(Decimal::new(650, 2)),
                    title_snapshot: "Matematikë 2".to_owned(),
                },
                NewOrderItem {
                    product_id: ProductId::new(1),
                    quantity: 1,
                    unit_price: Price::new(Decimal::new(450, 2)),
                    title_snapshot: "Abetare".to_owned(),
                },
            ],
            Utc::now(),
        );
        assert_eq!(order.total.amount(), Decimal::new(2400, 2));
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_summarize_items() {
        assert_eq!(
            summarize_items([("Abetare", 2), ("Leximi 3", 1)]),
            "Abetare x2 | Leximi 3 x1"
        );
        assert_eq!(summarize_items(std::iter::empty()), "");
    }
}
