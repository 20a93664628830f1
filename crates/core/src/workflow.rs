//! Checkout, contact and order administration.
//!
//! [`OrderWorkflow`] ties the catalog, the order and message stores, and the
//! operator notifier together. It owns no state of its own: the caller
//! passes the visitor's [`Cart`] in and persists it again afterwards.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::cart::Cart;
use crate::catalog::{CatalogStore, ProductSnapshot};
use crate::contact::{ContactForm, NewContactMessage};
use crate::notification::{Notification, Notifier};
use crate::order::{
    CheckoutForm, CustomerInfo, NewOrder, NewOrderItem, OrderSummary, OrderWithItems,
    ValidationError,
};
use crate::store::{MessageStore, OrderStore, StoreError};
use crate::types::{ContactMessageId, OrderId, OrderStatus, Price, ProductId};

/// What checkout does with a cart line whose product has been deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingProductPolicy {
    /// Refuse the whole order and leave the cart as it is.
    #[default]
    Reject,
    /// Record the line with a zero price and an empty title.
    Snapshot,
}

impl MissingProductPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for MissingProductPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`MissingProductPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown missing-product policy '{0}', expected 'reject' or 'snapshot'")]
pub struct UnknownPolicy(pub String);

impl FromStr for MissingProductPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "snapshot" => Ok(Self::Snapshot),
            _ => Err(UnknownPolicy(s.to_owned())),
        }
    }
}

/// Why checkout did not produce an order.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Products in the cart no longer exist in the catalog.
    #[error("products no longer available: {0:?}")]
    ProductsNotFound(Vec<ProductId>),

    /// A line quantity or the total is larger than an order can hold.
    #[error("order exceeds the allowed quantity or total")]
    OrderTooLarge,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Why a contact message was not stored.
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The shop's write-side operations.
pub struct OrderWorkflow<'a, C, O, M, N> {
    catalog: &'a C,
    orders: &'a O,
    messages: &'a M,
    notifier: &'a N,
    missing_products: MissingProductPolicy,
}

impl<'a, C, O, M, N> OrderWorkflow<'a, C, O, M, N>
where
    C: CatalogStore,
    O: OrderStore,
    M: MessageStore,
    N: Notifier,
{
    pub const fn new(
        catalog: &'a C,
        orders: &'a O,
        messages: &'a M,
        notifier: &'a N,
        missing_products: MissingProductPolicy,
    ) -> Self {
        Self {
            catalog,
            orders,
            messages,
            notifier,
            missing_products,
        }
    }

    /// Turn the cart into a `PENDING` order.
    ///
    /// Nothing is written and the cart is left alone unless the order is
    /// stored. On success the cart is cleared, then the operator is notified
    /// on a best-effort basis.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`] if the cart has no lines.
    /// - [`CheckoutError::Validation`] if name, phone or address is blank.
    /// - [`CheckoutError::ProductsNotFound`] if a product was deleted and the
    ///   policy is [`MissingProductPolicy::Reject`].
    /// - [`CheckoutError::OrderTooLarge`] if a quantity or the total is out of
    ///   range for the order store.
    /// - [`CheckoutError::Store`] if the catalog or order store fails.
    #[instrument(skip_all, fields(lines = cart.lines().count()))]
    pub async fn checkout(
        &self,
        cart: &mut Cart,
        form: &CheckoutForm,
    ) -> Result<OrderId, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let customer = CustomerInfo::parse(form)?;

        let lookup = self.catalog.price_lookup(&cart.product_ids()).await?;

        let missing: Vec<ProductId> = cart
            .product_ids()
            .into_iter()
            .filter(|id| !lookup.contains_key(id))
            .collect();
        if !missing.is_empty() {
            match self.missing_products {
                MissingProductPolicy::Reject => {
                    warn!(?missing, "Checkout refused, products no longer exist");
                    return Err(CheckoutError::ProductsNotFound(missing));
                }
                MissingProductPolicy::Snapshot => {
                    warn!(?missing, "Recording deleted products with a zero price");
                }
            }
        }

        let items = cart
            .lines()
            .map(|(product_id, quantity)| {
                let (unit_price, title_snapshot) = lookup.get(&product_id).map_or_else(
                    || (Price::ZERO, String::new()),
                    |ProductSnapshot { price, title, .. }| (*price, title.clone()),
                );
                NewOrderItem {
                    product_id,
                    quantity,
                    unit_price,
                    title_snapshot,
                }
            })
            .collect();
        let order = NewOrder::new(customer, items, Utc::now());
        if !order.within_limits() {
            warn!(total = %order.total, "Checkout refused, order too large");
            return Err(CheckoutError::OrderTooLarge);
        }

        let order_id = self.orders.create_order(&order).await?;
        cart.clear();
        info!(order_id = %order_id, total = %order.total, "Order placed");

        if let Err(e) = self.notifier.notify(Notification::NewOrder { order_id, order }) {
            warn!(order_id = %order_id, error = %e, "Order notification not sent");
        }

        Ok(order_id)
    }

    /// Store a contact form message and notify the operator.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::Validation`] for blank or malformed input and
    /// [`ContactError::Store`] if the message could not be stored.
    #[instrument(skip_all)]
    pub async fn submit_contact_message(
        &self,
        form: &ContactForm,
    ) -> Result<ContactMessageId, ContactError> {
        let message = NewContactMessage::parse(form, Utc::now())?;
        let message_id = self.messages.create_message(&message).await?;
        info!(message_id = %message_id, "Contact message stored");

        if let Err(e) = self
            .notifier
            .notify(Notification::ContactMessage { message_id, message })
        {
            warn!(message_id = %message_id, error = %e, "Contact notification not sent");
        }

        Ok(message_id)
    }

    /// Overwrite an order's status. An unknown id changes nothing and
    /// returns `false`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the update fails.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<bool, StoreError> {
        let updated = self.orders.update_status(id, status.as_str()).await?;
        if updated {
            info!(order_id = %id, status = %status, "Order status updated");
        }
        Ok(updated)
    }

    /// Orders for the admin console, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    pub async fn list_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderSummary>, StoreError> {
        self.orders
            .list_orders(status.as_ref().map(OrderStatus::as_str))
            .await
    }

    /// A single order with its items.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    pub async fn order(&self, id: OrderId) -> Result<Option<OrderWithItems>, StoreError> {
        self.orders.find_order(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::significant_drop_tightening)]
mod tests {
    use std::sync::Mutex;

    use rust_decimal::Decimal;

    use super::*;
    use crate::catalog::{CatalogFilter, PriceLookup, Product};
    use crate::notification::NotificationError;
    use crate::order::{Order, OrderItem, summarize_items};
    use crate::types::OrderItemId;

    struct FakeCatalog {
        products: Vec<Product>,
    }

    fn book(id: i32, title: &str, cents: i64, grade: i16) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_owned(),
            author: None,
            grade,
            price: Price::new(Decimal::new(cents, 2)),
            image_url: None,
            description: None,
            stock: 100,
        }
    }

    impl CatalogStore for FakeCatalog {
        async fn list_featured(&self, limit: i64) -> Result<Vec<Product>, StoreError> {
            let mut products = self.products.clone();
            products.sort_by_key(|p| std::cmp::Reverse(p.id));
            products.truncate(usize::try_from(limit).unwrap_or(0));
            Ok(products)
        }

        async fn search(&self, filter: &CatalogFilter) -> Result<Vec<Product>, StoreError> {
            let mut products: Vec<Product> = self
                .products
                .iter()
                .filter(|p| filter.matches(p))
                .cloned()
                .collect();
            products.sort_by(|a, b| a.title.cmp(&b.title));
            Ok(products)
        }

        async fn price_lookup(&self, ids: &[ProductId]) -> Result<PriceLookup, StoreError> {
            Ok(self
                .products
                .iter()
                .filter(|p| ids.contains(&p.id))
                .map(|p| (p.id, ProductSnapshot::from(p)))
                .collect())
        }
    }

    #[derive(Default)]
    struct FakeOrders {
        orders: Mutex<Vec<OrderWithItems>>,
    }

    impl FakeOrders {
        fn count(&self) -> usize {
            self.orders.lock().unwrap().len()
        }

        fn first(&self) -> OrderWithItems {
            self.orders.lock().unwrap().first().cloned().unwrap()
        }
    }

    impl OrderStore for FakeOrders {
        async fn create_order(&self, order: &NewOrder) -> Result<OrderId, StoreError> {
            let mut orders = self.orders.lock().unwrap();
            let id = OrderId::new(i32::try_from(orders.len()).unwrap() + 1);
            let items = order
                .items
                .iter()
                .enumerate()
                .map(|(n, item)| OrderItem {
                    id: OrderItemId::new(i32::try_from(n).unwrap() + 1),
                    order_id: id,
                    product_id: item.product_id,
                    quantity: i32::try_from(item.quantity).unwrap(),
                    unit_price: item.unit_price,
                    title_snapshot: item.title_snapshot.clone(),
                })
                .collect();
            orders.push(OrderWithItems {
                order: Order {
                    id,
                    customer_name: order.customer.name.clone(),
                    phone: order.customer.phone.clone(),
                    address: order.customer.address.clone(),
                    note: order.customer.note.clone(),
                    total_price: order.total,
                    status: order.status.as_str().to_owned(),
                    created_at: order.placed_at,
                },
                items,
            });
            Ok(id)
        }

        async fn update_status(&self, id: OrderId, status: &str) -> Result<bool, StoreError> {
            let mut orders = self.orders.lock().unwrap();
            let Some(found) = orders.iter_mut().find(|o| o.order.id == id) else {
                return Ok(false);
            };
            status.clone_into(&mut found.order.status);
            Ok(true)
        }

        async fn list_orders(&self, status: Option<&str>) -> Result<Vec<OrderSummary>, StoreError> {
            let orders = self.orders.lock().unwrap();
            Ok(orders
                .iter()
                .rev()
                .filter(|o| status.is_none_or(|s| o.order.status == s))
                .map(|o| OrderSummary {
                    order: o.order.clone(),
                    items_summary: summarize_items(
                        o.items
                            .iter()
                            .map(|i| (i.title_snapshot.as_str(), i64::from(i.quantity))),
                    ),
                })
                .collect())
        }

        async fn find_order(&self, id: OrderId) -> Result<Option<OrderWithItems>, StoreError> {
            let orders = self.orders.lock().unwrap();
            Ok(orders.iter().find(|o| o.order.id == id).cloned())
        }
    }

    #[derive(Default)]
    struct FakeMessages {
        messages: Mutex<Vec<NewContactMessage>>,
    }

    impl MessageStore for FakeMessages {
        async fn create_message(
            &self,
            message: &NewContactMessage,
        ) -> Result<ContactMessageId, StoreError> {
            let mut messages = self.messages.lock().unwrap();
            messages.push(message.clone());
            Ok(ContactMessageId::new(i32::try_from(messages.len()).unwrap()))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<Notification>>,
        fail: bool,
    }

    impl RecordingNotifier {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) -> Result<(), NotificationError> {
            if self.fail {
                return Err(NotificationError::Delivery("connection refused".to_owned()));
            }
            self.sent.lock().unwrap().push(notification);
            Ok(())
        }
    }

    struct Fixture {
        catalog: FakeCatalog,
        orders: FakeOrders,
        messages: FakeMessages,
        notifier: RecordingNotifier,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_notifier(RecordingNotifier::default())
        }

        fn with_notifier(notifier: RecordingNotifier) -> Self {
            Self {
                catalog: FakeCatalog {
                    products: vec![book(1, "Abetare", 450, 1), book(2, "Matematikë 2", 650, 2)],
                },
                orders: FakeOrders::default(),
                messages: FakeMessages::default(),
                notifier,
            }
        }

        fn workflow(
            &self,
            policy: MissingProductPolicy,
        ) -> OrderWorkflow<'_, FakeCatalog, FakeOrders, FakeMessages, RecordingNotifier> {
            OrderWorkflow::new(
                &self.catalog,
                &self.orders,
                &self.messages,
                &self.notifier,
                policy,
            )
        }
    }

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            name: "Arta Krasniqi".to_owned(),
            phone: "044 123 456".to_owned(),
            address: "Rr. Agim Ramadani 12, Prishtinë".to_owned(),
            note: String::new(),
        }
    }

    #[tokio::test]
    async fn test_checkout_records_snapshot_and_total() {
        let fx = Fixture::new();
        let mut cart = Cart::new();
        cart.add(Some("2"), Some("3"));

        let id = fx
            .workflow(MissingProductPolicy::Reject)
            .checkout(&mut cart, &valid_form())
            .await
            .unwrap();

        let stored = fx.orders.first();
        assert_eq!(stored.order.id, id);
        assert_eq!(stored.order.total_price.amount(), Decimal::new(1950, 2));
        assert_eq!(stored.order.status, "PENDING");
        assert_eq!(stored.items.len(), 1);
        let item = stored.items.first().unwrap();
        assert_eq!(item.quantity, 3);
        assert_eq!(item.unit_price.amount(), Decimal::new(650, 2));
        assert_eq!(item.title_snapshot, "Matematikë 2");
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_total_matches_sum_of_items() {
        let fx = Fixture::new();
        let mut cart = Cart::new();
        cart.add(Some("1"), Some("2"));
        cart.add(Some("2"), Some("5"));

        fx.workflow(MissingProductPolicy::Reject)
            .checkout(&mut cart, &valid_form())
            .await
            .unwrap();

        let stored = fx.orders.first();
        let sum: Price = stored.items.iter().map(OrderItem::subtotal).sum();
        assert_eq!(stored.order.total_price, sum);
        assert_eq!(sum.amount(), Decimal::new(4150, 2));
    }

    #[tokio::test]
    async fn test_empty_cart_writes_nothing() {
        let fx = Fixture::new();
        let mut cart = Cart::new();

        let err = fx
            .workflow(MissingProductPolicy::Reject)
            .checkout(&mut cart, &valid_form())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(fx.orders.count(), 0);
        assert!(fx.notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_customer_fields_leave_cart_untouched() {
        let fx = Fixture::new();
        let mut cart = Cart::new();
        cart.add(Some("1"), Some("1"));
        let before = cart.clone();

        let form = CheckoutForm {
            address: "   ".to_owned(),
            ..valid_form()
        };
        let err = fx
            .workflow(MissingProductPolicy::Reject)
            .checkout(&mut cart, &form)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Validation(ValidationError::MissingFields(ref f)) if f == &["address"]
        ));
        assert_eq!(cart, before);
        assert_eq!(fx.orders.count(), 0);
    }

    #[tokio::test]
    async fn test_failing_notifier_still_clears_cart() {
        let fx = Fixture::with_notifier(RecordingNotifier::failing());
        let mut cart = Cart::new();
        cart.add(Some("1"), Some("1"));

        let result = fx
            .workflow(MissingProductPolicy::Reject)
            .checkout(&mut cart, &valid_form())
            .await;

        assert!(result.is_ok());
        assert!(cart.is_empty());
        assert_eq!(fx.orders.count(), 1);
    }

    #[tokio::test]
    async fn test_successful_checkout_notifies_operator() {
        let fx = Fixture::new();
        let mut cart = Cart::new();
        cart.add(Some("1"), Some("1"));

        let id = fx
            .workflow(MissingProductPolicy::Reject)
            .checkout(&mut cart, &valid_form())
            .await
            .unwrap();

        let sent = fx.notifier.sent.lock().unwrap();
        assert!(matches!(
            sent.as_slice(),
            [Notification::NewOrder { order_id, .. }] if *order_id == id
        ));
    }

    #[tokio::test]
    async fn test_missing_product_rejected_by_default() {
        let fx = Fixture::new();
        let mut cart = Cart::new();
        cart.add(Some("1"), Some("1"));
        cart.add(Some("42"), Some("2"));
        let before = cart.clone();

        let err = fx
            .workflow(MissingProductPolicy::default())
            .checkout(&mut cart, &valid_form())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::ProductsNotFound(ref ids) if ids == &[ProductId::new(42)]));
        assert_eq!(cart, before);
        assert_eq!(fx.orders.count(), 0);
    }

    #[tokio::test]
    async fn test_missing_product_snapshot_policy_records_zero_line() {
        let fx = Fixture::new();
        let mut cart = Cart::new();
        cart.add(Some("1"), Some("1"));
        cart.add(Some("42"), Some("2"));

        fx.workflow(MissingProductPolicy::Snapshot)
            .checkout(&mut cart, &valid_form())
            .await
            .unwrap();

        let stored = fx.orders.first();
        assert_eq!(stored.items.len(), 2);
        let ghost = stored
            .items
            .iter()
            .find(|i| i.product_id == ProductId::new(42))
            .unwrap();
        assert_eq!(ghost.unit_price, Price::ZERO);
        assert_eq!(ghost.title_snapshot, "");
        assert_eq!(stored.order.total_price.amount(), Decimal::new(450, 2));
    }

    #[tokio::test]
    async fn test_update_unknown_order_is_noop() {
        let fx = Fixture::new();
        let updated = fx
            .workflow(MissingProductPolicy::Reject)
            .update_order_status(OrderId::new(999), OrderStatus::Shipped)
            .await
            .unwrap();

        assert!(!updated);
        assert_eq!(fx.orders.count(), 0);
    }

    #[tokio::test]
    async fn test_update_and_filter_by_status() {
        let fx = Fixture::new();
        let workflow = fx.workflow(MissingProductPolicy::Reject);
        for _ in 0..2 {
            let mut cart = Cart::new();
            cart.add(Some("1"), Some("2"));
            workflow.checkout(&mut cart, &valid_form()).await.unwrap();
        }

        assert!(
            workflow
                .update_order_status(OrderId::new(1), OrderStatus::Shipped)
                .await
                .unwrap()
        );

        let shipped = workflow.list_orders(Some(OrderStatus::Shipped)).await.unwrap();
        assert_eq!(shipped.len(), 1);
        assert_eq!(shipped.first().unwrap().items_summary, "Abetare x2");

        let all = workflow.list_orders(None).await.unwrap();
        assert_eq!(
            all.iter().map(|o| o.order.id).collect::<Vec<_>>(),
            vec![OrderId::new(2), OrderId::new(1)]
        );
    }

    #[tokio::test]
    async fn test_contact_message_stored_and_notified() {
        let fx = Fixture::new();
        let form = ContactForm {
            name: "Besa".to_owned(),
            email: "besa@example.com".to_owned(),
            phone: String::new(),
            message: "A keni Fizikë 9?".to_owned(),
        };

        let id = fx
            .workflow(MissingProductPolicy::Reject)
            .submit_contact_message(&form)
            .await
            .unwrap();

        assert_eq!(id, ContactMessageId::new(1));
        assert_eq!(fx.messages.messages.lock().unwrap().len(), 1);
        assert_eq!(fx.notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_contact_form_stores_nothing() {
        let fx = Fixture::new();
        let err = fx
            .workflow(MissingProductPolicy::Reject)
            .submit_contact_message(&ContactForm::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ContactError::Validation(_)));
        assert!(fx.messages.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_total_beyond_order_limit_is_refused() {
        let fx = Fixture {
            catalog: FakeCatalog {
                products: vec![book(7, "Atlas i Madh", 5_000_000_000, 7)],
            },
            ..Fixture::new()
        };
        let mut cart = Cart::new();
        cart.add(Some("7"), Some("2"));
        let before = cart.clone();

        let err = fx
            .workflow(MissingProductPolicy::Reject)
            .checkout(&mut cart, &valid_form())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::OrderTooLarge));
        assert_eq!(cart, before);
        assert_eq!(fx.orders.count(), 0);
    }

    #[tokio::test]
    async fn test_oversized_session_cart_is_refused() {
        let fx = Fixture::new();
        let mut cart: Cart = serde_json::from_value(serde_json::json!({ "1": 30_000_000 })).unwrap();

        let err = fx
            .workflow(MissingProductPolicy::Snapshot)
            .checkout(&mut cart, &valid_form())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::OrderTooLarge));
        assert_eq!(cart.item_count(), 30_000_000);
        assert_eq!(fx.orders.count(), 0);
    }

    #[tokio::test]
    async fn test_capped_cart_checks_out() {
        let fx = Fixture::new();
        let mut cart = Cart::new();
        cart.add(Some("1"), Some("99999999999"));

        fx.workflow(MissingProductPolicy::Reject)
            .checkout(&mut cart, &valid_form())
            .await
            .unwrap();

        let stored = fx.orders.first();
        assert_eq!(stored.items.first().unwrap().quantity, 999);
        assert_eq!(stored.order.total_price.amount(), Decimal::new(449_550, 2));
    }

    #[test]
    fn test_policy_parses() {
        assert_eq!(
            "Snapshot".parse::<MissingProductPolicy>().unwrap(),
            MissingProductPolicy::Snapshot
        );
        assert!("ignore".parse::<MissingProductPolicy>().is_err());
    }
}
