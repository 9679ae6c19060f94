//! Wire types for the remote commerce API.
//!
//! Response types are lenient: fields the storefront does not render default
//! when absent, and unknown fields are ignored. Request types serialize to
//! exactly the payloads the remote service validates.

use bazaar_core::{
    CartItemId, CategoryId, Email, ImageId, OrderId, OrderItemId, OrderStatus, PaymentId,
    PaymentStatus, Price, ProductId, Quantity, Role,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Catalog
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A product image. `image` is usually a path relative to the media host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProductImage {
    pub id: ImageId,
    pub image: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

/// A product as listed by the remote service.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    /// Units in stock.
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub category: Option<Category>,
    /// Seller display string.
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

const fn default_active() -> bool {
    true
}

impl Product {
    /// The featured image, falling back to the first one.
    #[must_use]
    pub fn featured_image(&self) -> Option<&ProductImage> {
        self.images
            .iter()
            .find(|img| img.is_featured)
            .or_else(|| self.images.first())
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// The subset of a product embedded in cart lines and order items.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProductRef {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
}

/// Seller create/update payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: u32,
    pub category: CategoryId,
}

// =============================================================================
// Cart
// =============================================================================

/// One line in the customer's cart.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CartLine {
    pub id: CartItemId,
    #[serde(default)]
    pub product: Option<ProductRef>,
    pub quantity: Quantity,
}

impl CartLine {
    /// Quantity × unit price; zero when the product is gone.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product
            .as_ref()
            .map_or(Price::ZERO, |p| p.price.times(self.quantity.get()))
    }
}

/// Cart payload. The remote service has returned both shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CartPayload {
    Lines(Vec<CartLine>),
    Cart {
        #[serde(default)]
        items: Vec<CartLine>,
    },
}

impl CartPayload {
    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        match self {
            Self::Lines(items) | Self::Cart { items } => items,
        }
    }
}

// =============================================================================
// Orders & payments
// =============================================================================

/// One item of an order create request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderLineInput {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct OrderInput<'a> {
    pub items: &'a [OrderLineInput],
}

/// An order item with the server's price snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    #[serde(default)]
    pub product: Option<ProductRef>,
    pub quantity: u32,
    pub price: Price,
    pub total_price: Price,
}

impl OrderItem {
    #[must_use]
    pub fn product_name(&self) -> &str {
        self.product.as_ref().map_or("Unknown Product", |p| p.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default = "zero_price")]
    pub total_amount: Price,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

const fn zero_price() -> Price {
    Price::ZERO
}

/// Payment create payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentInput {
    pub order_id: OrderId,
    pub amount: Price,
    pub payment_method: String,
}

impl PaymentInput {
    /// Card payment for `amount` against `order_id`.
    #[must_use]
    pub fn card(order_id: OrderId, amount: Price) -> Self {
        Self {
            order_id,
            amount,
            payment_method: "card".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Payment {
    pub id: PaymentId,
    pub amount: Price,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub status: PaymentStatus,
}

// =============================================================================
// Accounts
// =============================================================================

#[derive(Serialize)]
pub(crate) struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Registration payload.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub email: Email,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginUser {
    #[serde(default)]
    pub email: Option<String>,
}

/// `data` of a successful login. The role stays a raw string until the
/// client validates it.
#[derive(Deserialize)]
pub(crate) struct LoginData {
    pub access: String,
    #[serde(default)]
    pub refresh: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub user: Option<LoginUser>,
}

#[derive(Serialize)]
pub(crate) struct LogoutInput<'a> {
    pub refresh: &'a str,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_lenient_fields() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Lamp",
            "price": "249.50",
            "category": null,
            "unexpected": true
        }))
        .unwrap();

        assert_eq!(product.id, ProductId::new(7));
        assert_eq!(product.price.to_string(), "249.50");
        assert!(product.is_active);
        assert!(product.images.is_empty());
        assert!(product.featured_image().is_none());
        assert!(!product.in_stock());
    }

    #[test]
    fn test_featured_image_preferred() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": 1, "name": "Mug", "price": "5.00", "quantity": 3,
            "images": [
                {"id": 1, "image": "/media/a.jpg", "is_featured": false},
                {"id": 2, "image": "/media/b.jpg", "is_featured": true}
            ]
        }))
        .unwrap();

        assert_eq!(product.featured_image().unwrap().id, ImageId::new(2));
    }

    #[test]
    fn test_cart_payload_shapes() {
        let line = serde_json::json!({
            "id": 3, "quantity": 2,
            "product": {"id": 9, "name": "Pen", "price": "1.25", "description": "x"}
        });

        let as_list: CartPayload = serde_json::from_value(serde_json::json!([line])).unwrap();
        let as_cart: CartPayload = serde_json::from_value(
            serde_json::json!({"id": 1, "items": [line], "final_amount": "2.50"}),
        )
        .unwrap();

        let lines = as_list.into_lines();
        assert_eq!(lines, as_cart.into_lines());
        assert_eq!(lines[0].line_total().to_string(), "2.50");
    }

    #[test]
    fn test_cart_line_without_product() {
        let line: CartLine =
            serde_json::from_value(serde_json::json!({"id": 1, "quantity": 4, "product": null}))
                .unwrap();
        assert_eq!(line.line_total(), Price::ZERO);
    }

    #[test]
    fn test_cart_line_rejects_zero_quantity() {
        let zero = serde_json::from_value::<CartLine>(
            serde_json::json!({"id": 1, "quantity": 0, "product": null}),
        );
        assert!(zero.is_err());
    }

    #[test]
    fn test_order_item_unknown_product() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "id": 5, "status": "pending", "total_amount": "10.00",
            "items": [{"id": 1, "product": null, "quantity": 2, "price": "5.00", "total_price": "10.00"}]
        }))
        .unwrap();

        assert_eq!(order.items[0].product_name(), "Unknown Product");
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_order_create_payload() {
        let items = [OrderLineInput {
            product_id: ProductId::new(4),
            quantity: Quantity::new(2).unwrap(),
        }];
        let body = serde_json::to_value(OrderInput { items: &items }).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"items": [{"product_id": 4, "quantity": 2}]})
        );
    }

    #[test]
    fn test_payment_payload() {
        let body = serde_json::to_value(PaymentInput::card(
            OrderId::new(11),
            Price::new(Decimal::new(4998, 2)),
        ))
        .unwrap();
        assert_eq!(body["order_id"], 11);
        assert_eq!(body["amount"], "49.98");
        assert_eq!(body["payment_method"], "card");
    }
}
