//! `orders`, `cart`, `cart-remove`, `add-to-cart`, `buy`.

use std::fmt::Write as _;

use bazaar_core::{CartItemId, Price, ProductId, Quantity};
use bazaar_storefront::api::{CartLine, OrderLineInput, Order};

use super::{CliError, Context};

/// Parse a `-q` value.
///
/// # Errors
///
/// `InvalidArgument` for zero.
pub fn quantity(raw: u32) -> Result<Quantity, CliError> {
    Quantity::new(raw).map_err(|e| CliError::InvalidArgument(e.to_string()))
}

/// List the user's orders.
///
/// # Errors
///
/// `NotLoggedIn`, or the API error.
pub async fn orders(ctx: &Context) -> Result<String, CliError> {
    let session = ctx.require_session().await?;
    let orders = ctx.api.list_orders(&session).await?;
    Ok(render_orders(&orders, |p| ctx.money(p)))
}

/// Show the cart with derived totals.
///
/// # Errors
///
/// `NotLoggedIn`, or the API error.
pub async fn cart(ctx: &Context) -> Result<String, CliError> {
    let session = ctx.require_session().await?;
    let lines = ctx.api.get_cart(&session).await?;
    Ok(render_cart(&lines, |p| ctx.money(p)))
}

/// Remove one cart line.
///
/// # Errors
///
/// `NotLoggedIn`, or the API error.
pub async fn cart_remove(ctx: &Context, id: CartItemId) -> Result<String, CliError> {
    let session = ctx.require_session().await?;
    ctx.api.remove_cart_item(&session, id).await?;
    Ok(format!("Removed cart item #{id}"))
}

/// Add a quantity of a product to the cart.
///
/// # Errors
///
/// `NotLoggedIn`, or the API error.
pub async fn add_to_cart(
    ctx: &Context,
    product_id: ProductId,
    quantity: Quantity,
) -> Result<String, CliError> {
    let session = ctx.require_session().await?;
    let items = [OrderLineInput {
        product_id,
        quantity,
    }];

    ctx.api.create_order(&session, &items).await?;
    Ok(format!("{quantity} item(s) added to cart!"))
}

/// Order and pay for a product in one step.
///
/// # Errors
///
/// `NotLoggedIn`, or the API error from any of the three calls.
pub async fn buy(
    ctx: &Context,
    product_id: ProductId,
    quantity: Quantity,
) -> Result<String, CliError> {
    let session = ctx.require_session().await?;
    let product = ctx.api.get_product(Some(&session), product_id).await?;

    let (order, payment) = ctx
        .api
        .buy_now(&session, product_id, product.price, quantity)
        .await?;
    tracing::info!(order_id = %order.id, payment_id = %payment.id, "Purchased");

    Ok(format!(
        "Purchased {quantity} item(s) successfully! Total: {}",
        ctx.money(product.price.times(quantity.get()))
    ))
}

fn render_orders(orders: &[Order], money: impl Fn(Price) -> String) -> String {
    if orders.is_empty() {
        return "No orders.".to_string();
    }

    let mut out = String::new();
    for order in orders {
        let _ = writeln!(
            out,
            "Order #{} [{}] total {}",
            order.id,
            order.status,
            money(order.total_amount)
        );
        for item in &order.items {
            let _ = writeln!(
                out,
                "  {} × {} = {}",
                item.product_name(),
                item.quantity,
                money(item.total_price)
            );
        }
    }
    out.trim_end().to_string()
}

fn render_cart(lines: &[CartLine], money: impl Fn(Price) -> String) -> String {
    if lines.is_empty() {
        return "Your cart is empty.".to_string();
    }

    let mut out = String::new();
    for line in lines {
        let name = line.product.as_ref().map_or("Unknown Product", |p| p.name.as_str());
        let _ = writeln!(
            out,
            "#{:<5} {} × {} = {}",
            line.id,
            name,
            line.quantity,
            money(line.line_total())
        );
    }
    let total: Price = lines.iter().map(CartLine::line_total).sum();
    let _ = write!(out, "Total: {}", money(total));
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn money(p: Price) -> String {
        p.with_symbol("₹")
    }

    #[test]
    fn test_zero_quantity_rejected() {
        assert!(matches!(quantity(0), Err(CliError::InvalidArgument(_))));
        assert_eq!(quantity(3).unwrap().get(), 3);
    }

    #[test]
    fn test_render_orders_with_missing_product() {
        let orders: Vec<Order> = serde_json::from_value(serde_json::json!([{
            "id": 4,
            "status": "completed",
            "total_amount": "30.00",
            "items": [
                {"id": 1, "product": {"id": 5, "name": "Kettle", "price": "10.00"},
                 "quantity": 2, "price": "10.00", "total_price": "20.00"},
                {"id": 2, "product": null, "quantity": 1, "price": "10.00", "total_price": "10.00"}
            ]
        }]))
        .unwrap();

        let out = render_orders(&orders, money);
        assert!(out.starts_with("Order #4 [completed] total ₹30.00"));
        assert!(out.contains("  Kettle × 2 = ₹20.00"));
        assert!(out.contains("  Unknown Product × 1 = ₹10.00"));
    }

    #[test]
    fn test_render_cart_totals() {
        let lines: Vec<CartLine> = serde_json::from_value(serde_json::json!([
            {"id": 1, "product": {"id": 5, "name": "Kettle", "price": "12.50"}, "quantity": 2},
            {"id": 2, "product": {"id": 6, "name": "Mug", "price": "3"}, "quantity": 1}
        ]))
        .unwrap();

        let out = render_cart(&lines, money);
        assert!(out.contains("Kettle × 2 = ₹25.00"));
        assert!(out.ends_with("Total: ₹28.00"));
        assert_eq!(render_cart(&[], money), "Your cart is empty.");
    }
}
