//! `products`, `categories`, `delete-product`.

use std::fmt::Write as _;

use bazaar_core::{Price, ProductId, Role};
use bazaar_storefront::api::{Category, Product};

use super::{CliError, Context};

/// List products, or show one with `id`.
///
/// # Errors
///
/// `NotLoggedIn`, or the API error.
pub async fn products(ctx: &Context, id: Option<ProductId>) -> Result<String, CliError> {
    let session = ctx.require_session().await?;

    match id {
        Some(id) => {
            let product = ctx.api.get_product(Some(&session), id).await?;
            Ok(render_product(&product, |p| ctx.money(p)))
        }
        None => {
            let products = ctx.api.list_products(Some(&session)).await?;
            Ok(render_products(&products, |p| ctx.money(p)))
        }
    }
}

/// List categories.
///
/// # Errors
///
/// `NotLoggedIn`, or the API error.
pub async fn categories(ctx: &Context) -> Result<String, CliError> {
    let session = ctx.require_session().await?;
    let categories = ctx.api.list_categories(Some(&session)).await?;
    Ok(render_categories(&categories))
}

/// Delete a product. Sellers only; the server enforces ownership.
///
/// # Errors
///
/// `NotLoggedIn`, a customer session, or the API error.
pub async fn delete_product(ctx: &Context, id: ProductId) -> Result<String, CliError> {
    let session = ctx.require_session().await?;
    if session.role() != Role::Seller {
        return Err(CliError::InvalidArgument(
            "only sellers can delete products".to_string(),
        ));
    }

    ctx.api.delete_product(&session, id).await?;
    Ok(format!("Deleted product #{id}"))
}

fn render_products(products: &[Product], money: impl Fn(Price) -> String) -> String {
    if products.is_empty() {
        return "No products.".to_string();
    }

    let mut out = String::new();
    for product in products {
        let _ = writeln!(
            out,
            "#{:<5} {:<32} {:>12}  {} in stock",
            product.id,
            product.name,
            money(product.price),
            product.quantity
        );
    }
    out.trim_end().to_string()
}

fn render_product(product: &Product, money: impl Fn(Price) -> String) -> String {
    let mut out = format!("#{} {}\n", product.id, product.name);
    if let Some(category) = &product.category {
        let _ = writeln!(out, "Category: {}", category.name);
    }
    let _ = writeln!(out, "Price:    {}", money(product.price));
    let _ = writeln!(out, "Stock:    {}", product.quantity);
    if !product.description.is_empty() {
        let _ = write!(out, "\n{}", product.description);
    }
    out.trim_end().to_string()
}

fn render_categories(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories.".to_string();
    }

    categories
        .iter()
        .map(|c| match &c.description {
            Some(description) => format!("#{:<5} {} - {}", c.id, c.name, description),
            None => format!("#{:<5} {}", c.id, c.name),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn money(p: Price) -> String {
        p.with_symbol("₹")
    }

    #[test]
    fn test_render_products() {
        let products: Vec<Product> = serde_json::from_value(serde_json::json!([
            {"id": 1, "name": "Kettle", "price": "12.5", "quantity": 3},
        ]))
        .unwrap();

        let out = render_products(&products, money);
        assert!(out.starts_with("#1"));
        assert!(out.contains("Kettle"));
        assert!(out.contains("₹12.50"));
        assert!(out.ends_with("3 in stock"));

        assert_eq!(render_products(&[], money), "No products.");
    }

    #[test]
    fn test_render_product_detail() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": 7, "name": "Mug", "description": "Holds tea", "price": 4, "quantity": 0,
            "category": {"id": 2, "name": "Kitchen"}
        }))
        .unwrap();

        let out = render_product(&product, money);
        assert!(out.starts_with("#7 Mug"));
        assert!(out.contains("Category: Kitchen"));
        assert!(out.contains("Price:    ₹4.00"));
        assert!(out.ends_with("Holds tea"));
    }
}
