//! Catalog browsing commands.

use std::io::{self, Write};

use fakestore_core::{CategoryId, ProductId};
use fakestore_storefront::StorefrontSession;
use fakestore_storefront::catalog::{Category, Product, ProductFilter, ProductPage};
use rust_decimal::Decimal;

use crate::CliError;

/// Build a listing filter from command-line options.
///
/// # Errors
///
/// Returns [`CliError::Input`] if the price range is inverted or negative.
pub fn filter(
    offset: u32,
    limit: u32,
    search: Option<String>,
    category_id: Option<CategoryId>,
    price_min: Option<Decimal>,
    price_max: Option<Decimal>,
) -> Result<ProductFilter, CliError> {
    if price_min.is_some_and(|min| min.is_sign_negative())
        || price_max.is_some_and(|max| max.is_sign_negative())
    {
        return Err(CliError::Input("prices cannot be negative".to_string()));
    }
    if let Some((min, max)) = price_min.zip(price_max).filter(|(min, max)| min > max) {
        return Err(CliError::Input(format!(
            "--min ({min}) is greater than --max ({max})"
        )));
    }

    Ok(ProductFilter {
        offset,
        limit,
        search: search.filter(|s| !s.trim().is_empty()),
        category_id,
        price_min,
        price_max,
    })
}

/// List one page, or every page with `all`.
pub async fn list(
    session: &StorefrontSession,
    filter: &ProductFilter,
    all: bool,
) -> Result<(), CliError> {
    if all {
        let mut filter = filter.clone();
        if filter.limit == 0 {
            filter.limit = session.config().page_size;
        }
        let products = session.catalog().fetch_all_products(&filter).await?;

        let mut out = io::stdout().lock();
        write_products(&mut out, &products)?;
        writeln!(out, "\n{} products", products.len())?;
        return Ok(());
    }

    let page = session.products_page(filter).await?;
    write_page(&mut io::stdout().lock(), &page)?;
    Ok(())
}

/// Show a product and up to four related products.
pub async fn show(session: &StorefrontSession, id: ProductId) -> Result<(), CliError> {
    let (product, related) = session.product_detail(id).await?;

    let mut out = io::stdout().lock();
    write_product(&mut out, &product)?;
    if !related.is_empty() {
        writeln!(out, "\nRelated products")?;
        write_products(&mut out, &related)?;
    }
    Ok(())
}

/// List products from the same category.
pub async fn related(
    session: &StorefrontSession,
    id: ProductId,
    limit: u32,
) -> Result<(), CliError> {
    let product = session.catalog().get_product(id).await?;
    let related = session.catalog().related_products(&product, limit).await?;

    let mut out = io::stdout().lock();
    if related.is_empty() {
        writeln!(out, "No related products for {}", product.title)?;
    } else {
        write_products(&mut out, &related)?;
    }
    Ok(())
}

/// List all categories.
pub async fn categories(session: &StorefrontSession) -> Result<(), CliError> {
    let categories = session.categories().await?;
    write_categories(&mut io::stdout().lock(), &categories)?;
    Ok(())
}

fn write_page(out: &mut impl Write, page: &ProductPage) -> io::Result<()> {
    if page.products.is_empty() {
        writeln!(out, "No products found")?;
    } else {
        write_products(out, &page.products)?;
    }

    if let Some(next) = page.next_offset {
        writeln!(out, "\nMore products: --offset {next}")?;
    }
    Ok(())
}

fn write_products(out: &mut impl Write, products: &[Product]) -> io::Result<()> {
    for product in products {
        writeln!(
            out,
            "{:>5}  {:<40}  {:>10}  {}",
            product.id,
            truncate(&product.title, 40),
            product.price.to_string(),
            product.category_name()
        )?;
    }
    Ok(())
}

fn write_product(out: &mut impl Write, product: &Product) -> io::Result<()> {
    writeln!(out, "{} (#{})", product.title, product.id)?;
    writeln!(out, "Price:    {}", product.price)?;
    writeln!(out, "Category: {}", product.category_name())?;
    if let Some(image) = product.primary_image() {
        writeln!(out, "Image:    {image}")?;
    }
    if !product.description.is_empty() {
        writeln!(out, "\n{}", product.description)?;
    }
    Ok(())
}

fn write_categories(out: &mut impl Write, categories: &[Category]) -> io::Result<()> {
    for category in categories {
        writeln!(out, "{:>5}  {}", category.id, category.name)?;
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i32, title: &str, price: u32) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": title,
            "price": price,
            "description": "Solid oak",
            "category": { "id": 1, "name": "Furniture" },
            "images": ["https://img.example/1.png"]
        }))
        .unwrap()
    }

    #[test]
    fn test_filter_rejects_inverted_range() {
        let err = filter(0, 12, None, None, Some(Decimal::from(50)), Some(Decimal::from(10)));
        assert!(matches!(err, Err(CliError::Input(_))));
    }

    #[test]
    fn test_filter_drops_blank_search() {
        let filter = filter(0, 12, Some("  ".to_string()), None, None, None).unwrap();
        assert!(filter.is_unfiltered());
    }

    #[test]
    fn test_write_page_shows_next_offset() {
        let page = ProductPage {
            products: vec![product(1, "Oak Table", 120)],
            next_offset: Some(12),
        };
        let mut out = Vec::new();
        write_page(&mut out, &page).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Oak Table"));
        assert!(text.contains("$120.00"));
        assert!(text.contains("Furniture"));
        assert!(text.contains("--offset 12"));
    }

    #[test]
    fn test_write_empty_page() {
        let page = ProductPage {
            products: Vec::new(),
            next_offset: None,
        };
        let mut out = Vec::new();
        write_page(&mut out, &page).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No products found\n");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long product title", 10), "a very ...");
    }
}
