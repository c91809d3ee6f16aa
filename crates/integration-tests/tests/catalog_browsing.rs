//! Integration tests for browsing the catalog through a session.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use fakestore_core::{CategoryId, ProductId};
use fakestore_integration_tests::{TestContext, product_json};
use fakestore_storefront::catalog::ProductFilter;
use rust_decimal::Decimal;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_first_page_uses_configured_page_size() {
    let ctx = TestContext::new().await;
    let page: Vec<_> = (1..=12)
        .map(|id| product_json(id, &format!("Product {id}"), 10.0, 1))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/v1/products"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let session = ctx.open_session();
    let page = session
        .products_page(&ProductFilter::default())
        .await
        .unwrap();

    assert_eq!(page.products.len(), 12);
    assert!(page.has_more());
    assert_eq!(page.next_offset, Some(12));

    // Second call is served from the cache.
    session
        .products_page(&ProductFilter::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_category_and_price_filters() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products"))
        .and(query_param("categoryId", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            product_json(1, "Cheap Shirt", 9.0, 2),
            product_json(2, "Nice Shirt", 40.0, 2),
            product_json(3, "Luxury Shirt", 400.0, 2),
        ])))
        .mount(&ctx.server)
        .await;

    let session = ctx.open_session();
    let filter = ProductFilter {
        category_id: Some(CategoryId::new(2)),
        price_min: Some(Decimal::from(10)),
        price_max: Some(Decimal::from(100)),
        ..ProductFilter::default()
    };
    let page = session.products_page(&filter).await.unwrap();

    assert_eq!(page.products.len(), 1);
    assert_eq!(page.products[0].title, "Nice Shirt");
    assert!(!page.has_more());
}

#[tokio::test]
async fn test_product_detail_with_related() {
    let ctx = TestContext::new().await;
    ctx.mount_product(&product_json(1, "Desk", 150.0, 3)).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products"))
        .and(query_param("categoryId", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            product_json(1, "Desk", 150.0, 3),
            product_json(2, "Chair", 80.0, 3),
            product_json(3, "Shelf", 60.0, 3),
            product_json(4, "Lamp", 20.0, 3),
            product_json(5, "Rug", 90.0, 3),
        ])))
        .mount(&ctx.server)
        .await;

    let session = ctx.open_session();
    let (product, related) = session.product_detail(ProductId::new(1)).await.unwrap();

    assert_eq!(product.title, "Desk");
    assert_eq!(product.category_name(), "Category 3");
    assert_eq!(related.len(), 4);
    assert!(related.iter().all(|p| p.id != product.id));
}

#[tokio::test]
async fn test_categories() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": 1, "name": "Clothes", "slug": "clothes", "image": "https://i.imgur.com/c.jpeg" },
            { "id": 2, "name": "Electronics", "slug": "electronics", "image": "https://i.imgur.com/e.jpeg" }
        ])))
        .mount(&ctx.server)
        .await;

    let session = ctx.open_session();
    let categories = session.categories().await.unwrap();

    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Clothes", "Electronics"]);
}
