//! Fake Store REST API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`
//! - The API is source of truth for products - NO local sync, direct API calls
//! - In-memory caching via `moka` for products and categories (5 minute TTL)
//! - Admin mutations clear the cache so the next listing is fresh
//!
//! # Example
//!
//! ```rust,ignore
//! use fakestore_storefront::catalog::{CatalogClient, ProductFilter};
//!
//! let client = CatalogClient::new(&config.catalog)?;
//!
//! // First page of the listing
//! let page = client.products_page(&ProductFilter::page(0, 12)).await?;
//!
//! // A single product, ready to be added to the cart
//! let product = client.get_product(ProductId::new(4)).await?;
//! ```

mod cache;
pub mod types;

pub use types::*;

use std::sync::Arc;

use fakestore_core::{CategoryId, ProductId};
use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::CatalogConfig;
use cache::{CacheKey, CacheValue};

/// Upper bound on pages walked by [`CatalogClient::fetch_all_products`].
const MAX_PAGES: u32 = 100;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or rejected credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message reported by the API.
        message: String,
    },

    /// The configured base URL cannot carry path segments.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the Fake Store REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("fakestore/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.api_url.clone(),
                cache,
            }),
        })
    }

    /// Base URL requests are made against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build an endpoint URL from path segments below the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, CatalogError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        let path = response.url().path().to_string();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = api_message(&body);

        // The API reports unknown entities as 400 "Could not find any entity..."
        if status == StatusCode::NOT_FOUND
            || (status == StatusCode::BAD_REQUEST
                && message.to_lowercase().contains("could not find"))
        {
            return Err(CatalogError::NotFound(path));
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(CatalogError::Unauthorized(message));
        }

        tracing::error!(
            status = %status,
            body = %body.chars().take(500).collect::<String>(),
            "Catalog API returned non-success status"
        );
        Err(CatalogError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Send a request and parse the JSON body.
    async fn fetch<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, CatalogError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog API response"
            );
            CatalogError::Parse(e)
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the product does not exist, or
    /// another error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let cache_key = CacheKey::Product(id);

        // Check cache
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&["products", &id.to_string()])?;
        let product: Product = self.fetch(self.inner.client.get(url)).await?;

        // Cache the result
        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get one raw page of products as the API returns it.
    ///
    /// Only paging and the category are sent to the API; the remaining filter
    /// rules are applied by [`Self::products_page`].
    async fn raw_products(
        &self,
        offset: u32,
        limit: u32,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<Product>, CatalogError> {
        let cache_key = CacheKey::Products(ProductFilter {
            category_id,
            ..ProductFilter::page(offset, limit)
        });

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let mut url = self.endpoint(&["products"])?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("offset", &offset.to_string())
                .append_pair("limit", &limit.to_string());
            if let Some(category_id) = category_id {
                query.append_pair("categoryId", &category_id.to_string());
            }
        }

        let products: Vec<Product> = self.fetch(self.inner.client.get(url)).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// List products by offset and page size.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Product>, CatalogError> {
        self.raw_products(offset, limit, None).await
    }

    /// Get one page of products, narrowed by the filter.
    ///
    /// `next_offset` is set when the API returned a full page, mirroring a
    /// "load more" button.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products_page(&self, filter: &ProductFilter) -> Result<ProductPage, CatalogError> {
        let limit = if filter.limit == 0 {
            ProductFilter::DEFAULT_LIMIT
        } else {
            filter.limit
        };

        let raw = self
            .raw_products(filter.offset, limit, filter.category_id)
            .await?;

        let full_page = u32::try_from(raw.len()).is_ok_and(|len| len >= limit);
        let next_offset = if full_page {
            filter.offset.checked_add(limit)
        } else {
            None
        };

        let products = raw
            .into_iter()
            .filter(|product| filter.matches(product))
            .collect();

        Ok(ProductPage {
            products,
            next_offset,
        })
    }

    /// Walk every page from the filter's offset until a short page.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    #[instrument(skip(self))]
    pub async fn fetch_all_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, CatalogError> {
        let mut page_filter = filter.clone();
        let mut products = Vec::new();

        for _ in 0..MAX_PAGES {
            let page = self.products_page(&page_filter).await?;
            products.extend(page.products);

            match page.next_offset {
                Some(next) => page_filter.offset = next,
                None => return Ok(products),
            }
        }

        tracing::warn!(max_pages = MAX_PAGES, "Stopped paging products at page limit");
        Ok(products)
    }

    /// Products from the same category, excluding the product itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn related_products(
        &self,
        product: &Product,
        limit: u32,
    ) -> Result<Vec<Product>, CatalogError> {
        let Some(category) = &product.category else {
            return Ok(Vec::new());
        };

        let candidates = self
            .raw_products(0, limit.saturating_add(1), Some(category.id))
            .await?;

        Ok(candidates
            .into_iter()
            .filter(|candidate| candidate.id != product.id)
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let url = self.endpoint(&["categories"])?;
        let categories: Vec<Category> = self.fetch(self.inner.client.get(url)).await?;

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Exchange credentials for access and refresh tokens.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unauthorized`] for wrong credentials, or another
    /// error if the API request fails.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthTokens, CatalogError> {
        let url = self.endpoint(&["auth", "login"])?;
        let body = serde_json::json!({
            "email": email,
            "password": password.expose_secret(),
        });

        let tokens: AuthTokensResponse = self.fetch(self.inner.client.post(url).json(&body)).await?;
        Ok(tokens.into())
    }

    /// Fetch the profile of the token's owner.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unauthorized`] if the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn profile(&self, token: &SecretString) -> Result<UserProfile, CatalogError> {
        let url = self.endpoint(&["auth", "profile"])?;
        self.fetch(
            self.inner
                .client
                .get(url)
                .bearer_auth(token.expose_secret()),
        )
        .await
    }

    // =========================================================================
    // Admin Methods
    // =========================================================================

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the product or the request fails.
    #[instrument(skip(self, token, product), fields(title = %product.title))]
    pub async fn create_product(
        &self,
        token: &SecretString,
        product: &NewProduct,
    ) -> Result<Product, CatalogError> {
        let url = self.endpoint(&["products"])?;
        let created: Product = self
            .fetch(
                self.inner
                    .client
                    .post(url)
                    .bearer_auth(token.expose_secret())
                    .json(product),
            )
            .await?;

        self.inner.cache.invalidate_all();
        Ok(created)
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the product does not exist, or
    /// another error if the request fails.
    #[instrument(skip(self, token, update), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        token: &SecretString,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, CatalogError> {
        let url = self.endpoint(&["products", &id.to_string()])?;
        let updated: Product = self
            .fetch(
                self.inner
                    .client
                    .put(url)
                    .bearer_auth(token.expose_secret())
                    .json(update),
            )
            .await?;

        self.inner.cache.invalidate_all();
        Ok(updated)
    }

    /// Delete a product. Returns what the API reports (`true` on success).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the product does not exist, or
    /// another error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn delete_product(
        &self,
        token: &SecretString,
        id: ProductId,
    ) -> Result<bool, CatalogError> {
        let url = self.endpoint(&["products", &id.to_string()])?;
        let deleted: bool = self
            .fetch(
                self.inner
                    .client
                    .delete(url)
                    .bearer_auth(token.expose_secret()),
            )
            .await?;

        self.inner.cache.invalidate_all();
        Ok(deleted)
    }
}

/// Extract the human-readable message from an API error body.
///
/// The API answers `{"message": "..."}` or `{"message": ["...", "..."]}`;
/// anything else falls back to the start of the raw body.
fn api_message(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    match parsed.as_ref().and_then(|value| value.get("message")) {
        Some(serde_json::Value::String(message)) => message.clone(),
        Some(serde_json::Value::Array(messages)) => messages
            .iter()
            .map(|m| m.as_str().map_or_else(|| m.to_string(), str::to_owned))
            .collect::<Vec<_>>()
            .join("; "),
        _ if body.trim().is_empty() => "(empty response body)".to_string(),
        _ => body.chars().take(200).collect(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::time::Duration;

    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> CatalogClient {
        let config = CatalogConfig {
            api_url: Url::parse(&format!("{}/api/v1", server.uri())).unwrap(),
            cache_ttl: Duration::from_secs(300),
            request_timeout: Duration::from_secs(5),
        };
        CatalogClient::new(&config).unwrap()
    }

    fn product_body(id: i32, title: &str, price: u32, category_id: i32) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "title": title,
            "price": price,
            "description": format!("{title} description"),
            "category": { "id": category_id, "name": format!("Category {category_id}") },
            "images": [format!("https://img.example/{id}.png")]
        })
    }

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::NotFound("/api/v1/products/9".to_string());
        assert_eq!(err.to_string(), "Not found: /api/v1/products/9");

        let err = CatalogError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }

    #[test]
    fn test_api_message_variants() {
        assert_eq!(api_message(r#"{"message":"Unauthorized"}"#), "Unauthorized");
        assert_eq!(
            api_message(r#"{"message":["price must be positive","title should not be empty"]}"#),
            "price must be positive; title should not be empty"
        );
        assert_eq!(api_message("gateway down"), "gateway down");
        assert_eq!(api_message(""), "(empty response body)");
    }

    #[tokio::test]
    async fn test_get_product_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/products/4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(product_body(4, "Table", 687, 5)))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let first = client.get_product(ProductId::new(4)).await.unwrap();
        let second = client.get_product(ProductId::new(4)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.title, "Table");
    }

    #[tokio::test]
    async fn test_get_product_not_found_from_400() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/products/999"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "name": "EntityNotFoundError",
                "message": "Could not find any entity of type \"Product\" matching: {\"id\": 999}"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.get_product(ProductId::new(999)).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_products_page_sends_paging_and_reports_more() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/products"))
            .and(query_param("offset", "0"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                product_body(1, "Lamp", 10, 1),
                product_body(2, "Chair", 20, 1),
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let page = client
            .products_page(&ProductFilter::page(0, 2))
            .await
            .unwrap();

        assert_eq!(page.products.len(), 2);
        assert_eq!(page.next_offset, Some(2));
    }

    #[tokio::test]
    async fn test_products_page_applies_search_locally() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                product_body(1, "Desk Lamp", 10, 1),
                product_body(2, "Chair", 20, 1),
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let filter = ProductFilter {
            search: Some("lamp".to_string()),
            ..ProductFilter::page(0, 12)
        };
        let page = client.products_page(&filter).await.unwrap();

        assert_eq!(page.products.len(), 1);
        assert_eq!(page.products[0].title, "Desk Lamp");
        assert!(!page.has_more());
    }

    #[tokio::test]
    async fn test_fetch_all_products_walks_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/products"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                product_body(1, "A", 1, 1),
                product_body(2, "B", 2, 1),
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/products"))
            .and(query_param("offset", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                product_body(3, "C", 3, 1),
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let all = client
            .fetch_all_products(&ProductFilter::page(0, 2))
            .await
            .unwrap();

        let ids: Vec<i32> = all.iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_related_products_excludes_self() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/products"))
            .and(query_param("categoryId", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                product_body(4, "Table", 687, 5),
                product_body(7, "Shelf", 90, 5),
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let product: Product = serde_json::from_value(product_body(4, "Table", 687, 5)).unwrap();
        let related = client.related_products(&product, 4).await.unwrap();

        assert_eq!(related.len(), 1);
        assert_eq!(related[0].id, ProductId::new(7));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/categories"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.list_categories().await.unwrap_err();
        assert!(matches!(err, CatalogError::RateLimited(30)));
    }

    #[tokio::test]
    async fn test_login_and_create_product_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .and(body_json(serde_json::json!({
                "email": "admin@mail.com",
                "password": "admin123"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "access_token": "access-abc",
                "refresh_token": "refresh-xyz"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/products"))
            .and(header("authorization", "Bearer access-abc"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(product_body(210, "New Lamp", 25, 2)),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let tokens = client
            .login("admin@mail.com", &SecretString::from("admin123"))
            .await
            .unwrap();
        assert_eq!(tokens.access_token.expose_secret(), "access-abc");

        let created = client
            .create_product(
                &tokens.access_token,
                &NewProduct {
                    title: "New Lamp".to_string(),
                    price: rust_decimal::Decimal::from(25),
                    description: "A lamp".to_string(),
                    category_id: CategoryId::new(2),
                    images: vec![],
                },
            )
            .await
            .unwrap();
        assert_eq!(created.id, ProductId::new(210));
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({ "message": "Unauthorized", "statusCode": 401 })),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .login("admin@mail.com", &SecretString::from("wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Unauthorized(message) if message == "Unauthorized"));
    }

    #[tokio::test]
    async fn test_server_error_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/products/3"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .delete_product(&SecretString::from("token"), ProductId::new(3))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Api { status: 500, .. }));
    }
}
