//! Integration tests for the Fake Store storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fakestore-integration-tests
//! ```
//!
//! No network access is needed: every test runs against a `wiremock` server
//! standing in for the catalog API and a temporary data directory standing in
//! for local storage.
//!
//! # Test Categories
//!
//! - `cart_session` - Cart lifecycle across restarts and checkout
//! - `catalog_browsing` - Listing, filtering, paging, related products
//! - `admin_products` - Login and product management

use std::path::Path;
use std::time::Duration;

use fakestore_storefront::StorefrontSession;
use fakestore_storefront::config::{CatalogConfig, StorefrontConfig};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock catalog API plus a scratch data directory.
pub struct TestContext {
    pub server: MockServer,
    pub data_dir: TempDir,
}

impl TestContext {
    /// Start a mock API and create an empty data directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let data_dir = tempfile::tempdir().expect("create temp data dir");
        Self { server, data_dir }
    }

    /// Configuration pointing at the mock API and the data directory.
    ///
    /// # Panics
    ///
    /// Panics if the mock server URI is not a valid URL.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        let mut config = StorefrontConfig::with_data_dir(self.data_dir.path());
        config.catalog = CatalogConfig {
            api_url: Url::parse(&format!("{}/api/v1", self.server.uri()))
                .expect("mock server URI is a URL"),
            cache_ttl: Duration::from_secs(300),
            request_timeout: Duration::from_secs(5),
        };
        config
    }

    /// Open a fresh session, as a restarted process would.
    ///
    /// # Panics
    ///
    /// Panics if the session cannot be opened.
    #[must_use]
    pub fn open_session(&self) -> StorefrontSession {
        StorefrontSession::open(self.config()).expect("open session")
    }

    /// Path of the file holding a storage key.
    #[must_use]
    pub fn key_path(&self, key: &str) -> std::path::PathBuf {
        self.data_dir.path().join(format!("{key}.json"))
    }

    /// Serve a product at `GET /products/{id}`.
    pub async fn mount_product(&self, product: &serde_json::Value) {
        let id = product
            .get("id")
            .and_then(serde_json::Value::as_i64)
            .unwrap_or_default();
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/products/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(product))
            .mount(&self.server)
            .await;
    }
}

/// Product JSON in the catalog API's shape.
#[must_use]
pub fn product_json(id: i32, title: &str, price: f64, category_id: i32) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "slug": title.to_lowercase().replace(' ', "-"),
        "price": price,
        "description": format!("{title} description"),
        "category": {
            "id": category_id,
            "name": format!("Category {category_id}"),
            "slug": format!("category-{category_id}"),
            "image": "https://i.imgur.com/QkIa5tT.jpeg"
        },
        "images": [format!("https://i.imgur.com/{id}.jpeg")],
        "creationAt": "2025-01-01T00:00:00.000Z",
        "updatedAt": "2025-01-01T00:00:00.000Z"
    })
}

/// Read a raw storage file, if present.
#[must_use]
pub fn read_stored(path: &Path) -> Option<serde_json::Value> {
    let raw = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}
