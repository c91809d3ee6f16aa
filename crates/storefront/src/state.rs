//! Storefront session: the owned context the front end drives.
//!
//! A session bundles configuration, the catalog client, the cart, and the
//! admin login. It is the only path through which the cart is mutated.

use fakestore_core::ProductId;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::cart::CartStore;
use crate::catalog::{
    Category, CatalogClient, NewProduct, Product, ProductFilter, ProductPage, ProductUpdate,
    UserProfile,
};
use crate::checkout::{CheckoutConfirmation, CheckoutForm};
use crate::config::StorefrontConfig;
use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::storage::{CartPersistence, FileStore, KeyValueStore, read_json, write_json};

/// Local storage key holding the logged-in user.
pub const USER_KEY: &str = "user";

/// Related products shown next to a product.
pub const RELATED_LIMIT: u32 = 4;

/// Logged-in user as kept in local storage.
#[derive(Serialize, Deserialize)]
struct StoredUser {
    access_token: String,
    refresh_token: String,
    profile: UserProfile,
}

/// An admin login restored from local storage.
#[derive(Clone)]
pub struct AdminSession {
    pub access_token: SecretString,
    pub profile: UserProfile,
}

impl std::fmt::Debug for AdminSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSession")
            .field("access_token", &"[REDACTED]")
            .field("profile", &self.profile)
            .finish()
    }
}

/// One shopper's session.
pub struct StorefrontSession<S = FileStore> {
    config: StorefrontConfig,
    catalog: CatalogClient,
    cart: CartStore<S>,
    store: S,
}

impl StorefrontSession<FileStore> {
    /// Open a session backed by the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or the
    /// catalog client cannot be built.
    pub fn open(config: StorefrontConfig) -> Result<Self> {
        let store = FileStore::open(&config.data_dir)?;
        Self::with_store(config, store)
    }
}

impl<S: KeyValueStore + Clone> StorefrontSession<S> {
    /// Open a session on an existing store.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog client cannot be built.
    pub fn with_store(config: StorefrontConfig, store: S) -> Result<Self> {
        let catalog = CatalogClient::new(&config.catalog)?;
        let cart = CartStore::open(CartPersistence::new(store.clone(), config.cart_key.clone()));

        info!(
            api_url = %config.catalog.api_url,
            items = cart.items().len(),
            "Opened storefront session"
        );

        Ok(Self {
            config,
            catalog,
            cart,
            store,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    #[must_use]
    pub const fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    /// Read-only view of the cart.
    #[must_use]
    pub const fn cart(&self) -> &CartStore<S> {
        &self.cart
    }

    // =========================================================================
    // Browsing
    // =========================================================================

    /// One page of the product listing.
    ///
    /// A zero limit in the filter uses the configured page size.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog request fails.
    pub async fn products_page(&self, filter: &ProductFilter) -> Result<ProductPage> {
        let mut filter = filter.clone();
        if filter.limit == 0 {
            filter.limit = self.config.page_size;
        }
        Ok(self.catalog.products_page(&filter).await?)
    }

    /// A product with up to four others from its category.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Catalog`] with `NotFound` for an unknown id, or
    /// another error if a request fails.
    pub async fn product_detail(&self, id: ProductId) -> Result<(Product, Vec<Product>)> {
        let product = self.catalog.get_product(id).await?;
        let related = self
            .catalog
            .related_products(&product, RELATED_LIMIT)
            .await?;
        Ok((product, related))
    }

    /// # Errors
    ///
    /// Returns an error if the catalog request fails.
    pub async fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.catalog.list_categories().await?)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Look up a product and add it to the cart.
    ///
    /// The quantity is checked before the product is fetched.
    ///
    /// # Errors
    ///
    /// Returns a cart error for a bad quantity, or a catalog error if the
    /// product cannot be loaded.
    #[instrument(skip(self))]
    pub async fn add_product(&mut self, id: ProductId, quantity: i64) -> Result<Product> {
        if quantity < 1 {
            return Err(crate::cart::CartError::NonPositiveQuantity(quantity).into());
        }

        let product = self.catalog.get_product(id).await?;
        self.cart.add_item(&product, quantity)?;
        Ok(product)
    }

    /// Add an already loaded product to the cart.
    ///
    /// # Errors
    ///
    /// Returns a cart error for a bad quantity.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> Result<u32> {
        Ok(self.cart.add_item(product, quantity)?)
    }

    /// # Errors
    ///
    /// Returns a cart error if the quantity does not fit a line item.
    pub fn update_quantity(&mut self, id: ProductId, quantity: i64) -> Result<bool> {
        Ok(self.cart.update_quantity(id, quantity)?)
    }

    pub fn remove_item(&mut self, id: ProductId) -> bool {
        self.cart.remove_item(id).is_some()
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    /// # Errors
    ///
    /// Returns [`AppError::Checkout`] for an empty cart or an invalid form.
    pub fn checkout(&mut self, form: &CheckoutForm) -> Result<CheckoutConfirmation> {
        Ok(self.cart.checkout(form)?)
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// Log in and remember the user in local storage.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Catalog`] if the credentials are rejected, or
    /// [`AppError::Storage`] if the login cannot be saved.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<UserProfile> {
        let tokens = self.catalog.login(email, password).await?;
        let profile = self.catalog.profile(&tokens.access_token).await?;

        let stored = StoredUser {
            access_token: tokens.access_token.expose_secret().to_string(),
            refresh_token: tokens.refresh_token.expose_secret().to_string(),
            profile: profile.clone(),
        };
        write_json(&self.store, USER_KEY, &stored)?;

        set_sentry_user(&profile.id, Some(profile.email.as_str()));
        add_breadcrumb("auth", "Logged in", None);
        info!(user_id = %profile.id, role = %profile.role, "Logged in");
        Ok(profile)
    }

    /// Log in with the admin credentials from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if no credentials are configured,
    /// otherwise as [`Self::login`].
    pub async fn login_from_config(&self) -> Result<UserProfile> {
        let Some(admin) = self.config.admin.clone() else {
            return Err(AppError::Unauthorized(
                "FAKESTORE_ADMIN_EMAIL and FAKESTORE_ADMIN_PASSWORD are not set".to_string(),
            ));
        };
        self.login(&admin.email, &admin.password).await
    }

    /// Forget the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the stored login cannot be removed.
    pub fn logout(&self) -> Result<()> {
        self.store.remove(USER_KEY)?;
        clear_sentry_user();
        info!("Logged out");
        Ok(())
    }

    /// The logged-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the stored login cannot be read.
    pub fn current_user(&self) -> Result<Option<AdminSession>> {
        let stored: Option<StoredUser> = read_json(&self.store, USER_KEY)?;
        Ok(stored.map(|user| AdminSession {
            access_token: SecretString::from(user.access_token),
            profile: user.profile,
        }))
    }

    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] unless an admin is logged in, or a
    /// catalog error if the API rejects the product.
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product> {
        let admin = self.require_admin()?;
        Ok(self
            .catalog
            .create_product(&admin.access_token, product)
            .await?)
    }

    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] unless an admin is logged in, or a
    /// catalog error if the API rejects the update.
    pub async fn update_product(&self, id: ProductId, update: &ProductUpdate) -> Result<Product> {
        let admin = self.require_admin()?;
        Ok(self
            .catalog
            .update_product(&admin.access_token, id, update)
            .await?)
    }

    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] unless an admin is logged in, or a
    /// catalog error if the delete fails.
    pub async fn delete_product(&self, id: ProductId) -> Result<bool> {
        let admin = self.require_admin()?;
        Ok(self.catalog.delete_product(&admin.access_token, id).await?)
    }

    fn require_admin(&self) -> Result<AdminSession> {
        match self.current_user()? {
            Some(session) if session.profile.is_admin() => Ok(session),
            Some(session) => Err(AppError::Unauthorized(format!(
                "{} is not an admin",
                session.profile.email
            ))),
            None => Err(AppError::Unauthorized(
                "Log in with `fakestore admin login` first".to_string(),
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use url::Url;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::CatalogConfig;
    use crate::storage::MemoryStore;

    fn config(server: &MockServer) -> StorefrontConfig {
        let mut config = StorefrontConfig::with_data_dir("unused");
        config.catalog = CatalogConfig {
            api_url: Url::parse(&format!("{}/api/v1", server.uri())).unwrap(),
            cache_ttl: Duration::from_secs(300),
            request_timeout: Duration::from_secs(5),
        };
        config
    }

    async fn mount_login(server: &MockServer, role: &str) {
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "access_token": "token-1",
                "refresh_token": "refresh-1"
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/auth/profile"))
            .and(header("authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 1,
                "email": "admin@mail.com",
                "name": "Admin",
                "role": role,
                "avatar": "https://i.imgur.com/a.png"
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_add_product_rejects_quantity_before_fetching() {
        let server = MockServer::start().await;
        let mut session = StorefrontSession::with_store(config(&server), MemoryStore::new()).unwrap();

        let err = session.add_product(ProductId::new(1), 0).await.unwrap_err();
        assert!(matches!(err, AppError::Cart(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_persists_user() {
        let server = MockServer::start().await;
        mount_login(&server, "admin").await;
        let store = MemoryStore::new();
        let session = StorefrontSession::with_store(config(&server), store.clone()).unwrap();

        let profile = session
            .login("admin@mail.com", &SecretString::from("admin123"))
            .await
            .unwrap();
        assert!(profile.is_admin());

        let restored = StorefrontSession::with_store(config(&server), store)
            .unwrap()
            .current_user()
            .unwrap()
            .unwrap();
        assert_eq!(restored.access_token.expose_secret(), "token-1");
        assert_eq!(restored.profile.name, "Admin");

        session.logout().unwrap();
        assert!(session.current_user().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_admin_ops_require_admin_role() {
        let server = MockServer::start().await;
        mount_login(&server, "customer").await;
        let session = StorefrontSession::with_store(config(&server), MemoryStore::new()).unwrap();

        let err = session.delete_product(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        session
            .login("admin@mail.com", &SecretString::from("pw"))
            .await
            .unwrap();
        let err = session.delete_product(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(message) if message.contains("not an admin")));
    }

    #[tokio::test]
    async fn test_login_from_config_without_credentials() {
        let server = MockServer::start().await;
        let session = StorefrontSession::with_store(config(&server), MemoryStore::new()).unwrap();

        let err = session.login_from_config().await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_admin_session_debug_redacts_token() {
        let session = AdminSession {
            access_token: SecretString::from("very-secret-token"),
            profile: serde_json::from_value(serde_json::json!({
                "id": 1,
                "email": "admin@mail.com",
                "name": "Admin",
                "role": "admin"
            }))
            .unwrap(),
        };

        let output = format!("{session:?}");
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("very-secret-token"));
    }
}
