//! Domain types for the Fake Store REST API.
//!
//! Field names follow the API's JSON (`camelCase`); unknown fields such as
//! `creationAt` are ignored.

use fakestore_core::{CategoryId, Email, Price, ProductId, UserId};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

// =============================================================================
// Catalog Types
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// URL slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// Category image URL.
    #[serde(default)]
    pub image: Option<String>,
}

/// A product in the store.
///
/// Products are immutable snapshots: the cart copies what it needs at add
/// time and never looks back at the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// URL slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// Unit price.
    pub price: Price,
    /// Plain text description.
    #[serde(default)]
    pub description: String,
    /// Category the product belongs to.
    #[serde(default)]
    pub category: Option<Category>,
    /// Image URLs.
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// The first usable image URL.
    ///
    /// The API sometimes returns image URLs wrapped in JSON array syntax
    /// (`["https://..."]`); the brackets and quotes are stripped.
    #[must_use]
    pub fn primary_image(&self) -> Option<String> {
        self.images
            .iter()
            .map(|raw| raw.trim_matches(|c: char| c == '[' || c == ']' || c == '"' || c.is_whitespace()))
            .find(|url| !url.is_empty())
            .map(str::to_owned)
    }

    /// Category name, or "Uncategorized".
    #[must_use]
    pub fn category_name(&self) -> &str {
        self.category
            .as_ref()
            .map_or("Uncategorized", |category| category.name.as_str())
    }
}

/// Product listing filter.
///
/// `offset`/`limit` are sent to the API. `search` and `category_id` are
/// applied to the fetched page as well, so the same rules hold whether or not
/// the API honors them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductFilter {
    /// Number of products to skip.
    pub offset: u32,
    /// Page size.
    pub limit: u32,
    /// Case-insensitive match on title or description.
    pub search: Option<String>,
    /// Only products in this category.
    pub category_id: Option<CategoryId>,
    /// Minimum price (inclusive).
    pub price_min: Option<Decimal>,
    /// Maximum price (inclusive).
    pub price_max: Option<Decimal>,
}

impl ProductFilter {
    /// Default page size of the product listing.
    pub const DEFAULT_LIMIT: u32 = 12;

    /// A plain page with no search or category restriction.
    #[must_use]
    pub fn page(offset: u32, limit: u32) -> Self {
        Self {
            offset,
            limit,
            ..Self::default()
        }
    }

    /// Whether this filter only pages, without narrowing results.
    #[must_use]
    pub const fn is_unfiltered(&self) -> bool {
        self.search.is_none()
            && self.category_id.is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
    }

    /// Whether a product passes the search, category, and price rules.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let matches_search = self.search.as_deref().is_none_or(|term| {
            let term = term.to_lowercase();
            product.title.to_lowercase().contains(&term)
                || product.description.to_lowercase().contains(&term)
        });

        let matches_category = self.category_id.is_none_or(|wanted| {
            product
                .category
                .as_ref()
                .is_some_and(|category| category.id == wanted)
        });

        let price = product.price.amount();
        let matches_min = self.price_min.is_none_or(|min| price >= min);
        let matches_max = self.price_max.is_none_or(|max| price <= max);

        matches_search && matches_category && matches_min && matches_max
    }
}

/// One page of a product listing.
#[derive(Debug, Clone)]
pub struct ProductPage {
    /// Products on this page, after filtering.
    pub products: Vec<Product>,
    /// Offset of the next page, if the API returned a full page.
    pub next_offset: Option<u32>,
}

impl ProductPage {
    /// Whether more products may be available.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.next_offset.is_some()
    }
}

// =============================================================================
// Admin Types
// =============================================================================

/// Input for creating a product.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub description: String,
    pub category_id: CategoryId,
    pub images: Vec<String>,
}

/// Partial update of a product. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl ProductUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
            && self.images.is_none()
    }
}

/// Tokens returned by `POST /auth/login`.
#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
}

/// Wire shape of the login response.
#[derive(Deserialize)]
pub(crate) struct AuthTokensResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<AuthTokensResponse> for AuthTokens {
    fn from(raw: AuthTokensResponse) -> Self {
        Self {
            access_token: SecretString::from(raw.access_token),
            refresh_token: SecretString::from(raw.refresh_token),
        }
    }
}

/// Profile of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

fn default_role() -> String {
    "user".to_string()
}

impl UserProfile {
    /// Whether the user may manage products.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case("admin")
    }
}
