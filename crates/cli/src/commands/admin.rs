//! Admin product management commands.
//!
//! # Usage
//!
//! ```bash
//! # Log in with FAKESTORE_ADMIN_EMAIL / FAKESTORE_ADMIN_PASSWORD
//! fakestore admin login
//!
//! # Or with explicit credentials
//! fakestore admin login -e admin@mail.com -p admin123
//!
//! # Manage products
//! fakestore admin products create --title Lamp --price 25 --category-id 1 --image https://placehold.co/600
//! fakestore admin products update 210 --price 19.99
//! fakestore admin products delete 210
//! ```
//!
//! The login is kept in local storage until `fakestore admin logout`.

use std::io::{self, Write};

use fakestore_core::ProductId;
use fakestore_storefront::StorefrontSession;
use fakestore_storefront::catalog::{NewProduct, Product, ProductUpdate, UserProfile};
use secrecy::SecretString;

use crate::CliError;

/// Log in and remember the user.
pub async fn login(
    session: &StorefrontSession,
    email: Option<String>,
    password: Option<String>,
) -> Result<(), CliError> {
    let profile = match (email, password) {
        (Some(email), Some(password)) => {
            session
                .login(&email, &SecretString::from(password))
                .await?
        }
        _ => session.login_from_config().await?,
    };

    let mut out = io::stdout().lock();
    writeln!(out, "Logged in as {} <{}>", profile.name, profile.email)?;
    if !profile.is_admin() {
        writeln!(out, "Note: role '{}' cannot manage products", profile.role)?;
    }
    Ok(())
}

/// Forget the stored login.
pub fn logout(session: &StorefrontSession) -> Result<(), CliError> {
    session.logout()?;
    writeln!(io::stdout().lock(), "Logged out")?;
    Ok(())
}

/// Show the logged-in user.
pub fn whoami(session: &StorefrontSession) -> Result<(), CliError> {
    let mut out = io::stdout().lock();
    match session.current_user()? {
        Some(user) => write_profile(&mut out, &user.profile)?,
        None => writeln!(out, "Not logged in")?,
    }
    Ok(())
}

/// Create a product.
pub async fn create(session: &StorefrontSession, product: &NewProduct) -> Result<(), CliError> {
    if product.title.trim().is_empty() {
        return Err(CliError::Input("title cannot be empty".to_string()));
    }
    if product.price.is_sign_negative() {
        return Err(CliError::Input("price cannot be negative".to_string()));
    }

    let created = session.create_product(product).await?;
    write_saved(&mut io::stdout().lock(), "Created", &created)?;
    Ok(())
}

/// Update fields of a product.
pub async fn update(
    session: &StorefrontSession,
    id: ProductId,
    update: &ProductUpdate,
) -> Result<(), CliError> {
    if update.is_empty() {
        return Err(CliError::Input("nothing to update".to_string()));
    }
    if update.price.is_some_and(|price| price.is_sign_negative()) {
        return Err(CliError::Input("price cannot be negative".to_string()));
    }

    let updated = session.update_product(id, update).await?;
    write_saved(&mut io::stdout().lock(), "Updated", &updated)?;
    Ok(())
}

/// Delete a product.
pub async fn delete(session: &StorefrontSession, id: ProductId) -> Result<(), CliError> {
    let deleted = session.delete_product(id).await?;

    let mut out = io::stdout().lock();
    if deleted {
        writeln!(out, "Deleted product {id}")?;
    } else {
        writeln!(out, "Product {id} was not deleted")?;
    }
    Ok(())
}

fn write_profile(out: &mut impl Write, profile: &UserProfile) -> io::Result<()> {
    writeln!(out, "{} <{}>", profile.name, profile.email)?;
    writeln!(out, "ID:   {}", profile.id)?;
    writeln!(out, "Role: {}", profile.role)
}

fn write_saved(out: &mut impl Write, verb: &str, product: &Product) -> io::Result<()> {
    writeln!(
        out,
        "{verb} product {}: {} ({})",
        product.id, product.title, product.price
    )
}
