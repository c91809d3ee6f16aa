//! Checkout form validation and confirmation.
//!
//! The form is transient: it is validated, turned into a confirmation, and
//! dropped. Nothing here touches storage.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use fakestore_core::{AccountNumber, DigitsError, Email, EmailError, PhoneNumber};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::cart::CartTotals;

/// Navigation targets the front end moves to after a cart operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Route {
    Products,
    Cart,
    Checkout,
    About,
}

impl Route {
    /// Path of the route.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Products => "/products",
            Self::Cart => "/cart",
            Self::Checkout => "/checkout",
            Self::About => "/about",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Raw checkout form input.
///
/// Implements `Debug` manually to mask the account number.
#[derive(Clone, Default)]
pub struct CheckoutForm {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub account_number: String,
}

impl fmt::Debug for CheckoutForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutForm")
            .field("full_name", &self.full_name)
            .field("phone", &self.phone)
            .field("email", &self.email)
            .field("address", &self.address)
            .field("account_number", &"[REDACTED]")
            .finish()
    }
}

/// Form fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckoutField {
    FullName,
    Phone,
    Email,
    Address,
    AccountNumber,
}

impl CheckoutField {
    /// Field name as used by the form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Address => "address",
            Self::AccountNumber => "accountNumber",
        }
    }
}

impl fmt::Display for CheckoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-to-message map of everything wrong with a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<CheckoutField, String>);

impl ValidationErrors {
    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message for one field, if it failed.
    #[must_use]
    pub fn get(&self, field: CheckoutField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Failing fields and their messages, in form order.
    pub fn iter(&self) -> impl Iterator<Item = (CheckoutField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn insert(&mut self, field: CheckoutField, message: &str) {
        self.0.insert(field, message.to_string());
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// A form that passed validation.
#[derive(Debug, Clone)]
pub struct CheckoutDetails {
    pub full_name: String,
    pub phone: PhoneNumber,
    pub email: Email,
    pub address: String,
    pub account_number: AccountNumber,
}

impl CheckoutForm {
    /// Validate every field, collecting all failures.
    ///
    /// # Errors
    ///
    /// Returns the field-to-message map when any field is invalid.
    pub fn validate(&self) -> Result<CheckoutDetails, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            errors.insert(CheckoutField::FullName, "Full name is required");
        }

        let phone = PhoneNumber::parse(&self.phone)
            .map_err(|e| match e {
                DigitsError::Empty => errors.insert(CheckoutField::Phone, "Phone number is required"),
                DigitsError::InvalidLength { .. } => {
                    errors.insert(CheckoutField::Phone, "Please enter a valid phone number");
                }
            })
            .ok();

        let email = Email::parse(&self.email)
            .map_err(|e| match e {
                EmailError::Empty => errors.insert(CheckoutField::Email, "Email is required"),
                _ => errors.insert(CheckoutField::Email, "Please enter a valid email address"),
            })
            .ok();

        let address = self.address.trim();
        if address.is_empty() {
            errors.insert(CheckoutField::Address, "Address is required");
        }

        let account_number = AccountNumber::parse(&self.account_number)
            .map_err(|e| match e {
                DigitsError::Empty => {
                    errors.insert(CheckoutField::AccountNumber, "Account number is required");
                }
                DigitsError::InvalidLength { .. } => {
                    errors.insert(
                        CheckoutField::AccountNumber,
                        "Please enter a valid account number",
                    );
                }
            })
            .ok();

        match (phone, email, account_number) {
            (Some(phone), Some(email), Some(account_number)) if errors.is_empty() => {
                Ok(CheckoutDetails {
                    full_name: full_name.to_string(),
                    phone,
                    email,
                    address: address.to_string(),
                    account_number,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutConfirmation {
    /// Local reference for the order
    pub order_ref: Uuid,
    /// Name the order was placed under
    pub full_name: String,
    /// Totals of the cart as it was checked out
    pub totals: CartTotals,
    /// Number of units purchased
    pub item_count: u64,
    pub placed_at: DateTime<Utc>,
}

impl CheckoutConfirmation {
    /// Success message shown to the shopper.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Transaction success by {} with total price {}.",
            self.full_name,
            self.totals.grand_total_display()
        )
    }

    /// Where the front end goes after a successful checkout.
    #[must_use]
    pub const fn next_route(&self) -> Route {
        Route::About
    }
}

/// Errors returned by checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to check out.
    #[error("Your cart is empty")]
    EmptyCart,

    /// The form has invalid fields.
    #[error("Invalid checkout form: {0}")]
    Invalid(#[from] ValidationErrors),
}

impl CheckoutError {
    /// Where the front end should send the shopper, if anywhere.
    #[must_use]
    pub const fn redirect(&self) -> Option<Route> {
        match self {
            Self::EmptyCart => Some(Route::Products),
            Self::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            full_name: "Jane Doe".to_string(),
            phone: "(555) 123-4567".to_string(),
            email: "jane@example.com".to_string(),
            address: "1 Main St".to_string(),
            account_number: "1234 5678 9012".to_string(),
        }
    }

    #[test]
    fn test_valid_form_normalizes() {
        let details = valid_form().validate().unwrap();
        assert_eq!(details.full_name, "Jane Doe");
        assert_eq!(details.phone.as_str(), "5551234567");
        assert_eq!(details.email.as_str(), "jane@example.com");
        assert_eq!(details.account_number.last_four(), "9012");
    }

    #[test]
    fn test_blank_form_reports_every_field() {
        let errors = CheckoutForm::default().validate().unwrap_err();

        assert_eq!(errors.len(), 5);
        assert_eq!(errors.get(CheckoutField::FullName), Some("Full name is required"));
        assert_eq!(errors.get(CheckoutField::Phone), Some("Phone number is required"));
        assert_eq!(errors.get(CheckoutField::Email), Some("Email is required"));
        assert_eq!(errors.get(CheckoutField::Address), Some("Address is required"));
        assert_eq!(
            errors.get(CheckoutField::AccountNumber),
            Some("Account number is required")
        );
    }

    #[test]
    fn test_short_phone_rejected() {
        let form = CheckoutForm {
            phone: "123".to_string(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(CheckoutField::Phone),
            Some("Please enter a valid phone number")
        );
    }

    #[test]
    fn test_malformed_email_and_account() {
        let form = CheckoutForm {
            email: "jane@localhost".to_string(),
            account_number: "12-34".to_string(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();

        assert_eq!(
            errors.get(CheckoutField::Email),
            Some("Please enter a valid email address")
        );
        assert_eq!(
            errors.get(CheckoutField::AccountNumber),
            Some("Please enter a valid account number")
        );
        assert_eq!(
            errors.to_string(),
            "email: Please enter a valid email address; accountNumber: Please enter a valid account number"
        );
    }

    #[test]
    fn test_whitespace_name_is_blank() {
        let form = CheckoutForm {
            full_name: "   ".to_string(),
            ..valid_form()
        };
        assert!(form.validate().unwrap_err().get(CheckoutField::FullName).is_some());
    }

    #[test]
    fn test_debug_masks_account_number() {
        let output = format!("{:?}", valid_form());
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("1234 5678 9012"));
    }

    #[test]
    fn test_confirmation_message_and_route() {
        let confirmation = CheckoutConfirmation {
            order_ref: Uuid::nil(),
            full_name: "Jane Doe".to_string(),
            totals: CartTotals {
                subtotal: rust_decimal::Decimal::from(25),
                tax: rust_decimal::Decimal::new(25, 1),
                shipping: rust_decimal::Decimal::from(5),
                grand_total: rust_decimal::Decimal::new(325, 1),
            },
            item_count: 3,
            placed_at: Utc::now(),
        };

        assert_eq!(
            confirmation.message(),
            "Transaction success by Jane Doe with total price $32.50."
        );
        assert_eq!(confirmation.next_route().path(), "/about");
    }

    #[test]
    fn test_empty_cart_redirects_to_products() {
        assert_eq!(CheckoutError::EmptyCart.redirect(), Some(Route::Products));
        assert_eq!(
            CheckoutError::Invalid(ValidationErrors::default()).redirect(),
            None
        );
    }
}
