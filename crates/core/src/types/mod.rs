//! Core types for the Fake Store storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use contact::{AccountNumber, DigitsError, PhoneNumber};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError, format_money, round_to_cents};
pub use status::CartState;
