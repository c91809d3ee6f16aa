//! Fake Store storefront library.
//!
//! Cart state and totals, local persistence, checkout validation, and the
//! catalog API client. The `fakestore` CLI drives everything through a
//! [`state::StorefrontSession`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod state;
pub mod storage;

pub use error::{AppError, Result};
pub use state::StorefrontSession;
