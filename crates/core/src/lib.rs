//! Fake Store Core - Shared types library.
//!
//! This crate provides common types used across all Fake Store components:
//! - `storefront` - Cart engine, checkout, and catalog client
//! - `cli` - Command-line front end for browsing, cart, checkout, and admin
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, contact details, and states

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
