//! Command implementations.
//!
//! Each command renders to a writer so output can be checked in tests; the
//! public entry points write to stdout.

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod products;
