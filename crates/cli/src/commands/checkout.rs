//! Checkout command.

use std::io::{self, Write};

use fakestore_storefront::checkout::{CheckoutConfirmation, CheckoutError, CheckoutForm};
use fakestore_storefront::{AppError, StorefrontSession};

use super::cart::write_totals;
use crate::CliError;

/// Validate the form and place the order.
///
/// Field errors are printed one per line before the command fails.
pub fn run(session: &mut StorefrontSession, form: &CheckoutForm) -> Result<(), CliError> {
    match session.checkout(form) {
        Ok(confirmation) => {
            write_confirmation(&mut io::stdout().lock(), &confirmation)?;
            Ok(())
        }
        Err(AppError::Checkout(CheckoutError::Invalid(errors))) => {
            let mut err = io::stderr().lock();
            for (field, message) in errors.iter() {
                writeln!(err, "  {field}: {message}")?;
            }
            Err(AppError::Checkout(CheckoutError::Invalid(errors)).into())
        }
        Err(e) => Err(e.into()),
    }
}

fn write_confirmation(
    out: &mut impl Write,
    confirmation: &CheckoutConfirmation,
) -> io::Result<()> {
    writeln!(out, "{}", confirmation.message())?;
    writeln!(out, "Order reference: {}", confirmation.order_ref)?;
    writeln!(out, "Items: {}", confirmation.item_count)?;
    write_totals(out, &confirmation.totals)?;
    writeln!(out, "Continue at {}", confirmation.next_route())
}
