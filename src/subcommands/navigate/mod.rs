//! Subcommands pertaining to moving around a stack.

mod checkout;
pub use checkout::CheckoutCmd;
