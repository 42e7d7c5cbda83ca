//! Ledger module containing masters, vouchers, balances and the book boundary

pub mod account;
pub mod balance;
pub mod core;
pub mod transaction;

pub use account::*;
pub use balance::*;
pub use core::*;
pub use transaction::*;
