//! # Bookkeeping Core
//!
//! A single-company double-entry bookkeeping engine: a chart of accounts
//! built from nested groups, vouchers posted against ledgers, an inventory
//! model with godowns and batches, and statements derived on demand.
//!
//! ## Features
//!
//! - **Voucher posting**: every voucher is checked for balance and references before it lands
//! - **Group rollups**: balances of nested account groups with cycle detection
//! - **Inventory**: stock items, godowns, units and batches with movement-aware valuation
//! - **Financial reporting**: profit & loss, balance sheet, trial balance, day book and drill-down
//! - **GST**: sales register with CGST/SGST or IGST split by place of supply
//! - **Storage abstraction**: whole-snapshot persistence behind [`CompanyStorage`]
//!
//! ## Quick Start
//!
//! ```rust
//! use bookkeeping_core::utils::MemoryStorage;
//! use bookkeeping_core::{patterns, Book, BookConfig, EntryType, NewLedger};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! # async fn run() -> bookkeeping_core::LedgerResult<()> {
//! let mut book = Book::open(MemoryStorage::new(), BookConfig::default()).await?;
//! let sales = book
//!     .create_ledger(NewLedger::new("Sales", "g5", BigDecimal::from(0), EntryType::Credit))
//!     .await?;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
//! book.create_voucher(patterns::sale(date, "l1", &sales.id, BigDecimal::from(1000), "Counter sale")?)
//!     .await?;
//! assert_eq!(book.ledger_balance("l1")?.to_string(), "1000.00 Dr");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod inventory;
pub mod ledger;
pub mod observability;
pub mod payroll;
pub mod reconciliation;
pub mod reports;
pub mod state;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::BookConfig;
pub use inventory::{
    Batch, Godown, NewBatch, NewGodown, NewStockGroup, NewStockItem, NewUnit, StockGroup,
    StockItem, Unit,
};
pub use ledger::*;
pub use payroll::{Employee, NewEmployee};
pub use state::{transition, Action, CompanyData, Master, Outcome};
pub use tax::gst::*;
pub use traits::*;
pub use types::*;

// Re-export voucher patterns for convenience
pub use ledger::transaction::patterns;
