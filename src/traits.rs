//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use bigdecimal::BigDecimal;

use crate::config::BookConfig;
use crate::inventory::NewStockItem;
use crate::ledger::account::{NewGroup, NewLedger};
use crate::ledger::transaction::NewVoucher;
use crate::payroll::NewEmployee;
use crate::state::CompanyData;
use crate::types::*;

/// Storage abstraction for company snapshots
///
/// The engine persists the whole snapshot after every accepted write, so a
/// backend only needs to load and replace it (JSON file, in-memory, a
/// database row, etc.).
#[async_trait]
pub trait CompanyStorage: Send + Sync {
    /// Load the persisted snapshot, `None` when nothing was saved yet
    async fn load(&self) -> LedgerResult<Option<CompanyData>>;

    /// Replace the persisted snapshot
    async fn save(&mut self, data: &CompanyData) -> LedgerResult<()>;
}

/// Trait for implementing custom master validation rules
///
/// The built-in reference and name checks always run first; a validator
/// only contributes extra violations on top of them.
pub trait MasterValidator: Send + Sync {
    fn validate_group(&self, _group: &NewGroup, _data: &CompanyData) -> Violations {
        Violations::default()
    }

    fn validate_ledger(&self, _ledger: &NewLedger, _data: &CompanyData) -> Violations {
        Violations::default()
    }

    fn validate_stock_item(&self, _item: &NewStockItem, _data: &CompanyData) -> Violations {
        Violations::default()
    }

    fn validate_employee(&self, _employee: &NewEmployee, _data: &CompanyData) -> Violations {
        Violations::default()
    }
}

/// Trait for implementing custom voucher validation rules
///
/// Balance and reference checks are not overridable; they run before any
/// custom rule.
pub trait VoucherValidator: Send + Sync {
    /// Extra checks before posting
    fn validate_voucher(
        &self,
        _voucher: &NewVoucher,
        _data: &CompanyData,
        _tolerance: &BigDecimal,
    ) -> Violations {
        Violations::default()
    }
}

/// Default master validator with the built-in rules only
pub struct DefaultMasterValidator;

impl MasterValidator for DefaultMasterValidator {}

/// Default voucher validator with the built-in rules only
pub struct DefaultVoucherValidator;

impl VoucherValidator for DefaultVoucherValidator {}

/// Configuration and validators in effect for one write
#[derive(Clone, Copy)]
pub struct Rules<'a> {
    pub config: &'a BookConfig,
    pub masters: &'a dyn MasterValidator,
    pub vouchers: &'a dyn VoucherValidator,
}

impl<'a> Rules<'a> {
    /// Built-in validators with the given configuration
    pub fn standard(config: &'a BookConfig) -> Self {
        Self {
            config,
            masters: &DefaultMasterValidator,
            vouchers: &DefaultVoucherValidator,
        }
    }

    pub fn tolerance(&self) -> &BigDecimal {
        &self.config.balance_tolerance
    }
}

impl std::fmt::Debug for Rules<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rules")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}
