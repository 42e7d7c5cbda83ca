//! Book: the single writer that owns a company's state and its storage

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::BookConfig;
use crate::inventory::{
    Batch, Godown, NewBatch, NewGodown, NewStockGroup, NewStockItem, NewUnit, StockGroup,
    StockItem, Unit,
};
use crate::ledger::account::{NewGroup, NewLedger};
use crate::ledger::transaction::NewVoucher;
use crate::payroll::{Employee, NewEmployee};
use crate::reconciliation::{find_allocation_overrides, AllocationMismatch};
use crate::reports::{self, *};
use crate::state::{self, transition, Action, CompanyData, Master, Outcome};
use crate::traits::*;
use crate::types::*;

/// Book of accounts for one company
///
/// Every write computes the next state from the current one, persists it,
/// and only then replaces the in-memory state. A rejected action or a failed
/// save leaves the book exactly as it was.
pub struct Book<S: CompanyStorage> {
    storage: S,
    state: CompanyData,
    config: BookConfig,
    master_validator: Box<dyn MasterValidator>,
    voucher_validator: Box<dyn VoucherValidator>,
}

impl<S: CompanyStorage> Book<S> {
    /// Open the book held by `storage`, seeding a new company when it is empty
    pub async fn open(storage: S, config: BookConfig) -> LedgerResult<Self> {
        Self::open_with_validators(
            storage,
            config,
            Box::new(DefaultMasterValidator),
            Box::new(DefaultVoucherValidator),
        )
        .await
    }

    /// Open the book with custom validators
    pub async fn open_with_validators(
        mut storage: S,
        config: BookConfig,
        master_validator: Box<dyn MasterValidator>,
        voucher_validator: Box<dyn VoucherValidator>,
    ) -> LedgerResult<Self> {
        let state = match storage.load().await? {
            Some(mut state) => {
                state.normalize_sequence();
                info!(
                    ledgers = state.ledgers.len(),
                    vouchers = state.vouchers.len(),
                    "company loaded"
                );
                state
            }
            None => {
                let today = chrono::Local::now().date_naive();
                let state = CompanyData::seeded(CompanyData::financial_year_containing(today));
                storage.save(&state).await?;
                info!(financial_year_start = %state.financial_year_start, "new company seeded");
                state
            }
        };

        Ok(Self {
            storage,
            state,
            config,
            master_validator,
            voucher_validator,
        })
    }

    fn rules(&self) -> Rules<'_> {
        Rules {
            config: &self.config,
            masters: self.master_validator.as_ref(),
            vouchers: self.voucher_validator.as_ref(),
        }
    }

    /// Current snapshot
    pub fn state(&self) -> &CompanyData {
        &self.state
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Apply one action: transition, persist, then swap in the new state
    pub async fn dispatch(&mut self, action: Action) -> LedgerResult<Outcome> {
        let label = action_label(&action);

        let (next, outcome) = match transition(&self.state, action, &self.rules()) {
            Ok(applied) => applied,
            Err(err) => {
                warn!(
                    action = label,
                    violations = err.violations().len(),
                    error = %err,
                    "action rejected"
                );
                return Err(err);
            }
        };

        if let Err(err) = self.storage.save(&next).await {
            warn!(action = label, error = %err, "failed to persist company, change discarded");
            return Err(err);
        }

        self.state = next;
        info!(action = label, outcome = outcome_label(&outcome), "action applied");
        Ok(outcome)
    }

    // Master operations
    pub async fn create_group(&mut self, group: NewGroup) -> LedgerResult<AccountGroup> {
        match self.dispatch(Action::CreateMaster(Master::Group(group))).await? {
            Outcome::Group(group) => Ok(group),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn create_ledger(&mut self, ledger: NewLedger) -> LedgerResult<Ledger> {
        match self.dispatch(Action::CreateMaster(Master::Ledger(ledger))).await? {
            Outcome::Ledger(ledger) => Ok(ledger),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn create_stock_group(&mut self, group: NewStockGroup) -> LedgerResult<StockGroup> {
        match self.dispatch(Action::CreateMaster(Master::StockGroup(group))).await? {
            Outcome::StockGroup(group) => Ok(group),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn create_stock_item(&mut self, item: NewStockItem) -> LedgerResult<StockItem> {
        match self.dispatch(Action::CreateMaster(Master::StockItem(item))).await? {
            Outcome::StockItem(item) => Ok(item),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn create_godown(&mut self, godown: NewGodown) -> LedgerResult<Godown> {
        match self.dispatch(Action::CreateMaster(Master::Godown(godown))).await? {
            Outcome::Godown(godown) => Ok(godown),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn create_unit(&mut self, unit: NewUnit) -> LedgerResult<Unit> {
        match self.dispatch(Action::CreateMaster(Master::Unit(unit))).await? {
            Outcome::Unit(unit) => Ok(unit),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn create_batch(&mut self, batch: NewBatch) -> LedgerResult<Batch> {
        match self.dispatch(Action::CreateMaster(Master::Batch(batch))).await? {
            Outcome::Batch(batch) => Ok(batch),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn create_employee(&mut self, employee: NewEmployee) -> LedgerResult<Employee> {
        match self.dispatch(Action::CreateMaster(Master::Employee(employee))).await? {
            Outcome::Employee(employee) => Ok(employee),
            other => Err(unexpected(&other)),
        }
    }

    // Voucher operations
    /// Validate and post a voucher
    pub async fn create_voucher(&mut self, voucher: NewVoucher) -> LedgerResult<Voucher> {
        match self.dispatch(Action::CreateVoucher(voucher)).await? {
            Outcome::Voucher(voucher) => Ok(voucher),
            other => Err(unexpected(&other)),
        }
    }

    /// Delete a voucher; returns whether it existed. Unknown ids are a no-op
    /// and do not touch storage.
    pub async fn delete_voucher(&mut self, voucher_id: &str) -> LedgerResult<bool> {
        if self.state.voucher(voucher_id).is_none() {
            debug!(voucher_id, "delete of unknown voucher ignored");
            return Ok(false);
        }
        match self
            .dispatch(Action::DeleteVoucher(voucher_id.to_string()))
            .await?
        {
            Outcome::VoucherDeleted { existed, .. } => Ok(existed),
            other => Err(unexpected(&other)),
        }
    }

    // Import / export
    pub fn export_json(&self) -> LedgerResult<String> {
        state::export_json(&self.state)
    }

    /// Replace the whole company with an imported snapshot.
    ///
    /// The document is parsed and checked before anything changes; on any
    /// failure the current state is kept.
    pub async fn import_json(&mut self, text: &str) -> LedgerResult<()> {
        let imported = match state::import_json(text, &self.rules()) {
            Ok(imported) => imported,
            Err(err) => {
                warn!(error = %err, "import rejected");
                return Err(err);
            }
        };

        self.storage.save(&imported).await?;
        info!(
            ledgers = imported.ledgers.len(),
            vouchers = imported.vouchers.len(),
            "company imported"
        );
        self.state = imported;
        Ok(())
    }

    // Balances and reports
    pub fn ledger_balance(&self, ledger_id: &str) -> LedgerResult<Balance> {
        self.state.ledger_balance(ledger_id)
    }

    pub fn group_balance(&self, group_id: &str) -> LedgerResult<Balance> {
        self.state.group_balance(group_id)
    }

    pub fn profit_and_loss(&self) -> LedgerResult<ProfitAndLoss> {
        reports::profit_and_loss(&self.state)
    }

    pub fn balance_sheet(&self) -> LedgerResult<BalanceSheet> {
        reports::balance_sheet(&self.state, &self.config.balance_tolerance)
    }

    pub fn trial_balance(&self) -> TrialBalance {
        reports::trial_balance(&self.state, &self.config.balance_tolerance)
    }

    pub fn stock_valuation(&self) -> StockValuation {
        reports::stock_valuation(&self.state, self.config.stock_valuation)
    }

    pub fn day_book(&self) -> Vec<DayBookRow> {
        reports::day_book(&self.state)
    }

    pub fn gst_sales_register(&self) -> LedgerResult<GstSalesRegister> {
        reports::gst_sales_register(&self.state, &self.config.gst)
    }

    pub fn pay_sheet(&self) -> PaySheet {
        reports::pay_sheet(&self.state, &self.config.payroll)
    }

    pub fn group_drill_down(&self, group_id: &str) -> LedgerResult<GroupDrillDown> {
        reports::group_drill_down(&self.state, group_id)
    }

    pub fn ledger_vouchers(&self, ledger_id: &str) -> LedgerResult<LedgerVouchers> {
        reports::ledger_vouchers(&self.state, ledger_id)
    }

    /// Entries whose typed amount was overridden by their allocations
    pub fn allocation_overrides(&self) -> Vec<AllocationMismatch> {
        find_allocation_overrides(&self.state.vouchers, &self.config.balance_tolerance)
    }

    /// Validate the integrity of the book
    pub fn validate_integrity(&self) -> LedgerResult<LedgerIntegrityReport> {
        let mut issues = self.state.integrity_issues(&self.rules());
        let trial_balance = self.trial_balance();
        let balance_sheet = self.balance_sheet()?;

        if !trial_balance.is_balanced {
            issues.push(format!(
                "Trial balance is not balanced: debits = {}, credits = {}",
                format_amount(&trial_balance.total_debit),
                format_amount(&trial_balance.total_credit)
            ));
        }
        if !balance_sheet.is_balanced {
            issues.push(format!(
                "Balance sheet is not balanced: assets = {}, liabilities = {}",
                format_amount(&balance_sheet.total_assets),
                format_amount(&balance_sheet.total_liabilities)
            ));
        }

        Ok(LedgerIntegrityReport {
            is_valid: issues.is_empty(),
            issues,
            trial_balance_total_debit: trial_balance.total_debit,
            trial_balance_total_credit: trial_balance.total_credit,
            balance_sheet_total_assets: balance_sheet.total_assets,
            balance_sheet_total_liabilities: balance_sheet.total_liabilities,
        })
    }
}

fn action_label(action: &Action) -> &'static str {
    match action {
        Action::CreateMaster(Master::Group(_)) => "create_group",
        Action::CreateMaster(Master::Ledger(_)) => "create_ledger",
        Action::CreateMaster(Master::StockGroup(_)) => "create_stock_group",
        Action::CreateMaster(Master::StockItem(_)) => "create_stock_item",
        Action::CreateMaster(Master::Godown(_)) => "create_godown",
        Action::CreateMaster(Master::Unit(_)) => "create_unit",
        Action::CreateMaster(Master::Batch(_)) => "create_batch",
        Action::CreateMaster(Master::Employee(_)) => "create_employee",
        Action::CreateVoucher(_) => "create_voucher",
        Action::DeleteVoucher(_) => "delete_voucher",
    }
}

fn outcome_label(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Group(g) => g.id.clone(),
        Outcome::Ledger(l) => l.id.clone(),
        Outcome::StockGroup(g) => g.id.clone(),
        Outcome::StockItem(i) => i.id.clone(),
        Outcome::Godown(g) => g.id.clone(),
        Outcome::Unit(u) => u.id.clone(),
        Outcome::Batch(b) => b.id.clone(),
        Outcome::Employee(e) => e.id.clone(),
        Outcome::Voucher(v) => format!("#{} {}", v.number, v.id),
        Outcome::VoucherDeleted { id, .. } => id.clone(),
    }
}

fn unexpected(outcome: &Outcome) -> LedgerError {
    LedgerError::Structural(format!("unexpected outcome {}", outcome_label(outcome)))
}

/// Report on book integrity and validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerIntegrityReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub trial_balance_total_debit: BigDecimal,
    pub trial_balance_total_credit: BigDecimal,
    pub balance_sheet_total_assets: BigDecimal,
    pub balance_sheet_total_liabilities: BigDecimal,
}
