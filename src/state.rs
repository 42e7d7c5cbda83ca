//! Company snapshot and the transitions that mutate it
//!
//! Every write is an explicit `(state, action) -> state'` transition. The
//! boundary ([`crate::Book`]) owns the only mutable reference and persists the
//! result; everything here is synchronous and side-effect free.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::inventory::{Batch, Godown, NewBatch, NewGodown, NewStockGroup, NewStockItem, NewUnit};
use crate::inventory::{StockGroup, StockItem, Unit};
use crate::ledger::account::seed;
use crate::ledger::transaction::{validate_voucher, NewVoucher};
use crate::ledger::{NewGroup, NewLedger};
use crate::payroll::{Employee, NewEmployee};
use crate::traits::*;
use crate::types::*;

/// Serializable state of one company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyData {
    pub groups: Vec<AccountGroup>,
    pub ledgers: Vec<Ledger>,
    #[serde(default)]
    pub stock_groups: Vec<StockGroup>,
    #[serde(default)]
    pub stock_items: Vec<StockItem>,
    #[serde(default)]
    pub units: Vec<Unit>,
    /// Older snapshots predate godowns; they get the seed location
    #[serde(default = "seed::default_godowns")]
    pub godowns: Vec<Godown>,
    #[serde(default)]
    pub batches: Vec<Batch>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub vouchers: Vec<Voucher>,
    pub financial_year_start: NaiveDate,
    /// Next number under the sequential policy; derived from the vouchers
    /// when missing
    #[serde(default)]
    pub next_voucher_number: u64,
}

impl CompanyData {
    /// Fresh company with the seed chart of accounts, godown and unit
    pub fn seeded(financial_year_start: NaiveDate) -> Self {
        Self {
            groups: seed::default_groups(),
            ledgers: seed::default_ledgers(),
            stock_groups: Vec::new(),
            stock_items: Vec::new(),
            units: seed::default_units(),
            godowns: seed::default_godowns(),
            batches: Vec::new(),
            employees: Vec::new(),
            vouchers: Vec::new(),
            financial_year_start,
            next_voucher_number: 1,
        }
    }

    /// Start (1 April) of the financial year the date falls in
    pub fn financial_year_containing(date: NaiveDate) -> NaiveDate {
        let year = if date.month() < 4 { date.year() - 1 } else { date.year() };
        NaiveDate::from_ymd_opt(year, 4, 1).unwrap_or(date)
    }

    pub fn group(&self, id: &str) -> Option<&AccountGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn ledger(&self, id: &str) -> Option<&Ledger> {
        self.ledgers.iter().find(|l| l.id == id)
    }

    pub fn voucher(&self, id: &str) -> Option<&Voucher> {
        self.vouchers.iter().find(|v| v.id == id)
    }

    pub fn stock_item(&self, id: &str) -> Option<&StockItem> {
        self.stock_items.iter().find(|i| i.id == id)
    }

    pub fn stock_group(&self, id: &str) -> Option<&StockGroup> {
        self.stock_groups.iter().find(|g| g.id == id)
    }

    pub fn godown(&self, id: &str) -> Option<&Godown> {
        self.godowns.iter().find(|g| g.id == id)
    }

    /// Units are referenced by stock items either by id or by short name
    pub fn unit(&self, id_or_name: &str) -> Option<&Unit> {
        self.units
            .iter()
            .find(|u| u.id == id_or_name || u.name.eq_ignore_ascii_case(id_or_name))
    }

    pub fn batch(&self, id: &str) -> Option<&Batch> {
        self.batches.iter().find(|b| b.id == id)
    }

    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    pub fn require_group(&self, id: &str) -> LedgerResult<&AccountGroup> {
        self.group(id)
            .ok_or_else(|| LedgerError::not_found(EntityKind::Group, id))
    }

    pub fn require_ledger(&self, id: &str) -> LedgerResult<&Ledger> {
        self.ledger(id)
            .ok_or_else(|| LedgerError::not_found(EntityKind::Ledger, id))
    }

    /// Apply one action in place. On error `self` is left untouched.
    pub fn apply(&mut self, action: Action, rules: &Rules<'_>) -> LedgerResult<Outcome> {
        match action {
            Action::CreateMaster(master) => self.create_master(master, rules),
            Action::CreateVoucher(voucher) => {
                self.create_voucher(voucher, rules).map(Outcome::Voucher)
            }
            Action::DeleteVoucher(id) => {
                let existed = self.delete_voucher(&id);
                Ok(Outcome::VoucherDeleted { id, existed })
            }
        }
    }

    fn create_master(&mut self, master: Master, rules: &Rules<'_>) -> LedgerResult<Outcome> {
        match master {
            Master::Group(new) => self.create_group(new, rules).map(Outcome::Group),
            Master::Ledger(new) => self.create_ledger(new, rules).map(Outcome::Ledger),
            Master::StockGroup(new) => self.create_stock_group(new).map(Outcome::StockGroup),
            Master::StockItem(new) => self.create_stock_item(new, rules).map(Outcome::StockItem),
            Master::Godown(new) => self.create_godown(new).map(Outcome::Godown),
            Master::Unit(new) => self.create_unit(new).map(Outcome::Unit),
            Master::Batch(new) => self.create_batch(new).map(Outcome::Batch),
            Master::Employee(new) => self.create_employee(new, rules).map(Outcome::Employee),
        }
    }

    /// Structural and accounting problems that make a snapshot unusable
    pub fn integrity_issues(&self, rules: &Rules<'_>) -> Vec<String> {
        let mut issues = Vec::new();

        for (label, ids) in [
            ("group", self.groups.iter().map(|g| g.id.as_str()).collect::<Vec<_>>()),
            ("ledger", self.ledgers.iter().map(|l| l.id.as_str()).collect()),
            ("voucher", self.vouchers.iter().map(|v| v.id.as_str()).collect()),
        ] {
            let mut seen = HashSet::new();
            for id in ids {
                if !seen.insert(id) {
                    issues.push(format!("Duplicate {label} id '{id}'"));
                }
            }
        }

        for group in &self.groups {
            if let Some(parent) = &group.parent_group_id {
                if self.group(parent).is_none() {
                    issues.push(format!(
                        "Group '{}' has unknown parent '{}'",
                        group.name, parent
                    ));
                    continue;
                }
            }
            if let Err(err) = self.resolve_group_chain(&group.id, rules.config.max_group_depth) {
                issues.push(err.to_string());
            }
        }

        for ledger in &self.ledgers {
            if self.group(&ledger.group_id).is_none() {
                issues.push(format!(
                    "Ledger '{}' belongs to unknown group '{}'",
                    ledger.name, ledger.group_id
                ));
            }
            if let Some(violation) = ledger.tax_details.as_ref().and_then(TaxDetails::rate_violation) {
                issues.push(format!("Ledger '{}': {}", ledger.name, violation));
            }
        }

        for item in &self.stock_items {
            if let Some(violation) = item.tax_details.as_ref().and_then(TaxDetails::rate_violation) {
                issues.push(format!("Stock item '{}': {}", item.name, violation));
            }
        }

        for voucher in &self.vouchers {
            let violations = validate_voucher(self, &voucher.entries, rules.tolerance());
            for violation in violations.iter() {
                issues.push(format!("Voucher #{}: {}", voucher.number, violation));
            }
        }

        issues
    }
}

/// Master record submitted for creation, one variant per master type
#[derive(Debug, Clone, PartialEq)]
pub enum Master {
    Group(NewGroup),
    Ledger(NewLedger),
    StockGroup(NewStockGroup),
    StockItem(NewStockItem),
    Godown(NewGodown),
    Unit(NewUnit),
    Batch(NewBatch),
    Employee(NewEmployee),
}

/// Every mutation the engine accepts
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CreateMaster(Master),
    CreateVoucher(NewVoucher),
    DeleteVoucher(String),
}

/// Record produced by an applied action
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Group(AccountGroup),
    Ledger(Ledger),
    StockGroup(StockGroup),
    StockItem(StockItem),
    Godown(Godown),
    Unit(Unit),
    Batch(Batch),
    Employee(Employee),
    Voucher(Voucher),
    VoucherDeleted { id: String, existed: bool },
}

/// Pure state transition: returns the next state, never touches `state`
pub fn transition(
    state: &CompanyData,
    action: Action,
    rules: &Rules<'_>,
) -> LedgerResult<(CompanyData, Outcome)> {
    let mut next = state.clone();
    let outcome = next.apply(action, rules)?;
    Ok((next, outcome))
}

/// Serialize a snapshot to the JSON interchange format
pub fn export_json(data: &CompanyData) -> LedgerResult<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Parse and check a JSON snapshot.
///
/// Fails with a serialization error when the text does not parse, does not
/// match the snapshot shape, or describes an inconsistent book.
pub fn import_json(text: &str, rules: &Rules<'_>) -> LedgerResult<CompanyData> {
    let mut data: CompanyData = serde_json::from_str(text)?;
    let issues = data.integrity_issues(rules);
    if !issues.is_empty() {
        return Err(LedgerError::Serialization(format!(
            "snapshot rejected: {}",
            issues.join("; ")
        )));
    }
    data.normalize_sequence();
    Ok(data)
}

impl CompanyData {
    /// Make `next_voucher_number` exceed every number in use
    pub(crate) fn normalize_sequence(&mut self) {
        let floor = self.vouchers.iter().map(|v| v.number).max().unwrap_or(0) + 1;
        self.next_voucher_number = self.next_voucher_number.max(floor);
    }
}
