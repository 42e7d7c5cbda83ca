//! Chart of accounts: groups, ledgers and the group hierarchy

use bigdecimal::BigDecimal;
use std::collections::HashSet;
use tracing::warn;

use crate::state::CompanyData;
use crate::traits::*;
use crate::types::*;

/// Request to create an account group
#[derive(Debug, Clone, PartialEq)]
pub struct NewGroup {
    pub name: String,
    pub parent_group_id: Option<String>,
    pub group_type: AccountType,
}

impl NewGroup {
    /// A root group of the given statement type
    pub fn new(name: impl Into<String>, group_type: AccountType) -> Self {
        Self {
            name: name.into(),
            parent_group_id: None,
            group_type,
        }
    }

    /// Place the group under an existing parent
    pub fn under(mut self, parent_group_id: impl Into<String>) -> Self {
        self.parent_group_id = Some(parent_group_id.into());
        self
    }
}

/// Request to create a ledger; optional statutory fields are set with the
/// `with_*` methods
#[derive(Debug, Clone, PartialEq)]
pub struct NewLedger {
    pub name: String,
    pub group_id: String,
    pub opening_balance: BigDecimal,
    pub opening_balance_type: EntryType,
    pub tax_details: Option<TaxDetails>,
    pub bank_details: Option<BankDetails>,
    pub currency: Option<String>,
    pub interest_rate: Option<BigDecimal>,
}

impl NewLedger {
    pub fn new(
        name: impl Into<String>,
        group_id: impl Into<String>,
        opening_balance: BigDecimal,
        opening_balance_type: EntryType,
    ) -> Self {
        Self {
            name: name.into(),
            group_id: group_id.into(),
            opening_balance,
            opening_balance_type,
            tax_details: None,
            bank_details: None,
            currency: None,
            interest_rate: None,
        }
    }

    pub fn with_tax_details(mut self, tax_details: TaxDetails) -> Self {
        self.tax_details = Some(tax_details);
        self
    }

    pub fn with_bank_details(mut self, bank_details: BankDetails) -> Self {
        self.bank_details = Some(bank_details);
        self
    }

    pub fn with_interest_rate(mut self, interest_rate: BigDecimal) -> Self {
        self.interest_rate = Some(interest_rate);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }
}

/// Built-in checks for a new group
pub fn group_violations(group: &NewGroup, data: &CompanyData) -> Violations {
    let mut violations = Vec::new();
    if group.name.trim().is_empty() {
        violations.push(Violation::EmptyName { master: "Group" });
    }
    if let Some(parent_id) = &group.parent_group_id {
        if data.group(parent_id).is_none() {
            violations.push(Violation::UnknownParent {
                master: "group",
                parent_id: parent_id.clone(),
            });
        }
    }
    violations.into()
}

/// Built-in checks for a new ledger
pub fn ledger_violations(ledger: &NewLedger, data: &CompanyData) -> Violations {
    let mut violations = Vec::new();
    if ledger.name.trim().is_empty() {
        violations.push(Violation::EmptyName { master: "Ledger" });
    }
    if data.group(&ledger.group_id).is_none() {
        violations.push(Violation::UnknownGroup {
            group_id: ledger.group_id.clone(),
        });
    }
    if ledger.opening_balance < BigDecimal::from(0) {
        violations.push(Violation::NegativeValue {
            field: "Opening balance",
        });
    }
    violations.extend(ledger.tax_details.as_ref().and_then(TaxDetails::rate_violation));
    violations.into()
}

impl CompanyData {
    /// Create a new account group
    pub fn create_group(&mut self, new: NewGroup, rules: &Rules<'_>) -> LedgerResult<AccountGroup> {
        let mut violations = group_violations(&new, self);
        violations.extend(rules.masters.validate_group(&new, self));
        violations.into_result()?;

        let group = AccountGroup::new(
            uuid::Uuid::new_v4().to_string(),
            new.name.trim(),
            new.parent_group_id,
            new.group_type,
        );
        self.groups.push(group.clone());
        Ok(group)
    }

    /// Create a new ledger under an existing group
    pub fn create_ledger(&mut self, new: NewLedger, rules: &Rules<'_>) -> LedgerResult<Ledger> {
        let mut violations = ledger_violations(&new, self);
        violations.extend(rules.masters.validate_ledger(&new, self));
        violations.into_result()?;

        let ledger = Ledger {
            id: uuid::Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            group_id: new.group_id,
            opening_balance: new.opening_balance,
            opening_balance_type: new.opening_balance_type,
            tax_details: new.tax_details,
            bank_details: new.bank_details,
            currency: new.currency,
            interest_rate: new.interest_rate,
        };
        self.ledgers.push(ledger.clone());
        Ok(ledger)
    }

    /// Walk from a group up through its ancestors to the root.
    ///
    /// The walk stops after `max_hops` groups; a revisited group or an
    /// over-long chain is reported as a structural error instead of looping.
    pub fn resolve_group_chain(
        &self,
        group_id: &str,
        max_hops: usize,
    ) -> LedgerResult<Vec<&AccountGroup>> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = self.require_group(group_id)?;

        loop {
            if !visited.insert(current.id.as_str()) || chain.len() >= max_hops {
                warn!(group_id, hops = chain.len(), "group parent chain does not terminate");
                return Err(LedgerError::Structural(format!(
                    "Group '{}' has a cyclic or unbounded parent chain",
                    group_id
                )));
            }
            chain.push(current);

            match &current.parent_group_id {
                None => return Ok(chain),
                Some(parent_id) => {
                    current = self
                        .group(parent_id)
                        .ok_or_else(|| LedgerError::not_found(EntityKind::Group, parent_id))?;
                }
            }
        }
    }

    /// Root of the group's tree
    pub fn root_group(&self, group_id: &str, max_hops: usize) -> LedgerResult<&AccountGroup> {
        let chain = self.resolve_group_chain(group_id, max_hops)?;
        chain
            .last()
            .copied()
            .ok_or_else(|| LedgerError::not_found(EntityKind::Group, group_id))
    }

    /// Direct sub-groups of a group
    pub fn child_groups(&self, group_id: &str) -> Vec<&AccountGroup> {
        self.groups
            .iter()
            .filter(|g| g.parent_group_id.as_deref() == Some(group_id))
            .collect()
    }

    /// Ledgers attached directly to a group
    pub fn ledgers_in_group(&self, group_id: &str) -> Vec<&Ledger> {
        self.ledgers
            .iter()
            .filter(|l| l.group_id == group_id)
            .collect()
    }

    /// Root groups of one statement type, in chart order
    pub fn top_level_groups(&self, group_type: AccountType) -> Vec<&AccountGroup> {
        self.groups
            .iter()
            .filter(|g| g.is_root() && g.group_type == group_type)
            .collect()
    }

    /// Case-insensitive ledger lookup by name
    pub fn find_ledger_by_name(&self, name: &str) -> Option<&Ledger> {
        let name = name.trim();
        self.ledgers
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name))
    }
}

/// Seed masters for a new company
pub mod seed {
    use super::*;
    use crate::inventory::{Godown, Unit};

    /// The eleven predefined groups covering the four statement types
    pub fn default_groups() -> Vec<AccountGroup> {
        use AccountType::*;

        let child = |id: &str, name: &str, parent: &str, group_type| {
            AccountGroup::new(id, name, Some(parent.to_string()), group_type)
        };
        vec![
            AccountGroup::new("g1", "Capital Account", None, Liability),
            AccountGroup::new("g2", "Current Assets", None, Asset),
            child("g3", "Bank Accounts", "g2", Asset),
            child("g4", "Cash-in-hand", "g2", Asset),
            AccountGroup::new("g5", "Sales Accounts", None, Income),
            AccountGroup::new("g6", "Purchase Accounts", None, Expense),
            AccountGroup::new("g7", "Direct Expenses", None, Expense),
            AccountGroup::new("g8", "Indirect Expenses", None, Expense),
            child("g9", "Sundry Debtors", "g2", Asset),
            AccountGroup::new("g10", "Sundry Creditors", None, Liability),
            AccountGroup::new("g11", "Duties & Taxes", None, Liability),
        ]
    }

    /// Cash and the Profit & Loss A/c, both with zero opening balance
    pub fn default_ledgers() -> Vec<Ledger> {
        let ledger = |id: &str, name: &str, group_id: &str, side| Ledger {
            id: id.to_string(),
            name: name.to_string(),
            group_id: group_id.to_string(),
            opening_balance: BigDecimal::from(0),
            opening_balance_type: side,
            tax_details: None,
            bank_details: None,
            currency: None,
            interest_rate: None,
        };
        vec![
            ledger("l1", "Cash", "g4", EntryType::Debit),
            ledger("l2", "Profit & Loss A/c", "g1", EntryType::Credit),
        ]
    }

    pub fn default_godowns() -> Vec<Godown> {
        vec![Godown {
            id: "gd1".to_string(),
            name: "Main Location".to_string(),
            location: Some("Head Office".to_string()),
        }]
    }

    pub fn default_units() -> Vec<Unit> {
        vec![Unit {
            id: "u1".to_string(),
            name: "Nos".to_string(),
            formal_name: "Numbers".to_string(),
        }]
    }
}
