//! Core types and data structures for the bookkeeping engine

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Statement type of an account group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Assets - what the business owns (Cash, Bank, Debtors, etc.)
    Asset,
    /// Liabilities - what the business owes, including capital
    Liability,
    /// Income - sales and other revenue
    Income,
    /// Expenses - purchases, direct and indirect costs
    Expense,
}

impl AccountType {
    /// Returns the normal balance side for this account type
    /// Assets and Expenses normally carry debit balances,
    /// Liabilities and Income normally carry credit balances
    pub fn normal_balance(&self) -> EntryType {
        match self {
            AccountType::Asset | AccountType::Expense => EntryType::Debit,
            AccountType::Liability | AccountType::Income => EntryType::Credit,
        }
    }

    /// Whether groups of this type appear on the Balance Sheet (as opposed to P&L)
    pub fn is_balance_sheet(&self) -> bool {
        matches!(self, AccountType::Asset | AccountType::Liability)
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccountType::Asset => "Asset",
            AccountType::Liability => "Liability",
            AccountType::Income => "Income",
            AccountType::Expense => "Expense",
        };
        f.write_str(label)
    }
}

/// Posting direction of a voucher entry or opening balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    /// Debit - increases Assets and Expenses
    #[serde(rename = "Dr")]
    Debit,
    /// Credit - increases Liabilities and Income
    #[serde(rename = "Cr")]
    Credit,
}

impl EntryType {
    /// Apply this side's sign to a magnitude (Dr positive, Cr negative)
    pub fn signed(&self, amount: &BigDecimal) -> BigDecimal {
        match self {
            EntryType::Debit => amount.clone(),
            EntryType::Credit => -amount.clone(),
        }
    }

    pub fn opposite(&self) -> EntryType {
        match self {
            EntryType::Debit => EntryType::Credit,
            EntryType::Credit => EntryType::Debit,
        }
    }

    /// Side on which a signed balance sits; zero is reported as Dr
    pub fn of_signed(balance: &BigDecimal) -> EntryType {
        if *balance < BigDecimal::from(0) {
            EntryType::Credit
        } else {
            EntryType::Debit
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryType::Debit => f.write_str("Dr"),
            EntryType::Credit => f.write_str("Cr"),
        }
    }
}

/// Node of the chart of accounts. Groups form a forest through
/// `parent_group_id` back-references; parents never hold child lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountGroup {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_group_id: Option<String>,
    #[serde(rename = "type")]
    pub group_type: AccountType,
}

impl AccountGroup {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_group_id: Option<String>,
        group_type: AccountType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_group_id,
            group_type,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_group_id.is_none()
    }
}

/// Statutory tax classification of a master
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxType {
    #[serde(rename = "GST")]
    Gst,
    #[serde(rename = "TDS")]
    Tds,
    None,
}

/// Tax registration details carried by ledgers and stock items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gstin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hsn_code: Option<String>,
    /// Tax rate in percent (e.g. 18 for 18%)
    #[serde(default, skip_serializing_if = "Option::is_none", with = "bigdecimal::serde::json_num_option")]
    pub tax_rate: Option<BigDecimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_type: Option<TaxType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<String>,
}

impl TaxDetails {
    /// Registered GSTIN, ignoring blank strings left behind by forms
    pub fn registered_gstin(&self) -> Option<&str> {
        self.gstin
            .as_deref()
            .map(str::trim)
            .filter(|gstin| !gstin.is_empty())
    }

    /// Two-digit state code prefix of the GSTIN
    pub fn state_code(&self) -> Option<&str> {
        self.registered_gstin()
            .and_then(|gstin| gstin.get(..2))
            .filter(|code| code.chars().all(|c| c.is_ascii_digit()))
    }

    /// Violation for a tax rate outside 0..=100 percent
    pub fn rate_violation(&self) -> Option<Violation> {
        self.tax_rate
            .as_ref()
            .filter(|rate| **rate < BigDecimal::from(0) || **rate > BigDecimal::from(100))
            .map(|rate| Violation::TaxRateOutOfRange { rate: rate.clone() })
    }
}

/// Bank account details; stored and round-tripped, never interpreted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifsc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
}

/// Leaf account attached to exactly one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    pub id: String,
    pub name: String,
    pub group_id: String,
    /// Opening balance magnitude
    #[serde(with = "bigdecimal::serde::json_num")]
    pub opening_balance: BigDecimal,
    pub opening_balance_type: EntryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_details: Option<TaxDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<BankDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "bigdecimal::serde::json_num_option")]
    pub interest_rate: Option<BigDecimal>,
}

impl Ledger {
    /// Opening balance with its sign applied (Dr positive, Cr negative)
    pub fn signed_opening_balance(&self) -> BigDecimal {
        self.opening_balance_type.signed(&self.opening_balance)
    }
}

/// Kind of voucher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoucherType {
    Contra,
    Payment,
    Receipt,
    Journal,
    Sales,
    Purchase,
}

impl VoucherType {
    /// Voucher types whose entries normally carry inventory allocations
    pub fn is_inventory_voucher(&self) -> bool {
        matches!(self, VoucherType::Sales | VoucherType::Purchase)
    }
}

impl fmt::Display for VoucherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VoucherType::Contra => "Contra",
            VoucherType::Payment => "Payment",
            VoucherType::Receipt => "Receipt",
            VoucherType::Journal => "Journal",
            VoucherType::Sales => "Sales",
            VoucherType::Purchase => "Purchase",
        };
        f.write_str(label)
    }
}

/// Quantity x rate breakdown linking an entry to stock movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryAllocation {
    pub item_id: String,
    pub godown_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    #[serde(with = "bigdecimal::serde::json_num")]
    pub quantity: BigDecimal,
    #[serde(with = "bigdecimal::serde::json_num")]
    pub rate: BigDecimal,
    /// Stored copy of quantity x rate; recomputed on posting, never trusted
    #[serde(with = "bigdecimal::serde::json_num")]
    pub amount: BigDecimal,
}

impl InventoryAllocation {
    pub fn new(
        item_id: impl Into<String>,
        godown_id: impl Into<String>,
        quantity: BigDecimal,
        rate: BigDecimal,
    ) -> Self {
        let amount = &quantity * &rate;
        Self {
            item_id: item_id.into(),
            godown_id: godown_id.into(),
            batch_id: None,
            quantity,
            rate,
            amount,
        }
    }

    pub fn with_batch(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    pub fn computed_amount(&self) -> BigDecimal {
        &self.quantity * &self.rate
    }
}

/// One line of a voucher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherEntry {
    pub id: String,
    pub ledger_id: String,
    /// Non-negative magnitude as entered
    #[serde(with = "bigdecimal::serde::json_num")]
    pub amount: BigDecimal,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "bigdecimal::serde::json_num_option")]
    pub forex_amount: Option<BigDecimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "bigdecimal::serde::json_num_option")]
    pub forex_rate: Option<BigDecimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_allocations: Option<Vec<InventoryAllocation>>,
}

impl VoucherEntry {
    /// Create a new entry with a generated id
    pub fn new(ledger_id: impl Into<String>, entry_type: EntryType, amount: BigDecimal) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            ledger_id: ledger_id.into(),
            amount,
            entry_type,
            forex_amount: None,
            forex_rate: None,
            inventory_allocations: None,
        }
    }

    /// Create a debit entry
    pub fn debit(ledger_id: impl Into<String>, amount: BigDecimal) -> Self {
        Self::new(ledger_id, EntryType::Debit, amount)
    }

    /// Create a credit entry
    pub fn credit(ledger_id: impl Into<String>, amount: BigDecimal) -> Self {
        Self::new(ledger_id, EntryType::Credit, amount)
    }

    pub fn with_allocation(mut self, allocation: InventoryAllocation) -> Self {
        self.inventory_allocations
            .get_or_insert_with(Vec::new)
            .push(allocation);
        self
    }

    pub fn with_forex(mut self, forex_amount: BigDecimal, forex_rate: BigDecimal) -> Self {
        self.forex_amount = Some(forex_amount);
        self.forex_rate = Some(forex_rate);
        self
    }

    pub fn allocations(&self) -> &[InventoryAllocation] {
        self.inventory_allocations.as_deref().unwrap_or(&[])
    }

    /// Amount used for balances: see [`crate::reconciliation::reconcile_allocations`]
    pub fn effective_amount(&self) -> BigDecimal {
        crate::reconciliation::reconcile_allocations(self)
    }

    /// Effective amount with the entry's sign applied
    pub fn signed_effect(&self) -> BigDecimal {
        self.entry_type.signed(&self.effective_amount())
    }
}

/// Atomic, balanced transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    pub id: String,
    /// Sequence number assigned at creation; never reassigned
    pub number: u64,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub voucher_type: VoucherType,
    pub entries: Vec<VoucherEntry>,
    #[serde(default)]
    pub narration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_symbol: Option<String>,
}

impl Voucher {
    /// Total of effective debit amounts
    pub fn total_debits(&self) -> BigDecimal {
        total_for_side(&self.entries, EntryType::Debit)
    }

    /// Total of effective credit amounts
    pub fn total_credits(&self) -> BigDecimal {
        total_for_side(&self.entries, EntryType::Credit)
    }

    /// Check debits equal credits within the given tolerance
    pub fn is_balanced(&self, tolerance: &BigDecimal) -> bool {
        (self.total_debits() - self.total_credits()).abs() <= *tolerance
    }

    pub fn touches(&self, ledger_id: &str) -> bool {
        self.entries.iter().any(|e| e.ledger_id == ledger_id)
    }

    /// Net signed effect of this voucher on one ledger (Dr positive)
    pub fn effect_on(&self, ledger_id: &str) -> BigDecimal {
        self.entries
            .iter()
            .filter(|e| e.ledger_id == ledger_id)
            .map(VoucherEntry::signed_effect)
            .sum()
    }
}

pub(crate) fn total_for_side(entries: &[VoucherEntry], side: EntryType) -> BigDecimal {
    entries
        .iter()
        .filter(|e| e.entry_type == side)
        .map(VoucherEntry::effective_amount)
        .sum()
}

/// Magnitude plus side, the way balances are shown to users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    #[serde(with = "bigdecimal::serde::json_num")]
    pub amount: BigDecimal,
    pub side: EntryType,
}

impl Balance {
    pub fn from_signed(signed: &BigDecimal) -> Self {
        Self {
            amount: signed.abs(),
            side: EntryType::of_signed(signed),
        }
    }

    pub fn signed(&self) -> BigDecimal {
        self.side.signed(&self.amount)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", format_amount(&self.amount), self.side)
    }
}

/// Two-decimal rendering used by reports and error messages
pub fn format_amount(amount: &BigDecimal) -> String {
    amount.with_scale_round(2, RoundingMode::HalfUp).to_string()
}

/// A single reason a voucher or master was rejected
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Violation {
    /// Voucher has no entries
    NoEntries,
    /// Entry (1-based line) has no ledger selected
    MissingLedger { line: usize },
    UnknownLedger { line: usize, ledger_id: String },
    NonPositiveAmount { line: usize, amount: BigDecimal },
    Unbalanced { debit: BigDecimal, credit: BigDecimal },
    UnknownStockItem { line: usize, item_id: String },
    UnknownGodown { line: usize, godown_id: String },
    UnknownBatch { line: usize, batch_id: String },
    NegativeAllocation { line: usize, item_id: String },
    EmptyName { master: &'static str },
    UnknownGroup { group_id: String },
    UnknownParent { master: &'static str, parent_id: String },
    UnknownUnit { unit: String },
    /// Master field pointing at a record that does not exist
    UnknownReference { entity: EntityKind, id: String },
    NegativeValue { field: &'static str },
    TaxRateOutOfRange { rate: BigDecimal },
    BatchesNotMaintained { item_id: String },
    ExpiryBeforeManufacture,
    /// Failure reported by a custom validator
    Rule(String),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::NoEntries => f.write_str("Voucher must have at least one entry"),
            Violation::MissingLedger { line } => write!(f, "Line {line}: ledger is required"),
            Violation::UnknownLedger { line, ledger_id } => {
                write!(f, "Line {line}: ledger '{ledger_id}' does not exist")
            }
            Violation::NonPositiveAmount { line, amount } => write!(
                f,
                "Line {line}: amount must be positive, got {}",
                format_amount(amount)
            ),
            Violation::Unbalanced { debit, credit } => {
                let difference = debit - credit;
                write!(
                    f,
                    "Voucher is not balanced: Dr {} vs Cr {} (difference {})",
                    format_amount(debit),
                    format_amount(credit),
                    Balance::from_signed(&difference)
                )
            }
            Violation::UnknownStockItem { line, item_id } => {
                write!(f, "Line {line}: stock item '{item_id}' does not exist")
            }
            Violation::UnknownGodown { line, godown_id } => {
                write!(f, "Line {line}: godown '{godown_id}' does not exist")
            }
            Violation::UnknownBatch { line, batch_id } => {
                write!(f, "Line {line}: batch '{batch_id}' does not exist for this item")
            }
            Violation::NegativeAllocation { line, item_id } => write!(
                f,
                "Line {line}: allocation of '{item_id}' has a negative quantity or rate"
            ),
            Violation::EmptyName { master } => write!(f, "{master} name cannot be empty"),
            Violation::UnknownGroup { group_id } => {
                write!(f, "Group '{group_id}' does not exist")
            }
            Violation::UnknownParent { master, parent_id } => {
                write!(f, "Parent {master} '{parent_id}' does not exist")
            }
            Violation::UnknownUnit { unit } => write!(f, "Unit '{unit}' does not exist"),
            Violation::UnknownReference { entity, id } => {
                write!(f, "{entity} '{id}' does not exist")
            }
            Violation::NegativeValue { field } => write!(f, "{field} cannot be negative"),
            Violation::TaxRateOutOfRange { rate } => {
                write!(f, "Tax rate must be between 0 and 100, got {rate}")
            }
            Violation::BatchesNotMaintained { item_id } => {
                write!(f, "Stock item '{item_id}' does not maintain batches")
            }
            Violation::ExpiryBeforeManufacture => {
                f.write_str("Expiry date cannot precede manufacturing date")
            }
            Violation::Rule(message) => f.write_str(message),
        }
    }
}

/// Every violation found while validating one operation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Violations(pub Vec<Violation>);

impl Violations {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    /// `Ok(())` when empty, otherwise a validation error carrying all of them
    pub fn into_result(self) -> LedgerResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(LedgerError::Validation(self))
        }
    }
}

impl Extend<Violation> for Violations {
    fn extend<I: IntoIterator<Item = Violation>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<Vec<Violation>> for Violations {
    fn from(violations: Vec<Violation>) -> Self {
        Self(violations)
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

/// Kind of record an id failed to resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    Group,
    Ledger,
    StockGroup,
    StockItem,
    Godown,
    Unit,
    Batch,
    Employee,
    Voucher,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Group => "Group",
            EntityKind::Ledger => "Ledger",
            EntityKind::StockGroup => "Stock group",
            EntityKind::StockItem => "Stock item",
            EntityKind::Godown => "Godown",
            EntityKind::Unit => "Unit",
            EntityKind::Batch => "Batch",
            EntityKind::Employee => "Employee",
            EntityKind::Voucher => "Voucher",
        };
        f.write_str(label)
    }
}

/// Coarse error taxonomy callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Reference,
    Structural,
    Serialization,
    Storage,
}

/// Errors that can occur in the bookkeeping engine
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(Violations),
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },
    #[error("Structural error: {0}")]
    Structural(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        LedgerError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Validation(_) => ErrorKind::Validation,
            LedgerError::NotFound { .. } => ErrorKind::Reference,
            LedgerError::Structural(_) => ErrorKind::Structural,
            LedgerError::Serialization(_) => ErrorKind::Serialization,
            LedgerError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Violations carried by a validation error, empty for other kinds
    pub fn violations(&self) -> &[Violation] {
        match self {
            LedgerError::Validation(violations) => &violations.0,
            _ => &[],
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
