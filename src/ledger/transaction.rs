//! Voucher validation, posting and deletion

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing::debug;

use crate::config::{BookConfig, NumberingPolicy};
use crate::reconciliation::{reconcile_allocations, recompute_allocation_amounts};
use crate::state::CompanyData;
use crate::traits::*;
use crate::types::*;

/// Voucher submitted for posting; id and number are assigned by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct NewVoucher {
    pub date: NaiveDate,
    pub voucher_type: VoucherType,
    pub entries: Vec<VoucherEntry>,
    pub narration: String,
    pub currency_symbol: Option<String>,
}

impl NewVoucher {
    pub fn new(voucher_type: VoucherType, date: NaiveDate) -> Self {
        Self {
            date,
            voucher_type,
            entries: Vec::new(),
            narration: String::new(),
            currency_symbol: None,
        }
    }

    pub fn total_debits(&self) -> BigDecimal {
        total_for_side(&self.entries, EntryType::Debit)
    }

    pub fn total_credits(&self) -> BigDecimal {
        total_for_side(&self.entries, EntryType::Credit)
    }
}

/// Check a set of entries against the posting rules.
///
/// Every problem is collected rather than stopping at the first one, so a
/// form can highlight all offending lines at once. Line numbers are 1-based.
pub fn validate_voucher(
    data: &CompanyData,
    entries: &[VoucherEntry],
    tolerance: &BigDecimal,
) -> Violations {
    if entries.is_empty() {
        return vec![Violation::NoEntries].into();
    }

    let zero = BigDecimal::from(0);
    let mut violations = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let line = index + 1;

        if entry.ledger_id.trim().is_empty() {
            violations.push(Violation::MissingLedger { line });
        } else if data.ledger(&entry.ledger_id).is_none() {
            violations.push(Violation::UnknownLedger {
                line,
                ledger_id: entry.ledger_id.clone(),
            });
        }

        let amount = entry.effective_amount();
        if amount <= zero {
            violations.push(Violation::NonPositiveAmount { line, amount });
        }

        for allocation in entry.allocations() {
            if data.stock_item(&allocation.item_id).is_none() {
                violations.push(Violation::UnknownStockItem {
                    line,
                    item_id: allocation.item_id.clone(),
                });
            }
            if data.godown(&allocation.godown_id).is_none() {
                violations.push(Violation::UnknownGodown {
                    line,
                    godown_id: allocation.godown_id.clone(),
                });
            }
            if let Some(batch_id) = &allocation.batch_id {
                let belongs = data
                    .batch(batch_id)
                    .map(|b| b.item_id == allocation.item_id)
                    .unwrap_or(false);
                if !belongs {
                    violations.push(Violation::UnknownBatch {
                        line,
                        batch_id: batch_id.clone(),
                    });
                }
            }
            if allocation.quantity < zero || allocation.rate < zero {
                violations.push(Violation::NegativeAllocation {
                    line,
                    item_id: allocation.item_id.clone(),
                });
            }
        }
    }

    let debit = total_for_side(entries, EntryType::Debit);
    let credit = total_for_side(entries, EntryType::Credit);
    if (&debit - &credit).abs() > *tolerance {
        violations.push(Violation::Unbalanced { debit, credit });
    }

    violations.into()
}

impl CompanyData {
    /// Validate and post a voucher, assigning its id and number
    pub fn create_voucher(&mut self, new: NewVoucher, rules: &Rules<'_>) -> LedgerResult<Voucher> {
        let mut violations = validate_voucher(self, &new.entries, rules.tolerance());
        violations.extend(rules.vouchers.validate_voucher(&new, self, rules.tolerance()));
        violations.into_result()?;

        let number = self.assign_voucher_number(rules.config.voucher_numbering);

        let mut entries = new.entries;
        for entry in entries.iter_mut() {
            if entry.id.trim().is_empty() {
                entry.id = uuid::Uuid::new_v4().to_string();
            }
            recompute_allocation_amounts(entry);
            entry.amount = reconcile_allocations(entry);
        }

        let voucher = Voucher {
            id: uuid::Uuid::new_v4().to_string(),
            number,
            date: new.date,
            voucher_type: new.voucher_type,
            entries,
            narration: new.narration,
            currency_symbol: new.currency_symbol,
        };
        debug!(number, voucher_type = %voucher.voucher_type, "voucher posted");

        self.vouchers.push(voucher.clone());
        self.next_voucher_number = self.next_voucher_number.max(number + 1);
        Ok(voucher)
    }

    /// Remove a voucher by id. Deleting an unknown id is a no-op.
    pub fn delete_voucher(&mut self, id: &str) -> bool {
        let before = self.vouchers.len();
        self.vouchers.retain(|v| v.id != id);
        self.vouchers.len() != before
    }

    fn assign_voucher_number(&self, policy: NumberingPolicy) -> u64 {
        match policy {
            NumberingPolicy::Sequential => {
                let floor = self.vouchers.iter().map(|v| v.number).max().unwrap_or(0) + 1;
                self.next_voucher_number.max(floor)
            }
            NumberingPolicy::LiveCount => self.vouchers.len() as u64 + 1,
        }
    }
}

/// Voucher builder for composing multi-line vouchers
#[derive(Debug)]
pub struct VoucherBuilder {
    voucher: NewVoucher,
}

impl VoucherBuilder {
    /// Create a new voucher builder
    pub fn new(voucher_type: VoucherType, date: NaiveDate) -> Self {
        Self {
            voucher: NewVoucher::new(voucher_type, date),
        }
    }

    pub fn narration(mut self, narration: impl Into<String>) -> Self {
        self.voucher.narration = narration.into();
        self
    }

    pub fn currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.voucher.currency_symbol = Some(symbol.into());
        self
    }

    /// Add a debit entry
    pub fn debit(mut self, ledger_id: impl Into<String>, amount: BigDecimal) -> Self {
        self.voucher.entries.push(VoucherEntry::debit(ledger_id, amount));
        self
    }

    /// Add a credit entry
    pub fn credit(mut self, ledger_id: impl Into<String>, amount: BigDecimal) -> Self {
        self.voucher.entries.push(VoucherEntry::credit(ledger_id, amount));
        self
    }

    /// Add a custom entry
    pub fn entry(mut self, entry: VoucherEntry) -> Self {
        self.voucher.entries.push(entry);
        self
    }

    /// Build the voucher, checking only what can be checked without a book:
    /// at least one entry, positive amounts and Dr = Cr
    pub fn build(self) -> LedgerResult<NewVoucher> {
        let tolerance = BookConfig::default().balance_tolerance;
        let zero = BigDecimal::from(0);
        let mut violations = Vec::new();

        if self.voucher.entries.is_empty() {
            violations.push(Violation::NoEntries);
        }
        for (index, entry) in self.voucher.entries.iter().enumerate() {
            let amount = entry.effective_amount();
            if amount <= zero {
                violations.push(Violation::NonPositiveAmount {
                    line: index + 1,
                    amount,
                });
            }
        }
        let debit = self.voucher.total_debits();
        let credit = self.voucher.total_credits();
        if !self.voucher.entries.is_empty() && (&debit - &credit).abs() > tolerance {
            violations.push(Violation::Unbalanced { debit, credit });
        }

        Violations::from(violations).into_result()?;
        Ok(self.voucher)
    }
}

/// Common voucher patterns
pub mod patterns {
    use super::*;

    /// Cash or credit sale without stock (debit party, credit sales)
    pub fn sale(
        date: NaiveDate,
        party_ledger_id: &str,
        sales_ledger_id: &str,
        amount: BigDecimal,
        narration: &str,
    ) -> LedgerResult<NewVoucher> {
        VoucherBuilder::new(VoucherType::Sales, date)
            .narration(narration)
            .debit(party_ledger_id, amount.clone())
            .credit(sales_ledger_id, amount)
            .build()
    }

    /// Sale of stock; the credit side is valued from the allocations
    pub fn sale_of_stock(
        date: NaiveDate,
        party_ledger_id: &str,
        sales_ledger_id: &str,
        allocations: Vec<InventoryAllocation>,
        narration: &str,
    ) -> LedgerResult<NewVoucher> {
        let mut credit = VoucherEntry::credit(sales_ledger_id, BigDecimal::from(0));
        for allocation in allocations {
            credit = credit.with_allocation(allocation);
        }
        let total = credit.effective_amount();

        VoucherBuilder::new(VoucherType::Sales, date)
            .narration(narration)
            .debit(party_ledger_id, total)
            .entry(credit)
            .build()
    }

    /// Purchase of stock; the debit side is valued from the allocations
    pub fn purchase_of_stock(
        date: NaiveDate,
        purchase_ledger_id: &str,
        party_ledger_id: &str,
        allocations: Vec<InventoryAllocation>,
        narration: &str,
    ) -> LedgerResult<NewVoucher> {
        let mut debit = VoucherEntry::debit(purchase_ledger_id, BigDecimal::from(0));
        for allocation in allocations {
            debit = debit.with_allocation(allocation);
        }
        let total = debit.effective_amount();

        VoucherBuilder::new(VoucherType::Purchase, date)
            .narration(narration)
            .entry(debit)
            .credit(party_ledger_id, total)
            .build()
    }

    /// Expense paid out of cash or bank
    pub fn payment(
        date: NaiveDate,
        expense_ledger_id: &str,
        cash_ledger_id: &str,
        amount: BigDecimal,
        narration: &str,
    ) -> LedgerResult<NewVoucher> {
        VoucherBuilder::new(VoucherType::Payment, date)
            .narration(narration)
            .debit(expense_ledger_id, amount.clone())
            .credit(cash_ledger_id, amount)
            .build()
    }

    /// Money received from a party into cash or bank
    pub fn receipt(
        date: NaiveDate,
        cash_ledger_id: &str,
        party_ledger_id: &str,
        amount: BigDecimal,
        narration: &str,
    ) -> LedgerResult<NewVoucher> {
        VoucherBuilder::new(VoucherType::Receipt, date)
            .narration(narration)
            .debit(cash_ledger_id, amount.clone())
            .credit(party_ledger_id, amount)
            .build()
    }

    /// Transfer between cash and bank ledgers
    pub fn contra(
        date: NaiveDate,
        to_ledger_id: &str,
        from_ledger_id: &str,
        amount: BigDecimal,
        narration: &str,
    ) -> LedgerResult<NewVoucher> {
        VoucherBuilder::new(VoucherType::Contra, date)
            .narration(narration)
            .debit(to_ledger_id, amount.clone())
            .credit(from_ledger_id, amount)
            .build()
    }

    /// Two-line adjustment journal
    pub fn journal(
        date: NaiveDate,
        debit_ledger_id: &str,
        credit_ledger_id: &str,
        amount: BigDecimal,
        narration: &str,
    ) -> LedgerResult<NewVoucher> {
        VoucherBuilder::new(VoucherType::Journal, date)
            .narration(narration)
            .debit(debit_ledger_id, amount.clone())
            .credit(credit_ledger_id, amount)
            .build()
    }
}
