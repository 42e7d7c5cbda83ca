//! Reconciliation of inventory allocations with the monetary side of entries
//!
//! Inventory-driven vouchers (Sales/Purchase) carry a quantity x rate
//! breakdown per entry. The ledger side is derived from that breakdown when it
//! adds up to something positive; otherwise the manually entered amount wins.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Effective amount of an entry for balance purposes.
///
/// Allocation amounts are recomputed from quantity x rate rather than read
/// from the stored `amount` field.
pub fn reconcile_allocations(entry: &VoucherEntry) -> BigDecimal {
    let allocated = allocated_amount(entry);
    if allocated > BigDecimal::from(0) {
        allocated
    } else {
        entry.amount.clone()
    }
}

/// Sum of quantity x rate over the entry's allocations
pub fn allocated_amount(entry: &VoucherEntry) -> BigDecimal {
    entry
        .allocations()
        .iter()
        .map(InventoryAllocation::computed_amount)
        .sum()
}

/// Rewrite every stored allocation amount as quantity x rate
pub fn recompute_allocation_amounts(entry: &mut VoucherEntry) {
    if let Some(allocations) = entry.inventory_allocations.as_mut() {
        for allocation in allocations.iter_mut() {
            allocation.amount = allocation.computed_amount();
        }
    }
}

/// Entry whose typed amount disagrees with its allocations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationMismatch {
    pub voucher_id: String,
    pub voucher_number: u64,
    pub entry_id: String,
    pub entered_amount: BigDecimal,
    pub allocated_amount: BigDecimal,
}

/// Find entries where the allocations override a different typed amount.
///
/// These are not errors; the allocation total is authoritative. The list is
/// for review screens that want to show what was overridden.
pub fn find_allocation_overrides(
    vouchers: &[Voucher],
    tolerance: &BigDecimal,
) -> Vec<AllocationMismatch> {
    let mut mismatches = Vec::new();
    for voucher in vouchers {
        for entry in &voucher.entries {
            let allocated = allocated_amount(entry);
            if allocated <= BigDecimal::from(0) {
                continue;
            }
            if (&allocated - &entry.amount).abs() > *tolerance {
                mismatches.push(AllocationMismatch {
                    voucher_id: voucher.id.clone(),
                    voucher_number: voucher.number,
                    entry_id: entry.id.clone(),
                    entered_amount: entry.amount.clone(),
                    allocated_amount: allocated,
                });
            }
        }
    }
    mismatches
}
