//! Stock movement derived from posted inventory allocations

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Inward and outward totals of one item across a set of vouchers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub item_id: String,
    pub inward_quantity: BigDecimal,
    pub inward_value: BigDecimal,
    pub outward_quantity: BigDecimal,
    pub outward_value: BigDecimal,
}

impl StockMovement {
    fn empty(item_id: &str) -> Self {
        let zero = BigDecimal::from(0);
        Self {
            item_id: item_id.to_string(),
            inward_quantity: zero.clone(),
            inward_value: zero.clone(),
            outward_quantity: zero.clone(),
            outward_value: zero,
        }
    }

    /// Quantity on hand after applying this movement to an opening quantity
    pub fn closing_quantity(&self, opening_quantity: &BigDecimal) -> BigDecimal {
        opening_quantity + &self.inward_quantity - &self.outward_quantity
    }

    pub fn has_activity(&self) -> bool {
        let zero = BigDecimal::from(0);
        self.inward_quantity != zero || self.outward_quantity != zero
    }
}

/// Sum the allocations of one item. An allocation on a Dr entry brings stock
/// in (purchase side); one on a Cr entry takes it out (sales side).
pub fn stock_movements(item_id: &str, vouchers: &[Voucher]) -> StockMovement {
    let mut movement = StockMovement::empty(item_id);

    let allocations = vouchers.iter().flat_map(|v| v.entries.iter()).flat_map(|entry| {
        entry
            .allocations()
            .iter()
            .filter(|a| a.item_id == item_id)
            .map(move |a| (entry.entry_type, a))
    });

    for (side, allocation) in allocations {
        let value = allocation.computed_amount();
        match side {
            EntryType::Debit => {
                movement.inward_quantity += &allocation.quantity;
                movement.inward_value += value;
            }
            EntryType::Credit => {
                movement.outward_quantity += &allocation.quantity;
                movement.outward_value += value;
            }
        }
    }

    movement
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    fn voucher(voucher_type: VoucherType, entries: Vec<VoucherEntry>) -> Voucher {
        Voucher {
            id: uuid::Uuid::new_v4().to_string(),
            number: 1,
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            voucher_type,
            entries,
            narration: String::new(),
            currency_symbol: None,
        }
    }

    #[test]
    fn test_inward_and_outward() {
        let purchase = voucher(
            VoucherType::Purchase,
            vec![
                VoucherEntry::debit("purchases", dec("0"))
                    .with_allocation(InventoryAllocation::new("i1", "gd1", dec("10"), dec("20"))),
                VoucherEntry::credit("supplier", dec("200")),
            ],
        );
        let sale = voucher(
            VoucherType::Sales,
            vec![
                VoucherEntry::debit("l1", dec("120")),
                VoucherEntry::credit("sales", dec("0"))
                    .with_allocation(InventoryAllocation::new("i1", "gd1", dec("4"), dec("30")))
                    .with_allocation(InventoryAllocation::new("i2", "gd1", dec("1"), dec("5"))),
            ],
        );

        let movement = stock_movements("i1", &[purchase, sale]);
        assert_eq!(movement.inward_quantity, dec("10"));
        assert_eq!(movement.inward_value, dec("200"));
        assert_eq!(movement.outward_quantity, dec("4"));
        assert_eq!(movement.outward_value, dec("120"));
        assert_eq!(movement.closing_quantity(&dec("3")), dec("9"));
    }

    #[test]
    fn test_item_without_allocations() {
        let movement = stock_movements("i9", &[]);
        assert!(!movement.has_activity());
    }
}
