//! Stock summary

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::StockValuationMode;
use crate::inventory::{stock_movements, StockItem};
use crate::state::CompanyData;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockValuationRow {
    pub item_id: String,
    pub name: String,
    pub unit: String,
    pub godown: Option<String>,
    pub opening_quantity: BigDecimal,
    pub inward_quantity: BigDecimal,
    pub outward_quantity: BigDecimal,
    pub closing_quantity: BigDecimal,
    pub rate: BigDecimal,
    pub value: BigDecimal,
    /// Closing quantity at or below a positive reorder level
    pub low_stock: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockValuation {
    pub mode: StockValuationMode,
    pub rows: Vec<StockValuationRow>,
    pub total_value: BigDecimal,
}

fn is_low_stock(item: &StockItem, closing_quantity: &BigDecimal) -> bool {
    let zero = BigDecimal::from(0);
    item.reorder_level
        .as_ref()
        .map(|level| *level > zero && closing_quantity <= level)
        .unwrap_or(false)
}

/// Value every stock item.
///
/// `OpeningOnly` reports opening quantity x opening rate. `WithMovements`
/// applies posted allocations and prices the closing quantity at the weighted
/// average of opening and inward rates.
pub fn stock_valuation(data: &CompanyData, mode: StockValuationMode) -> StockValuation {
    let zero = BigDecimal::from(0);
    let mut rows = Vec::new();

    for item in &data.stock_items {
        let movement = match mode {
            StockValuationMode::WithMovements => stock_movements(&item.id, &data.vouchers),
            StockValuationMode::OpeningOnly => stock_movements(&item.id, &[]),
        };
        let closing_quantity = movement.closing_quantity(&item.opening_quantity);

        let (rate, value) = match mode {
            StockValuationMode::WithMovements => {
                let available = &item.opening_quantity + &movement.inward_quantity;
                let rate = if available > zero {
                    ((item.opening_value() + &movement.inward_value) / available)
                        .with_scale_round(4, RoundingMode::HalfUp)
                } else {
                    item.opening_rate.clone()
                };
                let value = (&closing_quantity * &rate).with_scale_round(2, RoundingMode::HalfUp);
                (rate, value)
            }
            StockValuationMode::OpeningOnly => (
                item.opening_rate.clone(),
                item.opening_value().with_scale_round(2, RoundingMode::HalfUp),
            ),
        };

        rows.push(StockValuationRow {
            item_id: item.id.clone(),
            name: item.name.clone(),
            unit: data
                .unit(&item.unit)
                .map(|u| u.name.clone())
                .unwrap_or_else(|| item.unit.clone()),
            godown: item
                .godown_id
                .as_deref()
                .and_then(|id| data.godown(id))
                .map(|g| g.name.clone()),
            opening_quantity: item.opening_quantity.clone(),
            inward_quantity: movement.inward_quantity.clone(),
            outward_quantity: movement.outward_quantity.clone(),
            low_stock: is_low_stock(item, &closing_quantity),
            closing_quantity,
            rate,
            value,
        });
    }

    let total_value = rows.iter().map(|r| &r.value).sum();
    debug!(items = rows.len(), "stock valuation computed");

    StockValuation {
        mode,
        rows,
        total_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::NewStockItem;
    use crate::ledger::transaction::patterns;
    use crate::ledger::NewLedger;
    use crate::traits::Rules;
    use crate::types::*;
    use crate::BookConfig;
    use chrono::NaiveDate;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    fn stocked() -> (CompanyData, String) {
        let config = BookConfig::default();
        let rules = Rules::standard(&config);
        let mut data = CompanyData::seeded(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        let item = data
            .create_stock_item(
                NewStockItem::new("Widget", "Nos", dec("10"), dec("20"))
                    .in_godown("gd1")
                    .with_reorder_level(dec("8")),
                &rules,
            )
            .unwrap();
        let purchases = data
            .create_ledger(NewLedger::new("Purchases", "g6", dec("0"), EntryType::Debit), &rules)
            .unwrap();
        let sales = data
            .create_ledger(NewLedger::new("Sales", "g5", dec("0"), EntryType::Credit), &rules)
            .unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 4, 20).unwrap();
        let buy = patterns::purchase_of_stock(
            date,
            &purchases.id,
            "l1",
            vec![InventoryAllocation::new(&item.id, "gd1", dec("10"), dec("30"))],
            "",
        )
        .unwrap();
        let sell = patterns::sale_of_stock(
            date,
            "l1",
            &sales.id,
            vec![InventoryAllocation::new(&item.id, "gd1", dec("14"), dec("40"))],
            "",
        )
        .unwrap();
        data.create_voucher(buy, &rules).unwrap();
        data.create_voucher(sell, &rules).unwrap();
        (data, item.id)
    }

    #[test]
    fn test_opening_only_valuation() {
        let (data, _) = stocked();
        let summary = stock_valuation(&data, StockValuationMode::OpeningOnly);
        let row = &summary.rows[0];
        assert_eq!(row.closing_quantity, dec("10"));
        assert_eq!(row.value, dec("200"));
        assert_eq!(row.godown.as_deref(), Some("Main Location"));
        assert!(!row.low_stock);
    }

    #[test]
    fn test_valuation_with_movements() {
        let (data, _) = stocked();
        let summary = stock_valuation(&data, StockValuationMode::WithMovements);
        let row = &summary.rows[0];
        assert_eq!(row.inward_quantity, dec("10"));
        assert_eq!(row.outward_quantity, dec("14"));
        assert_eq!(row.closing_quantity, dec("6"));
        assert_eq!(row.rate, dec("25"));
        assert_eq!(row.value, dec("150"));
        assert!(row.low_stock);
        assert_eq!(summary.total_value, dec("150"));
    }

    #[test]
    fn test_opening_only_keeps_full_rate_precision() {
        let config = BookConfig::default();
        let rules = Rules::standard(&config);
        let mut data = CompanyData::seeded(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        data.create_stock_item(NewStockItem::new("Screws", "Nos", dec("1000"), dec("0.12345")), &rules)
            .unwrap();

        let summary = stock_valuation(&data, StockValuationMode::OpeningOnly);
        assert_eq!(summary.rows[0].rate, dec("0.12345"));
        assert_eq!(summary.rows[0].value, dec("123.45"));
        assert_eq!(summary.total_value, dec("123.45"));
    }

    #[test]
    fn test_zero_reorder_level_never_flags() {
        let config = BookConfig::default();
        let rules = Rules::standard(&config);
        let mut data = CompanyData::seeded(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        data.create_stock_item(
            NewStockItem::new("Empty", "u1", dec("0"), dec("5")).with_reorder_level(dec("0")),
            &rules,
        )
        .unwrap();

        let summary = stock_valuation(&data, StockValuationMode::OpeningOnly);
        assert!(!summary.rows[0].low_stock);
    }
}
