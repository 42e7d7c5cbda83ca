//! Day book: every voucher, newest first

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::state::CompanyData;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBookRow {
    pub voucher_id: String,
    pub number: u64,
    pub date: NaiveDate,
    pub voucher_type: VoucherType,
    /// Ledger of the first entry
    pub particulars: String,
    pub narration: String,
    /// Total of the Dr side
    pub amount: BigDecimal,
}

/// Vouchers sorted by date descending, then by number descending
pub fn day_book(data: &CompanyData) -> Vec<DayBookRow> {
    let mut vouchers: Vec<&Voucher> = data.vouchers.iter().collect();
    vouchers.sort_by(|a, b| b.date.cmp(&a.date).then(b.number.cmp(&a.number)));

    vouchers
        .into_iter()
        .map(|voucher| DayBookRow {
            voucher_id: voucher.id.clone(),
            number: voucher.number,
            date: voucher.date,
            voucher_type: voucher.voucher_type,
            particulars: voucher
                .entries
                .first()
                .and_then(|e| data.ledger(&e.ledger_id))
                .map(|l| l.name.clone())
                .unwrap_or_default(),
            narration: voucher.narration.clone(),
            amount: voucher.total_debits(),
        })
        .collect()
}
