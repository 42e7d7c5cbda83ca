//! Group and ledger drill-down

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::state::CompanyData;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillDownRow {
    pub id: String,
    pub name: String,
    pub balance: Balance,
}

/// Direct children of one group, each with its own balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDrillDown {
    pub group_id: String,
    pub group_name: String,
    /// Sub-groups with their rolled-up balances
    pub groups: Vec<DrillDownRow>,
    /// Ledgers attached directly to the group
    pub ledgers: Vec<DrillDownRow>,
    pub total: Balance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerVoucherRow {
    pub voucher_id: String,
    pub number: u64,
    pub date: NaiveDate,
    pub voucher_type: VoucherType,
    pub narration: String,
    /// Net effect on the ledger, Dr positive
    pub effect: BigDecimal,
    pub running_balance: Balance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerVouchers {
    pub ledger_id: String,
    pub ledger_name: String,
    pub opening: Balance,
    pub rows: Vec<LedgerVoucherRow>,
    pub closing: Balance,
}

pub fn group_drill_down(data: &CompanyData, group_id: &str) -> LedgerResult<GroupDrillDown> {
    let group = data.require_group(group_id)?;
    let index = data.balance_index();

    let groups = data
        .child_groups(group_id)
        .into_iter()
        .map(|child| {
            let signed = index.group_balance(&child.id, &data.groups, &data.ledgers)?;
            Ok(DrillDownRow {
                id: child.id.clone(),
                name: child.name.clone(),
                balance: Balance::from_signed(&signed),
            })
        })
        .collect::<LedgerResult<Vec<_>>>()?;

    let ledgers = data
        .ledgers_in_group(group_id)
        .into_iter()
        .map(|ledger| DrillDownRow {
            id: ledger.id.clone(),
            name: ledger.name.clone(),
            balance: Balance::from_signed(&index.ledger_balance(ledger)),
        })
        .collect();

    let total = index.group_balance(group_id, &data.groups, &data.ledgers)?;

    Ok(GroupDrillDown {
        group_id: group.id.clone(),
        group_name: group.name.clone(),
        groups,
        ledgers,
        total: Balance::from_signed(&total),
    })
}

/// Vouchers touching a ledger ordered by (date, number) with running balance
pub fn ledger_vouchers(data: &CompanyData, ledger_id: &str) -> LedgerResult<LedgerVouchers> {
    let ledger = data.require_ledger(ledger_id)?;

    let mut touching: Vec<&Voucher> = data
        .vouchers
        .iter()
        .filter(|v| v.touches(ledger_id))
        .collect();
    touching.sort_by(|a, b| a.date.cmp(&b.date).then(a.number.cmp(&b.number)));

    let opening = ledger.signed_opening_balance();
    let mut running = opening.clone();
    let rows = touching
        .into_iter()
        .map(|voucher| {
            let effect = voucher.effect_on(ledger_id);
            running += &effect;
            LedgerVoucherRow {
                voucher_id: voucher.id.clone(),
                number: voucher.number,
                date: voucher.date,
                voucher_type: voucher.voucher_type,
                narration: voucher.narration.clone(),
                effect,
                running_balance: Balance::from_signed(&running),
            }
        })
        .collect();

    Ok(LedgerVouchers {
        ledger_id: ledger.id.clone(),
        ledger_name: ledger.name.clone(),
        opening: Balance::from_signed(&opening),
        rows,
        closing: Balance::from_signed(&running),
    })
}
