//! Balance computation
//!
//! Balances are never stored. A ledger's balance is its signed opening
//! balance plus the signed effective amounts of every entry that posts to it
//! (Dr positive, Cr negative). A group's balance rolls up its own ledgers and
//! all of its descendant groups.

use bigdecimal::BigDecimal;
use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::state::CompanyData;
use crate::types::*;

/// Signed balance of one ledger, folding over every voucher
pub fn ledger_balance(ledger: &Ledger, vouchers: &[Voucher]) -> BigDecimal {
    let movement: BigDecimal = vouchers
        .iter()
        .flat_map(|v| v.entries.iter())
        .filter(|e| e.ledger_id == ledger.id)
        .map(VoucherEntry::signed_effect)
        .sum();
    ledger.signed_opening_balance() + movement
}

/// Signed balance of a group and all of its descendants
pub fn group_balance(
    group_id: &str,
    groups: &[AccountGroup],
    ledgers: &[Ledger],
    vouchers: &[Voucher],
) -> LedgerResult<BigDecimal> {
    BalanceIndex::build(vouchers).group_balance(group_id, groups, ledgers)
}

/// Net voucher movement per ledger, built once per snapshot
#[derive(Debug, Clone, Default)]
pub struct BalanceIndex {
    movements: HashMap<String, BigDecimal>,
}

impl BalanceIndex {
    pub fn build(vouchers: &[Voucher]) -> Self {
        let mut movements: HashMap<String, BigDecimal> = HashMap::new();
        for entry in vouchers.iter().flat_map(|v| v.entries.iter()) {
            *movements
                .entry(entry.ledger_id.clone())
                .or_insert_with(|| BigDecimal::from(0)) += entry.signed_effect();
        }
        Self { movements }
    }

    /// Net signed effect of all vouchers on a ledger id
    pub fn movement(&self, ledger_id: &str) -> BigDecimal {
        self.movements
            .get(ledger_id)
            .cloned()
            .unwrap_or_else(|| BigDecimal::from(0))
    }

    pub fn ledger_balance(&self, ledger: &Ledger) -> BigDecimal {
        ledger.signed_opening_balance() + self.movement(&ledger.id)
    }

    /// Roll a group up through its descendants. Revisiting a group means the
    /// parent links form a cycle, reported as a structural error.
    pub fn group_balance(
        &self,
        group_id: &str,
        groups: &[AccountGroup],
        ledgers: &[Ledger],
    ) -> LedgerResult<BigDecimal> {
        if !groups.iter().any(|g| g.id == group_id) {
            return Err(LedgerError::not_found(EntityKind::Group, group_id));
        }

        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        for group in groups {
            if let Some(parent) = group.parent_group_id.as_deref() {
                children.entry(parent).or_default().push(group.id.as_str());
            }
        }

        let mut visited = HashSet::new();
        let mut stack = vec![group_id];
        let mut total = BigDecimal::from(0);

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                warn!(group_id, revisited = current, "cycle in group hierarchy");
                return Err(LedgerError::Structural(format!(
                    "Group hierarchy under '{}' contains a cycle at '{}'",
                    group_id, current
                )));
            }

            total += ledgers
                .iter()
                .filter(|l| l.group_id == current)
                .map(|l| self.ledger_balance(l))
                .sum::<BigDecimal>();

            if let Some(kids) = children.get(current) {
                stack.extend(kids.iter().copied());
            }
        }

        Ok(total)
    }
}

impl CompanyData {
    /// Closing balance of a ledger by id
    pub fn ledger_balance(&self, ledger_id: &str) -> LedgerResult<Balance> {
        let ledger = self.require_ledger(ledger_id)?;
        Ok(Balance::from_signed(&ledger_balance(ledger, &self.vouchers)))
    }

    /// Rolled-up balance of a group by id
    pub fn group_balance(&self, group_id: &str) -> LedgerResult<Balance> {
        let signed = group_balance(group_id, &self.groups, &self.ledgers, &self.vouchers)?;
        Ok(Balance::from_signed(&signed))
    }

    pub fn balance_index(&self) -> BalanceIndex {
        BalanceIndex::build(&self.vouchers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    fn journal(number: u64, entries: Vec<VoucherEntry>) -> Voucher {
        Voucher {
            id: format!("v{number}"),
            number,
            date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            voucher_type: VoucherType::Journal,
            entries,
            narration: String::new(),
            currency_symbol: None,
        }
    }

    fn company() -> CompanyData {
        let mut data = CompanyData::seeded(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        data.ledgers.push(Ledger {
            id: "bank".to_string(),
            name: "HDFC Bank".to_string(),
            group_id: "g3".to_string(),
            opening_balance: dec("500"),
            opening_balance_type: EntryType::Debit,
            tax_details: None,
            bank_details: None,
            currency: None,
            interest_rate: None,
        });
        data.vouchers.push(journal(
            1,
            vec![
                VoucherEntry::debit("l1", dec("200")),
                VoucherEntry::credit("bank", dec("200")),
            ],
        ));
        data
    }

    #[test]
    fn test_ledger_balance_fold() {
        let data = company();
        let bank = data.ledger("bank").unwrap();
        assert_eq!(ledger_balance(bank, &data.vouchers), dec("300"));
        assert_eq!(data.ledger_balance("l1").unwrap().to_string(), "200.00 Dr");
    }

    #[test]
    fn test_index_matches_fold() {
        let data = company();
        let index = data.balance_index();
        for ledger in &data.ledgers {
            assert_eq!(index.ledger_balance(ledger), ledger_balance(ledger, &data.vouchers));
        }
    }

    #[test]
    fn test_group_rollup() {
        let data = company();
        let current_assets = group_balance("g2", &data.groups, &data.ledgers, &data.vouchers);
        assert_eq!(current_assets.unwrap(), dec("500"));
        assert_eq!(data.group_balance("g4").unwrap().amount, dec("200"));
    }

    #[test]
    fn test_group_cycle_is_structural() {
        let mut data = company();
        data.groups
            .push(AccountGroup::new("x", "X", Some("y".to_string()), AccountType::Asset));
        data.groups
            .push(AccountGroup::new("y", "Y", Some("x".to_string()), AccountType::Asset));

        let err = group_balance("x", &data.groups, &data.ledgers, &data.vouchers).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
    }

    #[test]
    fn test_unknown_group() {
        let data = company();
        assert_eq!(data.group_balance("zz").unwrap_err().kind(), ErrorKind::Reference);
    }
}
