//! GSTR-1 style register of outward supplies

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GstConfig;
use crate::state::CompanyData;
use crate::tax::gst::{GstCalculation, GstRate, SupplyKind};
use crate::types::*;

/// Label used in place of a GSTIN for unregistered parties
pub const UNREGISTERED_PARTY: &str = "URP";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GstSalesRow {
    pub voucher_id: String,
    pub number: u64,
    pub date: NaiveDate,
    pub party_name: String,
    /// GSTIN of the party or `URP`
    pub gstin: String,
    pub supply: SupplyKind,
    pub tax: GstCalculation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GstSalesRegister {
    pub rows: Vec<GstSalesRow>,
    pub total_taxable_value: BigDecimal,
    pub total_cgst: BigDecimal,
    pub total_sgst: BigDecimal,
    pub total_igst: BigDecimal,
    pub total_tax: BigDecimal,
}

/// Build the register over every Sales voucher in number order.
///
/// The party is the ledger on the first Dr entry and the taxable value is the
/// first Cr entry. The rate comes from that Cr ledger's tax details, falling
/// back to the configured default.
pub fn gst_sales_register(data: &CompanyData, config: &GstConfig) -> LedgerResult<GstSalesRegister> {
    let mut sales: Vec<&Voucher> = data
        .vouchers
        .iter()
        .filter(|v| v.voucher_type == VoucherType::Sales)
        .collect();
    sales.sort_by_key(|v| (v.date, v.number));

    let mut rows = Vec::new();
    for voucher in sales {
        let party = voucher
            .entries
            .iter()
            .find(|e| e.entry_type == EntryType::Debit)
            .and_then(|e| data.ledger(&e.ledger_id));
        let sale = voucher
            .entries
            .iter()
            .find(|e| e.entry_type == EntryType::Credit);

        let party_tax = party.and_then(|l| l.tax_details.as_ref());
        let gstin = party_tax
            .and_then(TaxDetails::registered_gstin)
            .unwrap_or(UNREGISTERED_PARTY)
            .to_string();
        let supply = SupplyKind::between(
            config.home_state_code.as_deref(),
            party_tax.and_then(TaxDetails::state_code),
        );

        let taxable_value = sale
            .map(VoucherEntry::effective_amount)
            .unwrap_or_else(|| BigDecimal::from(0));
        let rate = sale
            .and_then(|e| data.ledger(&e.ledger_id))
            .and_then(|l| l.tax_details.as_ref())
            .and_then(|t| t.tax_rate.clone())
            .unwrap_or_else(|| config.default_rate.clone());

        let tax = GstCalculation::calculate(taxable_value, GstRate::for_supply(rate, supply))?;
        rows.push(GstSalesRow {
            voucher_id: voucher.id.clone(),
            number: voucher.number,
            date: voucher.date,
            party_name: party.map(|l| l.name.clone()).unwrap_or_default(),
            gstin,
            supply,
            tax,
        });
    }

    let zero = BigDecimal::from(0);
    let mut register = GstSalesRegister {
        rows: Vec::new(),
        total_taxable_value: zero.clone(),
        total_cgst: zero.clone(),
        total_sgst: zero.clone(),
        total_igst: zero.clone(),
        total_tax: zero,
    };
    for row in &rows {
        register.total_taxable_value += &row.tax.taxable_value;
        register.total_cgst += &row.tax.cgst_amount;
        register.total_sgst += &row.tax.sgst_amount;
        register.total_igst += &row.tax.igst_amount;
        register.total_tax += &row.tax.total_tax;
    }
    register.rows = rows;
    debug!(invoices = register.rows.len(), "gst sales register computed");

    Ok(register)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::transaction::patterns;
    use crate::ledger::NewLedger;
    use crate::traits::Rules;
    use crate::BookConfig;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    fn setup(config: &BookConfig) -> CompanyData {
        let rules = Rules::standard(config);
        let mut data = CompanyData::seeded(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        let sales = data
            .create_ledger(
                NewLedger::new("Sales 12%", "g5", dec("0"), EntryType::Credit).with_tax_details(
                    TaxDetails {
                        tax_rate: Some(dec("12")),
                        tax_type: Some(TaxType::Gst),
                        ..TaxDetails::default()
                    },
                ),
                &rules,
            )
            .unwrap();
        let customer = data
            .create_ledger(
                NewLedger::new("Mehta Traders", "g9", dec("0"), EntryType::Debit).with_tax_details(
                    TaxDetails {
                        gstin: Some("27AAACM1234A1Z9".to_string()),
                        ..TaxDetails::default()
                    },
                ),
                &rules,
            )
            .unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        for (party, amount) in [(customer.id.as_str(), "1000"), ("l1", "500")] {
            let voucher = patterns::sale(date, party, &sales.id, dec(amount), "").unwrap();
            data.create_voucher(voucher, &rules).unwrap();
        }
        data
    }

    #[test]
    fn test_register_splits_by_place_of_supply() {
        let mut config = BookConfig::default();
        config.gst.home_state_code = Some("29".to_string());
        let data = setup(&config);

        let register = gst_sales_register(&data, &config.gst).unwrap();
        assert_eq!(register.rows.len(), 2);

        let registered = &register.rows[0];
        assert_eq!(registered.gstin, "27AAACM1234A1Z9");
        assert_eq!(registered.supply, SupplyKind::InterState);
        assert_eq!(registered.tax.igst_amount, dec("120"));

        let cash = &register.rows[1];
        assert_eq!(cash.gstin, UNREGISTERED_PARTY);
        assert_eq!(cash.party_name, "Cash");
        assert_eq!(cash.tax.cgst_amount, dec("30"));
        assert_eq!(register.total_tax, dec("180"));
        assert_eq!(register.total_taxable_value, dec("1500"));
    }

    #[test]
    fn test_default_rate_applies_without_ledger_rate() {
        let config = BookConfig::default();
        let rules = Rules::standard(&config);
        let mut data = CompanyData::seeded(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        let sales = data
            .create_ledger(NewLedger::new("Sales", "g5", dec("0"), EntryType::Credit), &rules)
            .unwrap();
        let voucher = patterns::sale(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            "l1",
            &sales.id,
            dec("200"),
            "",
        )
        .unwrap();
        data.create_voucher(voucher, &rules).unwrap();

        let register = gst_sales_register(&data, &config.gst).unwrap();
        assert_eq!(register.rows[0].tax.total_tax, dec("36"));
    }
}
