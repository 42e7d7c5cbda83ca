//! Validation utilities and the stricter validator set

use std::collections::HashSet;

use crate::inventory::NewStockItem;
use crate::ledger::account::{NewGroup, NewLedger};
use crate::ledger::transaction::NewVoucher;
use crate::state::CompanyData;
use crate::tax::gst::validate_gstin;
use crate::traits::*;
use crate::types::*;
use bigdecimal::BigDecimal;

/// Longest accepted master name
pub const MAX_NAME_LENGTH: usize = 100;

/// Longest accepted voucher narration
pub const MAX_NARRATION_LENGTH: usize = 500;

/// Validate that a master name fits the length limit
pub fn validate_name_length(master: &str, name: &str) -> Option<Violation> {
    (name.trim().chars().count() > MAX_NAME_LENGTH).then(|| {
        Violation::Rule(format!(
            "{master} name cannot exceed {MAX_NAME_LENGTH} characters"
        ))
    })
}

/// Validate that a ledger name is not already taken (case-insensitive)
pub fn validate_unique_ledger_name(name: &str, data: &CompanyData) -> Option<Violation> {
    data.find_ledger_by_name(name)
        .map(|existing| Violation::Rule(format!("Ledger '{}' already exists", existing.name)))
}

/// Validate the GSTIN carried in tax details, if any
pub fn validate_tax_details(tax_details: Option<&TaxDetails>) -> Option<Violation> {
    tax_details
        .and_then(TaxDetails::registered_gstin)
        .and_then(|gstin| validate_gstin(gstin).err())
        .map(|err| Violation::Rule(err.to_string()))
}

/// Enhanced master validator with detailed checks
pub struct EnhancedMasterValidator;

impl MasterValidator for EnhancedMasterValidator {
    fn validate_group(&self, group: &NewGroup, data: &CompanyData) -> Violations {
        let mut violations: Vec<Violation> = validate_name_length("Group", &group.name).into_iter().collect();
        if data
            .groups
            .iter()
            .any(|g| g.name.eq_ignore_ascii_case(group.name.trim()))
        {
            violations.push(Violation::Rule(format!(
                "Group '{}' already exists",
                group.name.trim()
            )));
        }
        violations.into()
    }

    fn validate_ledger(&self, ledger: &NewLedger, data: &CompanyData) -> Violations {
        let mut violations: Vec<Violation> = validate_name_length("Ledger", &ledger.name).into_iter().collect();
        violations.extend(validate_unique_ledger_name(&ledger.name, data));
        violations.extend(validate_tax_details(ledger.tax_details.as_ref()));
        violations.into()
    }

    fn validate_stock_item(&self, item: &NewStockItem, _data: &CompanyData) -> Violations {
        let mut violations: Vec<Violation> = validate_name_length("Stock item", &item.name).into_iter().collect();
        violations.extend(validate_tax_details(item.tax_details.as_ref()));
        violations.into()
    }
}

/// Enhanced voucher validator with detailed checks
pub struct EnhancedVoucherValidator;

impl VoucherValidator for EnhancedVoucherValidator {
    fn validate_voucher(
        &self,
        voucher: &NewVoucher,
        _data: &CompanyData,
        _tolerance: &BigDecimal,
    ) -> Violations {
        let mut violations = Vec::new();

        if voucher.narration.chars().count() > MAX_NARRATION_LENGTH {
            violations.push(Violation::Rule(format!(
                "Narration cannot exceed {MAX_NARRATION_LENGTH} characters"
            )));
        }

        // Same ledger cannot appear twice on the same side
        let mut seen = HashSet::new();
        for entry in &voucher.entries {
            if !seen.insert((entry.ledger_id.as_str(), entry.entry_type)) {
                violations.push(Violation::Rule(format!(
                    "Ledger '{}' appears multiple times as {} in voucher",
                    entry.ledger_id, entry.entry_type
                )));
            }
        }

        violations.into()
    }
}

/// Built-in configuration with the enhanced validators
pub fn enhanced_rules(config: &crate::config::BookConfig) -> Rules<'_> {
    Rules {
        config,
        masters: &EnhancedMasterValidator,
        vouchers: &EnhancedVoucherValidator,
    }
}
