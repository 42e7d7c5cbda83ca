//! GST (Goods and Services Tax) split for outward supplies

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};

use crate::types::{LedgerError, Violation};

/// Whether a supply stays inside the company's state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplyKind {
    /// CGST + SGST
    IntraState,
    /// IGST
    InterState,
}

impl SupplyKind {
    /// Place of supply from the two state codes.
    ///
    /// Unknown codes on either side (unregistered party, company without a
    /// configured state) are treated as intra-state.
    pub fn between(home_state: Option<&str>, party_state: Option<&str>) -> Self {
        match (home_state, party_state) {
            (Some(home), Some(party)) if home != party => SupplyKind::InterState,
            _ => SupplyKind::IntraState,
        }
    }
}

/// GST rate broken into its components, all in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GstRate {
    pub total_rate: BigDecimal,
    pub cgst_rate: BigDecimal,
    pub sgst_rate: BigDecimal,
    pub igst_rate: BigDecimal,
}

impl GstRate {
    /// Intra-state rate: half CGST, half SGST
    pub fn intra_state(total_rate: BigDecimal) -> Self {
        let half_rate = &total_rate / BigDecimal::from(2);
        Self {
            total_rate,
            cgst_rate: half_rate.clone(),
            sgst_rate: half_rate,
            igst_rate: BigDecimal::from(0),
        }
    }

    /// Inter-state rate: all IGST
    pub fn inter_state(total_rate: BigDecimal) -> Self {
        Self {
            total_rate: total_rate.clone(),
            cgst_rate: BigDecimal::from(0),
            sgst_rate: BigDecimal::from(0),
            igst_rate: total_rate,
        }
    }

    pub fn for_supply(total_rate: BigDecimal, kind: SupplyKind) -> Self {
        match kind {
            SupplyKind::IntraState => Self::intra_state(total_rate),
            SupplyKind::InterState => Self::inter_state(total_rate),
        }
    }

    /// Check the components add up and are not mixed across supply kinds
    pub fn validate(&self) -> Result<(), GstError> {
        let zero = BigDecimal::from(0);
        if self.total_rate < zero || self.total_rate > BigDecimal::from(100) {
            return Err(GstError::InvalidRate(format!(
                "GST rate must be between 0 and 100, got {}",
                self.total_rate
            )));
        }

        let calculated_total = &self.cgst_rate + &self.sgst_rate + &self.igst_rate;
        if calculated_total != self.total_rate {
            return Err(GstError::InvalidRate(format!(
                "GST components don't add up to total rate: {} != {}",
                calculated_total, self.total_rate
            )));
        }

        if self.igst_rate > zero && (self.cgst_rate > zero || self.sgst_rate > zero) {
            return Err(GstError::InvalidRate(
                "IGST cannot be combined with CGST/SGST".to_string(),
            ));
        }
        if self.igst_rate == zero && self.cgst_rate != self.sgst_rate {
            return Err(GstError::InvalidRate(
                "CGST and SGST rates must be equal".to_string(),
            ));
        }

        Ok(())
    }
}

/// Tax on one taxable value, each component rounded to paise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GstCalculation {
    pub taxable_value: BigDecimal,
    pub gst_rate: GstRate,
    pub cgst_amount: BigDecimal,
    pub sgst_amount: BigDecimal,
    pub igst_amount: BigDecimal,
    pub total_tax: BigDecimal,
    pub invoice_value: BigDecimal,
}

impl GstCalculation {
    pub fn calculate(taxable_value: BigDecimal, gst_rate: GstRate) -> Result<Self, GstError> {
        gst_rate.validate()?;

        let portion = |rate: &BigDecimal| {
            (&taxable_value * rate / BigDecimal::from(100)).with_scale_round(2, RoundingMode::HalfUp)
        };
        let cgst_amount = portion(&gst_rate.cgst_rate);
        let sgst_amount = portion(&gst_rate.sgst_rate);
        let igst_amount = portion(&gst_rate.igst_rate);

        let total_tax = &cgst_amount + &sgst_amount + &igst_amount;
        let invoice_value = &taxable_value + &total_tax;

        Ok(Self {
            taxable_value,
            gst_rate,
            cgst_amount,
            sgst_amount,
            igst_amount,
            total_tax,
            invoice_value,
        })
    }
}

/// Structural check of a GSTIN: 15 alphanumeric characters starting with a
/// two-digit state code
pub fn validate_gstin(gstin: &str) -> Result<(), GstError> {
    let gstin = gstin.trim();
    if gstin.len() != 15 || !gstin.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(GstError::InvalidGstin(gstin.to_string()));
    }
    if !gstin[..2].chars().all(|c| c.is_ascii_digit()) {
        return Err(GstError::InvalidGstin(gstin.to_string()));
    }
    Ok(())
}

/// GST-related errors
#[derive(Debug, thiserror::Error)]
pub enum GstError {
    #[error("Invalid GST rate: {0}")]
    InvalidRate(String),
    #[error("Invalid GSTIN: {0}")]
    InvalidGstin(String),
}

impl From<GstError> for LedgerError {
    fn from(err: GstError) -> Self {
        LedgerError::Validation(vec![Violation::Rule(err.to_string())].into())
    }
}
