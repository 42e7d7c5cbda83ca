//! Monthly pay sheet

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};

use crate::config::PayrollConfig;
use crate::state::CompanyData;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaySheetRow {
    pub employee_id: String,
    pub name: String,
    pub designation: String,
    pub basic: BigDecimal,
    pub hra: BigDecimal,
    pub pf: BigDecimal,
    /// basic + HRA - PF
    pub net_pay: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaySheet {
    pub rows: Vec<PaySheetRow>,
    pub total_net_pay: BigDecimal,
}

fn percent_of(amount: &BigDecimal, percent: &BigDecimal) -> BigDecimal {
    (amount * percent / BigDecimal::from(100)).with_scale_round(2, RoundingMode::HalfUp)
}

pub fn pay_sheet(data: &CompanyData, config: &PayrollConfig) -> PaySheet {
    let rows: Vec<PaySheetRow> = data
        .employees
        .iter()
        .map(|employee| {
            let hra = percent_of(&employee.basic_salary, &config.hra_percent);
            let pf = percent_of(&employee.basic_salary, &config.pf_percent);
            let net_pay = &employee.basic_salary + &hra - &pf;
            PaySheetRow {
                employee_id: employee.id.clone(),
                name: employee.name.clone(),
                designation: employee.designation.clone(),
                basic: employee.basic_salary.clone(),
                hra,
                pf,
                net_pay,
            }
        })
        .collect();

    let total_net_pay = rows.iter().map(|r| &r.net_pay).sum();
    PaySheet {
        rows,
        total_net_pay,
    }
}
