//! Employee masters

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::state::CompanyData;
use crate::traits::*;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub designation: String,
    pub department: String,
    /// Forms may leave this blank; an empty string loads as `None`
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_date_as_none"
    )]
    pub date_of_joining: Option<NaiveDate>,
    /// Monthly basic salary
    #[serde(with = "bigdecimal::serde::json_num")]
    pub basic_salary: BigDecimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

fn blank_date_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(text) if !text.trim().is_empty() => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub name: String,
    pub designation: String,
    pub department: String,
    pub date_of_joining: NaiveDate,
    pub basic_salary: BigDecimal,
    pub email: Option<String>,
}

impl NewEmployee {
    pub fn new(
        name: impl Into<String>,
        designation: impl Into<String>,
        department: impl Into<String>,
        date_of_joining: NaiveDate,
        basic_salary: BigDecimal,
    ) -> Self {
        Self {
            name: name.into(),
            designation: designation.into(),
            department: department.into(),
            date_of_joining,
            basic_salary,
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Built-in checks for a new employee
pub fn employee_violations(employee: &NewEmployee, _data: &CompanyData) -> Violations {
    let mut violations = Vec::new();
    if employee.name.trim().is_empty() {
        violations.push(Violation::EmptyName { master: "Employee" });
    }
    if employee.basic_salary < BigDecimal::from(0) {
        violations.push(Violation::NegativeValue {
            field: "Basic salary",
        });
    }
    violations.into()
}

impl CompanyData {
    pub fn create_employee(
        &mut self,
        new: NewEmployee,
        rules: &Rules<'_>,
    ) -> LedgerResult<Employee> {
        let mut violations = employee_violations(&new, self);
        violations.extend(rules.masters.validate_employee(&new, self));
        violations.into_result()?;

        let employee = Employee {
            id: uuid::Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            designation: new.designation,
            department: new.department,
            date_of_joining: Some(new.date_of_joining),
            basic_salary: new.basic_salary,
            email: new.email.filter(|e| !e.trim().is_empty()),
        };
        self.employees.push(employee.clone());
        Ok(employee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BookConfig;

    #[test]
    fn test_create_employee() {
        let config = BookConfig::default();
        let rules = Rules::standard(&config);
        let mut data = CompanyData::seeded(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());

        let joined = NaiveDate::from_ymd_opt(2023, 1, 9).unwrap();
        let employee = data
            .create_employee(
                NewEmployee::new("Asha Rao", "Accountant", "Finance", joined, BigDecimal::from(30000))
                    .with_email("asha@example.com"),
                &rules,
            )
            .unwrap();
        assert_eq!(data.employee(&employee.id).map(|e| e.department.as_str()), Some("Finance"));

        let err = data
            .create_employee(
                NewEmployee::new("", "Clerk", "Admin", joined, BigDecimal::from(-1)),
                &rules,
            )
            .unwrap_err();
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_blank_joining_date_loads_as_none() {
        let employee: Employee = serde_json::from_str(
            r#"{"id": "e1", "name": "Meena", "designation": "Clerk", "department": "Admin",
                "dateOfJoining": "", "basicSalary": 15000}"#,
        )
        .unwrap();
        assert_eq!(employee.date_of_joining, None);
        assert_eq!(employee.basic_salary, BigDecimal::from(15000));

        let dated: Employee = serde_json::from_str(
            r#"{"id": "e2", "name": "Ravi", "designation": "Clerk", "department": "Admin",
                "dateOfJoining": "2023-06-01", "basicSalary": 15000.5}"#,
        )
        .unwrap();
        assert_eq!(dated.date_of_joining, NaiveDate::from_ymd_opt(2023, 6, 1));
        assert_eq!(dated.basic_salary, "15000.5".parse::<BigDecimal>().unwrap());

        let json = serde_json::to_value(&employee).unwrap();
        assert!(json.get("dateOfJoining").is_none());
    }
}
