//! Stock masters: items, stock groups, godowns, units and batches
//!
//! Quantities on hand are never stored. They are derived from the opening
//! quantity plus the allocations on posted vouchers (see [`movement`]).

pub mod movement;

pub use movement::*;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::state::CompanyData;
use crate::traits::*;
use crate::types::*;

/// Grouping node for stock items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockGroup {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_group_id: Option<String>,
    /// Unit id or short name
    pub unit: String,
    #[serde(with = "bigdecimal::serde::json_num")]
    pub opening_quantity: BigDecimal,
    #[serde(with = "bigdecimal::serde::json_num")]
    pub opening_rate: BigDecimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub godown_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "bigdecimal::serde::json_num_option")]
    pub reorder_level: Option<BigDecimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintain_batches: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_details: Option<TaxDetails>,
}

impl StockItem {
    pub fn opening_value(&self) -> BigDecimal {
        &self.opening_quantity * &self.opening_rate
    }

    pub fn maintains_batches(&self) -> bool {
        self.maintain_batches.unwrap_or(false)
    }
}

/// Storage location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Godown {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Unit of measure, e.g. `Nos` / `Numbers`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: String,
    pub name: String,
    pub formal_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: String,
    pub item_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturing_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStockGroup {
    pub name: String,
    pub parent_id: Option<String>,
}

impl NewStockGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_id: None,
        }
    }

    pub fn under(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

/// Request to create a stock item
#[derive(Debug, Clone, PartialEq)]
pub struct NewStockItem {
    pub name: String,
    pub stock_group_id: Option<String>,
    pub unit: String,
    pub opening_quantity: BigDecimal,
    pub opening_rate: BigDecimal,
    pub godown_id: Option<String>,
    pub reorder_level: Option<BigDecimal>,
    pub maintain_batches: bool,
    pub tax_details: Option<TaxDetails>,
}

impl NewStockItem {
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        opening_quantity: BigDecimal,
        opening_rate: BigDecimal,
    ) -> Self {
        Self {
            name: name.into(),
            stock_group_id: None,
            unit: unit.into(),
            opening_quantity,
            opening_rate,
            godown_id: None,
            reorder_level: None,
            maintain_batches: false,
            tax_details: None,
        }
    }

    pub fn in_group(mut self, stock_group_id: impl Into<String>) -> Self {
        self.stock_group_id = Some(stock_group_id.into());
        self
    }

    pub fn in_godown(mut self, godown_id: impl Into<String>) -> Self {
        self.godown_id = Some(godown_id.into());
        self
    }

    pub fn with_reorder_level(mut self, level: BigDecimal) -> Self {
        self.reorder_level = Some(level);
        self
    }

    pub fn with_batches(mut self) -> Self {
        self.maintain_batches = true;
        self
    }

    pub fn with_tax_details(mut self, tax_details: TaxDetails) -> Self {
        self.tax_details = Some(tax_details);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGodown {
    pub name: String,
    pub location: Option<String>,
}

impl NewGodown {
    pub fn new(name: impl Into<String>, location: Option<String>) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUnit {
    pub name: String,
    pub formal_name: String,
}

impl NewUnit {
    pub fn new(name: impl Into<String>, formal_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            formal_name: formal_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBatch {
    pub item_id: String,
    pub name: String,
    pub manufacturing_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
}

impl NewBatch {
    pub fn new(item_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            name: name.into(),
            manufacturing_date: None,
            expiry_date: None,
        }
    }

    pub fn dated(mut self, manufacturing: Option<NaiveDate>, expiry: Option<NaiveDate>) -> Self {
        self.manufacturing_date = manufacturing;
        self.expiry_date = expiry;
        self
    }
}

/// Built-in checks for a new stock item
pub fn stock_item_violations(item: &NewStockItem, data: &CompanyData) -> Violations {
    let zero = BigDecimal::from(0);
    let mut violations = Vec::new();

    if item.name.trim().is_empty() {
        violations.push(Violation::EmptyName {
            master: "Stock item",
        });
    }
    if data.unit(&item.unit).is_none() {
        violations.push(Violation::UnknownUnit {
            unit: item.unit.clone(),
        });
    }
    if let Some(godown_id) = &item.godown_id {
        if data.godown(godown_id).is_none() {
            violations.push(Violation::UnknownReference {
                entity: EntityKind::Godown,
                id: godown_id.clone(),
            });
        }
    }
    if let Some(group_id) = &item.stock_group_id {
        if data.stock_group(group_id).is_none() {
            violations.push(Violation::UnknownReference {
                entity: EntityKind::StockGroup,
                id: group_id.clone(),
            });
        }
    }
    if item.opening_quantity < zero {
        violations.push(Violation::NegativeValue {
            field: "Opening quantity",
        });
    }
    if item.opening_rate < zero {
        violations.push(Violation::NegativeValue {
            field: "Opening rate",
        });
    }
    if item.reorder_level.as_ref().is_some_and(|level| *level < zero) {
        violations.push(Violation::NegativeValue {
            field: "Reorder level",
        });
    }
    violations.extend(item.tax_details.as_ref().and_then(TaxDetails::rate_violation));

    violations.into()
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl CompanyData {
    pub fn create_stock_group(&mut self, new: NewStockGroup) -> LedgerResult<StockGroup> {
        let mut violations = Vec::new();
        if new.name.trim().is_empty() {
            violations.push(Violation::EmptyName {
                master: "Stock group",
            });
        }
        if let Some(parent_id) = &new.parent_id {
            if self.stock_group(parent_id).is_none() {
                violations.push(Violation::UnknownParent {
                    master: "stock group",
                    parent_id: parent_id.clone(),
                });
            }
        }
        Violations::from(violations).into_result()?;

        let group = StockGroup {
            id: new_id(),
            name: new.name.trim().to_string(),
            parent_id: new.parent_id,
        };
        self.stock_groups.push(group.clone());
        Ok(group)
    }

    pub fn create_stock_item(
        &mut self,
        new: NewStockItem,
        rules: &Rules<'_>,
    ) -> LedgerResult<StockItem> {
        let mut violations = stock_item_violations(&new, self);
        violations.extend(rules.masters.validate_stock_item(&new, self));
        violations.into_result()?;

        let item = StockItem {
            id: new_id(),
            name: new.name.trim().to_string(),
            stock_group_id: new.stock_group_id,
            unit: new.unit,
            opening_quantity: new.opening_quantity,
            opening_rate: new.opening_rate,
            godown_id: new.godown_id,
            reorder_level: new.reorder_level,
            maintain_batches: Some(new.maintain_batches),
            tax_details: new.tax_details,
        };
        self.stock_items.push(item.clone());
        Ok(item)
    }

    pub fn create_godown(&mut self, new: NewGodown) -> LedgerResult<Godown> {
        let mut violations = Vec::new();
        if new.name.trim().is_empty() {
            violations.push(Violation::EmptyName { master: "Godown" });
        }
        Violations::from(violations).into_result()?;

        let godown = Godown {
            id: new_id(),
            name: new.name.trim().to_string(),
            location: new.location.filter(|l| !l.trim().is_empty()),
        };
        self.godowns.push(godown.clone());
        Ok(godown)
    }

    pub fn create_unit(&mut self, new: NewUnit) -> LedgerResult<Unit> {
        let mut violations = Vec::new();
        if new.name.trim().is_empty() {
            violations.push(Violation::EmptyName { master: "Unit" });
        } else if self.unit(new.name.trim()).is_some() {
            violations.push(Violation::Rule(format!(
                "Unit '{}' already exists",
                new.name.trim()
            )));
        }
        Violations::from(violations).into_result()?;

        let unit = Unit {
            id: new_id(),
            name: new.name.trim().to_string(),
            formal_name: new.formal_name.trim().to_string(),
        };
        self.units.push(unit.clone());
        Ok(unit)
    }

    pub fn create_batch(&mut self, new: NewBatch) -> LedgerResult<Batch> {
        let mut violations = Vec::new();
        if new.name.trim().is_empty() {
            violations.push(Violation::EmptyName { master: "Batch" });
        }
        match self.stock_item(&new.item_id) {
            None => violations.push(Violation::UnknownReference {
                entity: EntityKind::StockItem,
                id: new.item_id.clone(),
            }),
            Some(item) if !item.maintains_batches() => {
                violations.push(Violation::BatchesNotMaintained {
                    item_id: new.item_id.clone(),
                })
            }
            Some(_) => {}
        }
        if let (Some(mfg), Some(expiry)) = (new.manufacturing_date, new.expiry_date) {
            if expiry < mfg {
                violations.push(Violation::ExpiryBeforeManufacture);
            }
        }
        Violations::from(violations).into_result()?;

        let batch = Batch {
            id: new_id(),
            item_id: new.item_id,
            name: new.name.trim().to_string(),
            manufacturing_date: new.manufacturing_date,
            expiry_date: new.expiry_date,
        };
        self.batches.push(batch.clone());
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BookConfig;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    fn company() -> CompanyData {
        CompanyData::seeded(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap())
    }

    #[test]
    fn test_create_stock_item_by_unit_name() {
        let config = BookConfig::default();
        let rules = Rules::standard(&config);
        let mut data = company();

        let item = data
            .create_stock_item(
                NewStockItem::new("Widget", "Nos", dec("10"), dec("25")).in_godown("gd1"),
                &rules,
            )
            .unwrap();
        assert_eq!(item.opening_value(), dec("250"));
        assert_eq!(data.stock_items.len(), 1);
    }

    #[test]
    fn test_create_stock_item_collects_violations() {
        let config = BookConfig::default();
        let rules = Rules::standard(&config);
        let mut data = company();

        let err = data
            .create_stock_item(
                NewStockItem::new("", "Kgs", dec("-1"), dec("5")).in_godown("gd9"),
                &rules,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.violations().len(), 4);
        assert!(data.stock_items.is_empty());
    }

    #[test]
    fn test_stock_item_tax_rate_out_of_range() {
        let config = BookConfig::default();
        let rules = Rules::standard(&config);
        let mut data = company();

        let item = NewStockItem::new("Gold Coin", "Nos", dec("1"), dec("6000")).with_tax_details(
            TaxDetails {
                tax_rate: Some(dec("100.5")),
                ..TaxDetails::default()
            },
        );
        let err = data.create_stock_item(item, &rules).unwrap_err();
        assert_eq!(
            err.violations(),
            &[Violation::TaxRateOutOfRange { rate: dec("100.5") }]
        );
    }

    #[test]
    fn test_stock_group_parent_must_exist() {
        let mut data = company();
        let raw = data.create_stock_group(NewStockGroup::new("Raw Material")).unwrap();
        assert!(data
            .create_stock_group(NewStockGroup::new("Steel").under(&raw.id))
            .is_ok());
        assert!(data
            .create_stock_group(NewStockGroup::new("Copper").under("missing"))
            .is_err());
        assert_eq!(data.stock_groups.len(), 2);
    }

    #[test]
    fn test_batch_requires_batch_tracking() {
        let config = BookConfig::default();
        let rules = Rules::standard(&config);
        let mut data = company();

        let plain = data
            .create_stock_item(NewStockItem::new("Bolt", "u1", dec("0"), dec("1")), &rules)
            .unwrap();
        let tracked = data
            .create_stock_item(
                NewStockItem::new("Syrup", "u1", dec("0"), dec("40")).with_batches(),
                &rules,
            )
            .unwrap();

        let err = data.create_batch(NewBatch::new(&plain.id, "B1")).unwrap_err();
        assert!(matches!(
            err.violations()[0],
            Violation::BatchesNotMaintained { .. }
        ));
        assert!(data.create_batch(NewBatch::new(&tracked.id, "B1")).is_ok());
    }

    #[test]
    fn test_batch_expiry_after_manufacture() {
        let config = BookConfig::default();
        let rules = Rules::standard(&config);
        let mut data = company();
        let item = data
            .create_stock_item(
                NewStockItem::new("Syrup", "u1", dec("0"), dec("40")).with_batches(),
                &rules,
            )
            .unwrap();

        let err = data
            .create_batch(NewBatch::new(&item.id, "B2").dated(
                NaiveDate::from_ymd_opt(2024, 6, 1),
                NaiveDate::from_ymd_opt(2024, 5, 1),
            ))
            .unwrap_err();
        assert_eq!(err.violations(), &[Violation::ExpiryBeforeManufacture]);
    }

    #[test]
    fn test_create_godown_and_unit() {
        let mut data = company();
        let godown = data
            .create_godown(NewGodown::new("Warehouse", Some("Pune".to_string())))
            .unwrap();
        assert_eq!(data.godown(&godown.id).map(|g| g.name.as_str()), Some("Warehouse"));
        assert!(data.create_godown(NewGodown::new(" ", None)).is_err());

        data.create_unit(NewUnit::new("Kgs", "Kilograms")).unwrap();
        assert!(data.create_unit(NewUnit::new("kgs", "Kilos")).is_err());
        assert_eq!(data.units.len(), 2);
    }
}
