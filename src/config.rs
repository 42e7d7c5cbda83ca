//! Book configuration management.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BookConfig {
    /// Largest Dr/Cr difference still treated as balanced.
    #[serde(default = "default_tolerance")]
    pub balance_tolerance: BigDecimal,
    /// Hop limit when walking a group's parent chain.
    #[serde(default = "default_max_group_depth")]
    pub max_group_depth: usize,
    /// How new vouchers are numbered.
    #[serde(default)]
    pub voucher_numbering: NumberingPolicy,
    /// Whether stock valuation applies posted allocations.
    #[serde(default)]
    pub stock_valuation: StockValuationMode,
    /// GST register settings.
    #[serde(default)]
    pub gst: GstConfig,
    /// Pay sheet settings.
    #[serde(default)]
    pub payroll: PayrollConfig,
    /// Snapshot file settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Voucher numbering policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberingPolicy {
    /// Monotonic creation-order sequence; numbers are never reused.
    #[default]
    Sequential,
    /// Current voucher count + 1; may repeat a surviving number after deletions.
    LiveCount,
}

/// Stock valuation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockValuationMode {
    /// Opening quantity adjusted by posted inward/outward allocations.
    #[default]
    WithMovements,
    /// Opening quantity x opening rate only.
    OpeningOnly,
}

/// GST configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GstConfig {
    /// Rate (percent) applied when a sales ledger carries no tax rate.
    #[serde(default = "default_gst_rate")]
    pub default_rate: BigDecimal,
    /// Two-digit state code of the company; parties in other states pay IGST.
    #[serde(default)]
    pub home_state_code: Option<String>,
}

impl Default for GstConfig {
    fn default() -> Self {
        Self {
            default_rate: default_gst_rate(),
            home_state_code: None,
        }
    }
}

/// Payroll configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollConfig {
    /// House rent allowance as percent of basic.
    #[serde(default = "default_hra_percent")]
    pub hra_percent: BigDecimal,
    /// Provident fund deduction as percent of basic.
    #[serde(default = "default_pf_percent")]
    pub pf_percent: BigDecimal,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            hra_percent: default_hra_percent(),
            pf_percent: default_pf_percent(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON snapshot file.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

fn default_tolerance() -> BigDecimal {
    BigDecimal::new(1.into(), 2)
}

fn default_max_group_depth() -> usize {
    64
}

fn default_gst_rate() -> BigDecimal {
    BigDecimal::from(18)
}

fn default_hra_percent() -> BigDecimal {
    BigDecimal::from(40)
}

fn default_pf_percent() -> BigDecimal {
    BigDecimal::from(12)
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("company.json")
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: default_tolerance(),
            max_group_depth: default_max_group_depth(),
            voucher_numbering: NumberingPolicy::default(),
            stock_valuation: StockValuationMode::default(),
            gst: GstConfig::default(),
            payroll: PayrollConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl BookConfig {
    /// Loads configuration from `config/default` (if present) and
    /// `BOOKKEEPING__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a source exists but cannot be parsed.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::builder("config/default").build()?.try_deserialize()
    }

    /// Loads configuration from an explicit file (extension picks the format),
    /// still honouring environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed.
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(path).required(true))
            .add_source(config::Environment::with_prefix("BOOKKEEPING").separator("__"))
            .build()?
            .try_deserialize()
    }

    fn builder(default_path: &str) -> config::ConfigBuilder<config::builder::DefaultState> {
        config::Config::builder()
            .add_source(config::File::with_name(default_path).required(false))
            .add_source(config::Environment::with_prefix("BOOKKEEPING").separator("__"))
    }
}
