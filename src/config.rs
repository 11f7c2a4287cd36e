pub mod price_list;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{BillingError, BillingResult};
use crate::medicine::rules::{STANDARD_BOTTLE_ML, TABLESPOON_ML, TEASPOON_ML};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub calculator: CalculatorConfig,
    pub billing: BillingConfig,
}

/// Volume constants used by the liquid-medicine rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    pub standard_bottle_ml: f64,
    pub teaspoon_ml: f64,
    pub tablespoon_ml: f64,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            standard_bottle_ml: STANDARD_BOTTLE_ML,
            teaspoon_ml: TEASPOON_ML,
            tablespoon_ml: TABLESPOON_ML,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    pub currency: String,
    pub price_list: Option<PathBuf>,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            currency: "PHP".to_string(),
            price_list: None,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> BillingResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BillingResult<()> {
        let calc = &self.calculator;
        let volumes = [
            ("standard_bottle_ml", calc.standard_bottle_ml),
            ("teaspoon_ml", calc.teaspoon_ml),
            ("tablespoon_ml", calc.tablespoon_ml),
        ];

        for (name, value) in volumes {
            if !value.is_finite() || value <= 0.0 {
                return Err(BillingError::InvalidConfig(
                    format!("{} must be a positive number", name)
                ));
            }
        }

        if self.billing.currency.trim().is_empty() {
            return Err(BillingError::InvalidConfig(
                "Currency label must not be empty".to_string()
            ));
        }

        Ok(())
    }
}
