pub mod rules;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::error::BillingError;

pub use rules::{MedicineTypeRule, RuleTable};

/// Forms missing from the rule table are carried as `Unregistered`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MedicineType {
    Tablet,
    Capsule,
    Syrup,
    Solution,
    MlCc,
    Tsp,
    Tbsp,
    Mg,
    Mcg,
    Meq,
    Amp,
    Tube,
    Formula,
    Qty,
    Unregistered(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MedicineCategory {
    Solid,
    Liquid,
    Generic,
}

impl MedicineType {
    pub const REGISTERED: [MedicineType; 14] = [
        MedicineType::Tablet,
        MedicineType::Capsule,
        MedicineType::Syrup,
        MedicineType::Solution,
        MedicineType::MlCc,
        MedicineType::Tsp,
        MedicineType::Tbsp,
        MedicineType::Mg,
        MedicineType::Mcg,
        MedicineType::Meq,
        MedicineType::Amp,
        MedicineType::Tube,
        MedicineType::Formula,
        MedicineType::Qty,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            MedicineType::Tablet => "Tablet",
            MedicineType::Capsule => "Capsule",
            MedicineType::Syrup => "Syrup",
            MedicineType::Solution => "Solution",
            MedicineType::MlCc => "ml/cc",
            MedicineType::Tsp => "tsp",
            MedicineType::Tbsp => "tbsp",
            MedicineType::Mg => "Mg",
            MedicineType::Mcg => "mcg",
            MedicineType::Meq => "meq",
            MedicineType::Amp => "amp",
            MedicineType::Tube => "tube",
            MedicineType::Formula => "formula",
            MedicineType::Qty => "Qty",
            MedicineType::Unregistered(name) => name,
        }
    }

    pub fn category(&self) -> MedicineCategory {
        match self {
            MedicineType::Tablet | MedicineType::Capsule => MedicineCategory::Solid,
            MedicineType::Syrup
            | MedicineType::Solution
            | MedicineType::MlCc
            | MedicineType::Tsp
            | MedicineType::Tbsp => MedicineCategory::Liquid,
            _ => MedicineCategory::Generic,
        }
    }

    pub fn is_registered(&self) -> bool {
        !matches!(self, MedicineType::Unregistered(_))
    }
}

impl FromStr for MedicineType {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err(BillingError::InvalidMedicineType(
                "Medicine type must not be empty".to_string()
            ));
        }

        if name.eq_ignore_ascii_case("ml") || name.eq_ignore_ascii_case("cc") {
            return Ok(MedicineType::MlCc);
        }

        let registered = MedicineType::REGISTERED
            .iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
            .cloned();

        Ok(registered.unwrap_or_else(|| MedicineType::Unregistered(name.to_string())))
    }
}

impl TryFrom<String> for MedicineType {
    type Error = BillingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MedicineType> for String {
    fn from(value: MedicineType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for MedicineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DoseFrequency {
    Qd,
    Bid,
    Tid,
    Qid,
    Qod,
    Qweek,
}

impl DoseFrequency {
    pub const ALL: [DoseFrequency; 6] = [
        DoseFrequency::Qd,
        DoseFrequency::Bid,
        DoseFrequency::Tid,
        DoseFrequency::Qid,
        DoseFrequency::Qod,
        DoseFrequency::Qweek,
    ];

    /// Administrations per day.
    pub fn daily_multiplier(&self) -> f64 {
        match self {
            DoseFrequency::Qd => 1.0,
            DoseFrequency::Bid => 2.0,
            DoseFrequency::Tid => 3.0,
            DoseFrequency::Qid => 4.0,
            DoseFrequency::Qod => 0.5,
            DoseFrequency::Qweek => 1.0 / 7.0,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DoseFrequency::Qd => "QD",
            DoseFrequency::Bid => "BID",
            DoseFrequency::Tid => "TID",
            DoseFrequency::Qid => "QID",
            DoseFrequency::Qod => "QOD",
            DoseFrequency::Qweek => "QWEEK",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DoseFrequency::Qd => "Once daily",
            DoseFrequency::Bid => "Twice daily",
            DoseFrequency::Tid => "Three times daily",
            DoseFrequency::Qid => "Four times daily",
            DoseFrequency::Qod => "Every other day",
            DoseFrequency::Qweek => "Once weekly",
        }
    }
}

impl FromStr for DoseFrequency {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        DoseFrequency::ALL
            .iter()
            .find(|f| f.code().eq_ignore_ascii_case(code))
            .copied()
            .ok_or_else(|| BillingError::InvalidFrequency(
                format!("Unknown frequency code: {:?}", s)
            ))
    }
}

impl TryFrom<String> for DoseFrequency {
    type Error = BillingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DoseFrequency> for String {
    fn from(value: DoseFrequency) -> Self {
        value.code().to_string()
    }
}

impl fmt::Display for DoseFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
