use once_cell::sync::Lazy;
use std::collections::HashMap;
use crate::config::CalculatorConfig;
use super::MedicineType;

pub const STANDARD_BOTTLE_ML: f64 = 100.0;
pub const TEASPOON_ML: f64 = 5.0;
pub const TABLESPOON_ML: f64 = 15.0;

static STANDARD_RULES: Lazy<RuleTable> = Lazy::new(|| {
    RuleTable::from_config(&CalculatorConfig::default())
});

#[derive(Debug, Clone, PartialEq)]
pub struct MedicineTypeRule {
    pub unit: &'static str,
    pub can_be_partial: bool,
    /// Bottled liquids only: ward courses may bill a fractional bottle.
    pub can_be_partial_inpatient: Option<bool>,
    /// Bottled liquids only: ml per whole bottle.
    pub standard_bottle_ml: Option<f64>,
}

impl MedicineTypeRule {
    const fn unit(unit: &'static str, can_be_partial: bool) -> Self {
        Self {
            unit,
            can_be_partial,
            can_be_partial_inpatient: None,
            standard_bottle_ml: None,
        }
    }

    fn bottle(bottle_ml: f64) -> Self {
        Self {
            unit: "bottle",
            can_be_partial: false,
            can_be_partial_inpatient: Some(true),
            standard_bottle_ml: Some(bottle_ml),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: HashMap<MedicineType, MedicineTypeRule>,
    teaspoon_ml: f64,
    tablespoon_ml: f64,
}

impl RuleTable {
    pub fn standard() -> &'static RuleTable {
        &STANDARD_RULES
    }

    pub fn from_config(config: &CalculatorConfig) -> Self {
        let bottle_ml = config.standard_bottle_ml;
        let rules = MedicineType::REGISTERED
            .iter()
            .filter_map(|med_type| {
                let rule = match med_type {
                    MedicineType::Tablet => MedicineTypeRule::unit("tablet", true),
                    MedicineType::Capsule => MedicineTypeRule::unit("capsule", false),
                    MedicineType::Syrup | MedicineType::Solution => MedicineTypeRule::bottle(bottle_ml),
                    MedicineType::MlCc => MedicineTypeRule::unit("ml", true),
                    MedicineType::Tsp => MedicineTypeRule::unit("tsp", true),
                    MedicineType::Tbsp => MedicineTypeRule::unit("tbsp", true),
                    MedicineType::Mg => MedicineTypeRule::unit("mg", true),
                    MedicineType::Mcg => MedicineTypeRule::unit("mcg", true),
                    MedicineType::Meq => MedicineTypeRule::unit("meq", true),
                    MedicineType::Amp => MedicineTypeRule::unit("ampoule", false),
                    MedicineType::Tube => MedicineTypeRule::unit("tube", false),
                    MedicineType::Formula => MedicineTypeRule::unit("pack", false),
                    MedicineType::Qty => MedicineTypeRule::unit("unit", false),
                    MedicineType::Unregistered(_) => return None,
                };
                Some((med_type.clone(), rule))
            })
            .collect();

        Self {
            rules,
            teaspoon_ml: config.teaspoon_ml,
            tablespoon_ml: config.tablespoon_ml,
        }
    }

    pub fn get(&self, med_type: &MedicineType) -> Option<&MedicineTypeRule> {
        self.rules.get(med_type)
    }

    /// Milliliters per one unit of a volume form, `None` for non-volume forms.
    pub fn ml_per_unit(&self, med_type: &MedicineType) -> Option<f64> {
        match med_type {
            MedicineType::MlCc | MedicineType::Syrup | MedicineType::Solution => Some(1.0),
            MedicineType::Tsp => Some(self.teaspoon_ml),
            MedicineType::Tbsp => Some(self.tablespoon_ml),
            _ => None,
        }
    }

    // Non-volume units pass through unchanged.
    pub fn convert_to_ml(&self, amount: f64, med_type: &MedicineType) -> f64 {
        amount * self.ml_per_unit(med_type).unwrap_or(1.0)
    }
}
