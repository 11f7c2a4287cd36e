pub mod solid;
pub mod liquid;
pub mod generic;
pub mod format;

use serde::{Deserialize, Serialize};
use log::{debug, warn};
use crate::error::{BillingError, BillingResult};
use crate::medicine::{DoseFrequency, MedicineCategory, MedicineType, RuleTable};

pub use format::format_dosage_for_bill;

/// Differences below this are treated as floating-point noise before a ceiling.
const FLOAT_NOISE: f64 = 1e-9;

pub trait QuantityRule {
    fn resolve(&self, course: &DoseCourse, rules: &RuleTable) -> BillingResult<ResolvedQuantity>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosageRequest {
    pub dose_prescribed: String,
    pub med_type: MedicineType,
    pub dose_frequency: DoseFrequency,
    pub total_days: i64,
    pub base_price: f64,
    #[serde(default)]
    pub is_inpatient: bool,
    #[serde(default)]
    pub is_discharge_medicine: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosageResult {
    pub total_quantity: f64,
    pub quantity_unit: String,
    pub price_per_unit: f64,
    pub total_price: f64,
    pub is_partial_allowed: bool,
    /// False when the medicine form has no rule-table entry and the
    /// quantity was derived with a guessed unit.
    pub is_registered_type: bool,
    pub calculation_details: String,
}

#[derive(Debug, Clone)]
pub struct DoseCourse<'a> {
    pub dose: f64,
    pub med_type: &'a MedicineType,
    pub frequency: DoseFrequency,
    pub total_days: u32,
    pub is_inpatient: bool,
    pub is_discharge_medicine: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuantity {
    pub quantity: f64,
    pub unit: String,
    /// Set by rules that decide fractional billing per call (bottled liquids).
    pub partial_applied: Option<bool>,
    pub details: String,
}

impl<'a> DoseCourse<'a> {
    pub fn raw_total(&self) -> f64 {
        self.dose * self.frequency.daily_multiplier() * self.total_days as f64
    }

    pub fn describe(&self) -> String {
        format!(
            "{} x {}/day ({}) x {} {}",
            format_amount(self.dose),
            format_amount(self.frequency.daily_multiplier()),
            self.frequency.code(),
            self.total_days,
            if self.total_days == 1 { "day" } else { "days" },
        )
    }
}

pub fn create_quantity_rule(category: MedicineCategory) -> Box<dyn QuantityRule> {
    match category {
        MedicineCategory::Solid => Box::new(solid::SolidQuantity),
        MedicineCategory::Liquid => Box::new(liquid::LiquidQuantity),
        MedicineCategory::Generic => Box::new(generic::GenericQuantity),
    }
}

pub struct DosageCalculator<'r> {
    rules: &'r RuleTable,
}

impl DosageCalculator<'static> {
    pub fn standard() -> Self {
        Self::new(RuleTable::standard())
    }
}

impl<'r> DosageCalculator<'r> {
    pub fn new(rules: &'r RuleTable) -> Self {
        Self { rules }
    }

    pub fn calculate(&self, request: &DosageRequest) -> BillingResult<DosageResult> {
        let dose = parse_dose(&request.dose_prescribed)?;

        if request.total_days <= 0 {
            return Err(BillingError::InvalidDuration(
                format!("Total days must be positive, got {}", request.total_days)
            ));
        }
        let total_days = u32::try_from(request.total_days).map_err(|_| {
            BillingError::InvalidDuration(format!("Total days {} is out of range", request.total_days))
        })?;

        if !request.base_price.is_finite() || request.base_price <= 0.0 {
            return Err(BillingError::InvalidPrice(
                format!("Base price must be positive, got {}", request.base_price)
            ));
        }

        let course = DoseCourse {
            dose,
            med_type: &request.med_type,
            frequency: request.dose_frequency,
            total_days,
            is_inpatient: request.is_inpatient,
            is_discharge_medicine: request.is_discharge_medicine,
        };

        let resolved = create_quantity_rule(request.med_type.category())
            .resolve(&course, self.rules)?;
        if !resolved.quantity.is_finite() {
            return Err(BillingError::InvalidDose(
                format!("Course total for dose {:?} is out of range", request.dose_prescribed)
            ));
        }

        let rule = self.rules.get(&request.med_type);
        if rule.is_none() {
            warn!(
                "Medicine type {:?} has no billing rule; quantity priced as generic {}",
                request.med_type.as_str(),
                resolved.unit
            );
        }

        let is_partial_allowed = resolved
            .partial_applied
            .or_else(|| rule.map(|r| r.can_be_partial))
            .unwrap_or(true);

        let total_price = round2(request.base_price * resolved.quantity);
        if !total_price.is_finite() {
            return Err(BillingError::InvalidPrice(
                format!(
                    "Total for {} {} at {} is out of range",
                    format_amount(resolved.quantity),
                    resolved.unit,
                    request.base_price
                )
            ));
        }

        debug!(
            "Priced {} {}: {} {} x {} = {}",
            format_amount(dose),
            request.med_type,
            format_amount(resolved.quantity),
            resolved.unit,
            format_amount(request.base_price),
            format_amount(total_price)
        );

        Ok(DosageResult {
            total_quantity: resolved.quantity,
            quantity_unit: resolved.unit,
            price_per_unit: request.base_price,
            total_price,
            is_partial_allowed,
            is_registered_type: rule.is_some(),
            calculation_details: format!(
                "{}; price {} x {} = {}",
                resolved.details,
                format_amount(request.base_price),
                format_amount(resolved.quantity),
                format_amount(total_price)
            ),
        })
    }
}

/// Prices a prescription line against the standard rule table.
pub fn calculate_medicine_dosage(request: &DosageRequest) -> BillingResult<DosageResult> {
    DosageCalculator::standard().calculate(request)
}

fn parse_dose(text: &str) -> BillingResult<f64> {
    let dose: f64 = text.trim().parse().map_err(|_| {
        BillingError::InvalidDose(format!("{:?} is not a number", text))
    })?;

    if !dose.is_finite() || dose <= 0.0 {
        return Err(BillingError::InvalidDose(
            format!("Dose must be positive, got {:?}", text)
        ));
    }

    Ok(dose)
}

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whole-unit ceiling that ignores floating-point noise, so 0.1 x 3 x 10 bills 3.
/// A positive amount never rounds down to zero.
pub fn ceil_units(value: f64) -> f64 {
    let nearest = value.round();
    if nearest >= 1.0 && (value - nearest).abs() < FLOAT_NOISE {
        nearest
    } else {
        value.ceil()
    }
}

pub fn format_amount(value: f64) -> String {
    let text = format!("{:.4}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
