use super::{ceil_units, format_amount, DoseCourse, QuantityRule, ResolvedQuantity};
use crate::error::{BillingError, BillingResult};
use crate::medicine::{MedicineType, RuleTable};

/// Tablets may be prescribed in quarter steps.
const TABLET_BREAK_STEP: f64 = 0.25;

#[derive(Debug, Clone, Copy)]
pub struct SolidQuantity;

impl SolidQuantity {
    fn nearest_breakable_dose(dose: f64) -> f64 {
        let steps = (dose / TABLET_BREAK_STEP).round().max(1.0);
        steps * TABLET_BREAK_STEP
    }
}

impl QuantityRule for SolidQuantity {
    fn resolve(&self, course: &DoseCourse, rules: &RuleTable) -> BillingResult<ResolvedQuantity> {
        let rule = match course.med_type {
            MedicineType::Tablet | MedicineType::Capsule => rules.get(course.med_type),
            _ => None,
        }
        .ok_or_else(|| BillingError::InvalidMedicineType(
            format!("Invalid solid medicine type: {}", course.med_type)
        ))?;

        let raw_total = course.raw_total();
        let quantity = ceil_units(raw_total);

        let mut details = format!(
            "{} = {} {} -> rounded up to whole {}s = {} {}",
            course.describe(),
            format_amount(raw_total),
            rule.unit,
            rule.unit,
            format_amount(quantity),
            rule.unit,
        );

        if *course.med_type == MedicineType::Tablet {
            details.push_str(&format!(
                " (nearest breakable dose {} tablet; whole-tablet total applies)",
                format_amount(Self::nearest_breakable_dose(course.dose))
            ));
        }

        Ok(ResolvedQuantity {
            quantity,
            unit: rule.unit.to_string(),
            partial_applied: None,
            details,
        })
    }
}
